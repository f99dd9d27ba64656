//! Chat history entries exchanged with the completion service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (the rule prompts).
    System,
    /// User input.
    User,
    /// Model output.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// One turn of conversation history.
///
/// `timezone` is an IANA zone name (may be empty) and `timestamp` is unix
/// seconds (0 when unknown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(rename = "timeZone", default)]
    pub timezone: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>, timezone: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role,
            text: text.into(),
            timezone: timezone.into(),
            timestamp,
        }
    }

    /// Creates a user turn.
    pub fn user(text: impl Into<String>, timezone: impl Into<String>, timestamp: i64) -> Self {
        Self::new(Role::User, text, timezone, timestamp)
    }

    /// Creates an assistant turn.
    pub fn assistant(text: impl Into<String>, timezone: impl Into<String>, timestamp: i64) -> Self {
        Self::new(Role::Assistant, text, timezone, timestamp)
    }

    /// Text as sent to the model, with the sender's zone and time appended.
    ///
    /// The model resolves relative dates ("tomorrow at 9") from these hints.
    pub fn annotated_text(&self) -> String {
        let mut text = self.text.clone();
        if !self.timezone.is_empty() {
            text.push_str(&format!(" (timeZone: {})", self.timezone));
        }
        if self.timestamp != 0 {
            text.push_str(&format!(" [timestamp: {}]", self.timestamp));
        }
        text
    }
}

/// Conversation history for a single dialogue call, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputForm {
    #[serde(rename = "messages_history", default)]
    pub history: Vec<Message>,
}

impl InputForm {
    pub fn new(history: Vec<Message>) -> Self {
        Self { history }
    }

    /// The turn that triggered this call: the most recent user message.
    pub fn last_user_turn(&self) -> Option<&Message> {
        self.history.iter().rev().find(|m| m.role == Role::User)
    }

    /// Raw texts of the history in order, without annotations.
    pub fn texts(&self) -> Vec<String> {
        self.history.iter().map(|m| m.text.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!("User".parse::<Role>().unwrap(), Role::User);
        assert!("bot".parse::<Role>().is_err());
    }

    #[test]
    fn annotated_text_appends_zone_and_timestamp() {
        let msg = Message::user("завтра в 9 встреча", "Europe/Moscow", 1_700_000_000);
        assert_eq!(
            msg.annotated_text(),
            "завтра в 9 встреча (timeZone: Europe/Moscow) [timestamp: 1700000000]"
        );
    }

    #[test]
    fn annotated_text_skips_missing_hints() {
        let msg = Message::assistant("Во сколько?", "", 0);
        assert_eq!(msg.annotated_text(), "Во сколько?");
    }

    #[test]
    fn input_form_uses_messages_history_key() {
        let form = InputForm::new(vec![Message::user("hi", "UTC", 1)]);
        let json = serde_json::to_value(&form).unwrap();

        assert_eq!(json["messages_history"][0]["role"], "user");
        assert_eq!(json["messages_history"][0]["timeZone"], "UTC");
    }

    #[test]
    fn last_user_turn_is_most_recent_user_message() {
        let form = InputForm::new(vec![
            Message::user("first", "UTC", 1),
            Message::assistant("question", "UTC", 2),
            Message::user("second", "UTC", 3),
            Message::assistant("another", "UTC", 4),
        ]);

        assert_eq!(form.last_user_turn().map(|m| m.text.as_str()), Some("second"));
    }

    #[test]
    fn last_user_turn_is_none_without_user_messages() {
        let form = InputForm::new(vec![Message::assistant("hello", "", 0)]);
        assert!(form.last_user_turn().is_none());
    }
}

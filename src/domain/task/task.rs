//! Task entity.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::conversation::ExtractionResponse;
use crate::domain::foundation::ChatId;

/// A reminder owned by a chat.
///
/// Tasks are keyed by `(chat_id, date_time)`; saving a task with the same
/// pair replaces the previous one. `date_time` is stored exactly as the model
/// produced it and may not be valid RFC-3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "chatId")]
    pub chat_id: ChatId,
    pub task: String,
    pub location: String,
    #[serde(rename = "dateTime")]
    pub date_time: String,
}

impl Task {
    pub fn new(
        chat_id: ChatId,
        task: impl Into<String>,
        date_time: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            chat_id,
            task: task.into(),
            location: location.into(),
            date_time: date_time.into(),
        }
    }

    /// Builds the task carried by a `final` answer. `ask` answers yield `None`.
    pub fn from_response(chat_id: ChatId, response: &ExtractionResponse) -> Option<Self> {
        match response {
            ExtractionResponse::Final {
                task,
                date_time,
                location,
                ..
            } => Some(Self::new(chat_id, task.clone(), date_time.clone(), location.clone())),
            ExtractionResponse::Ask { .. } => None,
        }
    }

    /// Calendar date the task is due on, in the offset it was written with.
    ///
    /// Values that are not RFC-3339 fall back to a leading `YYYY-MM-DD`.
    pub fn due_date(&self) -> Option<NaiveDate> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.date_time) {
            return Some(parsed.date_naive());
        }
        self.date_time
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    }

    /// Returns true if the task falls on `date`.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_date() == Some(date)
    }

    /// Digest entry for this task, terminated by a blank line.
    pub fn describe(&self) -> String {
        format!(
            "Задача: {}\nДата: {}\nЛокация: {}\n\n",
            self.task, self.date_time, self.location
        )
    }
}

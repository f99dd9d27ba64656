//! The structured payload the dialogue model answers with.
//!
//! The model replies with a single JSON object discriminated by `mode`:
//!
//! ```json
//! {"mode":"ask","question":"На какое время?","reasoning":"...","property":"dateTime"}
//! {"mode":"final","task":"Встреча","dateTime":"2025-01-02T09:00:00+03:00","location":"офис"}
//! ```
//!
//! Two parse modes exist. `Strict` rejects unknown keys, trailing content and
//! incomplete `final` payloads. `Lenient` only discriminates the mode and is
//! what the dialogue loop uses on raw model output.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::fence::strip_code_fence;

/// Keys the payload may carry. Anything else fails strict parsing.
pub const DECLARED_FIELDS: [&str; 7] = [
    "mode",
    "task",
    "dateTime",
    "location",
    "reasoning",
    "question",
    "property",
];

/// Which reminder field the model is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    #[serde(rename = "task")]
    Task,
    #[serde(rename = "dateTime")]
    DateTime,
    #[serde(rename = "location")]
    Location,
}

impl Property {
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Task => "task",
            Property::DateTime => "dateTime",
            Property::Location => "location",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Property::Task),
            "dateTime" => Ok(Property::DateTime),
            "location" => Ok(Property::Location),
            other => Err(ParseError::UnknownProperty(other.to_string())),
        }
    }
}

/// How strictly model output is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Strict,
    Lenient,
}

/// Errors produced while validating model output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response is empty")]
    Empty,

    #[error("response must be a single JSON object with no surrounding text")]
    NotSingleObject,

    #[error("invalid JSON by schema: {0}")]
    InvalidSchema(String),

    #[error("only one JSON object allowed, trailing content: {0}")]
    TrailingContent(String),

    #[error("cannot parse model JSON: {0}")]
    Malformed(String),

    #[error("dateTime must be RFC-3339, got {value:?}: {reason}")]
    InvalidDateTime { value: String, reason: String },

    #[error("dateTime must include a timezone offset or 'Z': {0:?}")]
    MissingOffset(String),

    #[error("unknown property: {0:?}")]
    UnknownProperty(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown mode: {0:?}")]
    UnknownMode(String),
}

/// A validated model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExtractionResponse {
    /// The model needs one more detail from the user.
    Ask {
        question: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        property: Option<Property>,
    },
    /// The model has every field of the reminder.
    Final {
        task: String,
        #[serde(rename = "dateTime")]
        date_time: String,
        location: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
    },
}

impl ExtractionResponse {
    /// Parses raw model output, stripping a surrounding code fence first.
    pub fn parse(raw: &str, mode: ParseMode) -> Result<Self, ParseError> {
        let text = strip_code_fence(raw);
        if text.is_empty() {
            return Err(ParseError::Empty);
        }

        let payload = match mode {
            ParseMode::Strict => decode_strict(&text)?,
            ParseMode::Lenient => decode_lenient(&text)?,
        };
        payload.into_response(mode)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ExtractionResponse::Final { .. })
    }

    pub fn reasoning(&self) -> Option<&str> {
        match self {
            ExtractionResponse::Ask { reasoning, .. } | ExtractionResponse::Final { reasoning, .. } => {
                reasoning.as_deref()
            }
        }
    }

    /// Serializes back to the wire shape.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The reminder fields recovered by [`parse_strict`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedTask {
    pub task: String,
    #[serde(rename = "dateTime")]
    pub date_time: String,
    pub location: String,
}

/// Strictly validates model output and returns its reminder fields.
///
/// Unlike [`ExtractionResponse::parse`] this does not look at `mode`, so a
/// payload that only carries some of the fields is accepted as long as it is
/// a single object of declared keys with a well-formed `dateTime`.
pub fn parse_strict(raw: &str) -> Result<ExtractedTask, ParseError> {
    let text = strip_code_fence(raw);
    let payload = decode_strict(&text)?;

    Ok(ExtractedTask {
        task: payload.task.unwrap_or_default(),
        date_time: payload.date_time.unwrap_or_default(),
        location: payload.location.unwrap_or_default(),
    })
}

/// Checks that `value` is RFC-3339 and spells out its offset.
pub fn validate_date_time(value: &str) -> Result<(), ParseError> {
    DateTime::parse_from_rfc3339(value).map_err(|e| ParseError::InvalidDateTime {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if !has_explicit_offset(value) {
        return Err(ParseError::MissingOffset(value.to_string()));
    }
    Ok(())
}

// The date part already holds two '-', so a third one marks a negative offset.
fn has_explicit_offset(value: &str) -> bool {
    value.contains('Z') || value.contains('+') || value.matches('-').count() > 2
}

#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    task: Option<String>,
    #[serde(default, rename = "dateTime")]
    date_time: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    property: Option<String>,
}

fn decode_strict(text: &str) -> Result<RawPayload, ParseError> {
    if !text.starts_with('{') || !text.ends_with('}') {
        return Err(ParseError::NotSingleObject);
    }

    let mut de = serde_json::Deserializer::from_str(text);
    let object = Map::<String, Value>::deserialize(&mut de)
        .map_err(|e| ParseError::InvalidSchema(e.to_string()))?;
    de.end()
        .map_err(|e| ParseError::TrailingContent(e.to_string()))?;

    if let Some(key) = object
        .keys()
        .find(|key| !DECLARED_FIELDS.contains(&key.as_str()))
    {
        return Err(ParseError::InvalidSchema(format!("unknown field `{}`", key)));
    }

    let payload: RawPayload = serde_json::from_value(Value::Object(object))
        .map_err(|e| ParseError::InvalidSchema(e.to_string()))?;

    if let Some(date_time) = payload.date_time.as_deref().filter(|v| !v.is_empty()) {
        validate_date_time(date_time)?;
    }
    Ok(payload)
}

fn decode_lenient(text: &str) -> Result<RawPayload, ParseError> {
    serde_json::from_str(text).map_err(|e| ParseError::Malformed(e.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawPayload {
    fn into_response(self, mode: ParseMode) -> Result<ExtractionResponse, ParseError> {
        let strict = mode == ParseMode::Strict;

        match self.mode.as_deref().unwrap_or_default() {
            "ask" => {
                let question = self.question.unwrap_or_default();
                if question.trim().is_empty() {
                    return Err(ParseError::MissingField("question"));
                }

                let property = match non_empty(self.property) {
                    None => None,
                    Some(name) => match name.parse::<Property>() {
                        Ok(property) => Some(property),
                        Err(e) if strict => return Err(e),
                        Err(_) => None,
                    },
                };

                Ok(ExtractionResponse::Ask {
                    question,
                    reasoning: non_empty(self.reasoning),
                    property,
                })
            }
            "final" => {
                let task = self.task.unwrap_or_default();
                let date_time = self.date_time.unwrap_or_default();

                if strict {
                    if task.trim().is_empty() {
                        return Err(ParseError::MissingField("task"));
                    }
                    if date_time.trim().is_empty() {
                        return Err(ParseError::MissingField("dateTime"));
                    }
                }

                Ok(ExtractionResponse::Final {
                    task,
                    date_time,
                    location: self.location.unwrap_or_default(),
                    reasoning: non_empty(self.reasoning),
                })
            }
            other => Err(ParseError::UnknownMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    // ════════════════════════════════════════════════════════════════════════════
    // parse_strict
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_strict_accepts_declared_fields() {
        let raw = r#"{"mode":"final","task":"Встреча","dateTime":"2024-01-01T10:00:00Z","location":"офис"}"#;
        let task = parse_strict(raw).unwrap();

        assert_eq!(task.task, "Встреча");
        assert_eq!(task.date_time, "2024-01-01T10:00:00Z");
        assert_eq!(task.location, "офис");
    }

    #[test]
    fn parse_strict_rejects_unknown_key() {
        let raw = r#"{"mode":"final","task":"x","priority":"high"}"#;
        let err = parse_strict(raw).unwrap_err();

        assert!(matches!(err, ParseError::InvalidSchema(_)));
        assert!(err.to_string().starts_with("invalid JSON by schema"));
    }

    #[test]
    fn parse_strict_rejects_second_object() {
        let raw = r#"{"task":"a"} {"task":"b"}"#;
        assert!(matches!(parse_strict(raw), Err(ParseError::TrailingContent(_))));
    }

    #[test]
    fn parse_strict_rejects_surrounding_text() {
        assert_eq!(
            parse_strict(r#"Ответ: {"task":"a"}"#),
            Err(ParseError::NotSingleObject)
        );
        assert_eq!(parse_strict(""), Err(ParseError::NotSingleObject));
    }

    #[test]
    fn parse_strict_rejects_date_time_without_offset() {
        let raw = r#"{"dateTime":"2024-01-01T10:00:00"}"#;
        assert!(matches!(
            parse_strict(raw),
            Err(ParseError::InvalidDateTime { .. }) | Err(ParseError::MissingOffset(_))
        ));
    }

    #[test]
    fn parse_strict_accepts_utc_and_positive_offset() {
        assert!(parse_strict(r#"{"dateTime":"2024-01-01T10:00:00Z"}"#).is_ok());
        assert!(parse_strict(r#"{"dateTime":"2024-01-01T10:00:00+03:00"}"#).is_ok());
    }

    #[test]
    fn parse_strict_accepts_negative_offset() {
        assert!(parse_strict(r#"{"dateTime":"2024-01-01T10:00:00-05:00"}"#).is_ok());
    }

    #[test]
    fn parse_strict_allows_empty_date_time() {
        let task = parse_strict(r#"{"task":"позвонить маме","dateTime":""}"#).unwrap();
        assert_eq!(task.date_time, "");
    }

    #[test]
    fn parse_strict_strips_code_fence() {
        let raw = "```json\n{\"task\":\"a\",\"dateTime\":\"2024-05-01T08:00:00+03:00\"}\n```";
        assert_eq!(parse_strict(raw).unwrap().task, "a");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // ExtractionResponse::parse
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn lenient_parses_ask() {
        let raw = r#"{"mode":"ask","question":"Во сколько?","reasoning":"нет времени","property":"dateTime"}"#;
        let response = ExtractionResponse::parse(raw, ParseMode::Lenient).unwrap();

        assert_eq!(
            response,
            ExtractionResponse::Ask {
                question: "Во сколько?".to_string(),
                reasoning: Some("нет времени".to_string()),
                property: Some(Property::DateTime),
            }
        );
    }

    #[test]
    fn lenient_tolerates_unknown_keys_and_properties() {
        let raw = r#"{"mode":"ask","question":"Где?","property":"place","confidence":0.4}"#;
        let response = ExtractionResponse::parse(raw, ParseMode::Lenient).unwrap();

        assert!(matches!(response, ExtractionResponse::Ask { property: None, .. }));
    }

    #[test]
    fn strict_rejects_unknown_property() {
        let raw = r#"{"mode":"ask","question":"Где?","property":"place"}"#;
        assert_eq!(
            ExtractionResponse::parse(raw, ParseMode::Strict),
            Err(ParseError::UnknownProperty("place".to_string()))
        );
    }

    #[test]
    fn lenient_accepts_incomplete_final() {
        let raw = r#"{"mode":"final","task":"Купить хлеб","dateTime":"завтра"}"#;
        let response = ExtractionResponse::parse(raw, ParseMode::Lenient).unwrap();

        assert!(response.is_final());
    }

    #[test]
    fn strict_requires_task_and_date_time_in_final() {
        let no_task = r#"{"mode":"final","dateTime":"2024-01-01T10:00:00Z"}"#;
        let no_date = r#"{"mode":"final","task":"x"}"#;

        assert_eq!(
            ExtractionResponse::parse(no_task, ParseMode::Strict),
            Err(ParseError::MissingField("task"))
        );
        assert_eq!(
            ExtractionResponse::parse(no_date, ParseMode::Strict),
            Err(ParseError::MissingField("dateTime"))
        );
    }

    #[test]
    fn ask_requires_question() {
        let raw = r#"{"mode":"ask","question":"  "}"#;
        assert_eq!(
            ExtractionResponse::parse(raw, ParseMode::Lenient),
            Err(ParseError::MissingField("question"))
        );
    }

    #[test]
    fn unknown_or_missing_mode_is_reported() {
        assert_eq!(
            ExtractionResponse::parse(r#"{"mode":"done"}"#, ParseMode::Lenient),
            Err(ParseError::UnknownMode("done".to_string()))
        );
        assert_eq!(
            ExtractionResponse::parse(r#"{"task":"x"}"#, ParseMode::Lenient),
            Err(ParseError::UnknownMode(String::new()))
        );
    }

    #[test]
    fn plain_text_is_malformed_in_lenient_mode() {
        let err = ExtractionResponse::parse("Привет! Чем помочь?", ParseMode::Lenient).unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn empty_output_is_reported() {
        assert_eq!(
            ExtractionResponse::parse("```json\n```", ParseMode::Lenient),
            Err(ParseError::Empty)
        );
    }

    #[test]
    fn final_serializes_with_mode_tag() {
        let response = ExtractionResponse::Final {
            task: "Встреча".to_string(),
            date_time: "2024-01-01T10:00:00Z".to_string(),
            location: String::new(),
            reasoning: None,
        };
        let json: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(json["mode"], "final");
        assert_eq!(json["dateTime"], "2024-01-01T10:00:00Z");
        assert!(json.get("reasoning").is_none());
    }

    #[test]
    fn serialized_final_passes_strict_parse() {
        let response = ExtractionResponse::Final {
            task: "Встреча".to_string(),
            date_time: "2024-01-01T10:00:00+03:00".to_string(),
            location: "кафе".to_string(),
            reasoning: Some("всё есть".to_string()),
        };
        let raw = response.to_json().unwrap();

        assert_eq!(ExtractionResponse::parse(&raw, ParseMode::Strict), Ok(response));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Properties
    // ════════════════════════════════════════════════════════════════════════════

    fn date_time_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("2024-01-01T10:00:00Z".to_string()),
            Just("2025-03-09T18:30:00+03:00".to_string()),
            Just("2023-12-31T23:59:59-08:00".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn declared_field_objects_round_trip(
            task in any::<String>(),
            location in any::<String>(),
            date_time in date_time_strategy(),
        ) {
            let raw = json!({
                "mode": "final",
                "task": task,
                "dateTime": date_time,
                "location": location,
            })
            .to_string();

            let parsed = parse_strict(&raw).unwrap();
            prop_assert_eq!(parsed.task, task);
            prop_assert_eq!(parsed.date_time, date_time);
            prop_assert_eq!(parsed.location, location);
        }

        #[test]
        fn unknown_keys_are_rejected(key in "[a-zA-Z_]{1,12}") {
            prop_assume!(!DECLARED_FIELDS.contains(&key.as_str()));

            let mut object = Map::new();
            object.insert("task".to_string(), json!("x"));
            object.insert(key, json!("y"));
            let raw = Value::Object(object).to_string();

            prop_assert!(matches!(parse_strict(&raw), Err(ParseError::InvalidSchema(_))));
        }
    }
}

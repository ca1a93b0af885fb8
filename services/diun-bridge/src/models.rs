use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::style::{style_for, Style};

/// A Diun notification that passed validation. Unknown keys never reach it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InboundPayload {
    pub status: String,
    pub image: String,
    pub platform: Option<String>,
    pub tag: Option<String>,
    pub message: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    MalformedBody(String),
    Missing(&'static str),
    NotAString(&'static str),
    Empty(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedBody(detail) => write!(f, "request body must be a JSON object: {detail}"),
            Self::Missing(field) => write!(f, "missing required field `{field}`"),
            Self::NotAString(field) => write!(f, "field `{field}` must be a string"),
            Self::Empty(field) => write!(f, "field `{field}` must not be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl InboundPayload {
    pub fn parse(raw: &Map<String, Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            status: required(raw, "status")?,
            image: required(raw, "image")?,
            platform: optional(raw, "platform")?,
            tag: optional(raw, "tag")?,
            message: required(raw, "message")?,
        })
    }

    pub fn from_json_body(body: &[u8]) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| ValidationError::MalformedBody(err.to_string()))?;
        match value {
            Value::Object(raw) => Self::parse(&raw),
            other => Err(ValidationError::MalformedBody(format!(
                "got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_query<I>(params: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: Map<String, Value> = params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Self::parse(&raw)
    }
}

fn required(raw: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::String(value)) if value.trim().is_empty() => Err(ValidationError::Empty(field)),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ValidationError::NotAString(field)),
    }
}

fn optional(
    raw: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    // Absent, null and "" all collapse to "not provided".
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ValidationError::NotAString(field)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Row of the `events` table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub struct Event {
    pub id: i64,
    pub image: String,
    pub status: String,
    pub platform: Option<String>,
    pub tag: Option<String>,
    pub message: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Card {
    pub style: Style,
    pub title: String,
    pub content: String,
}

impl From<&Event> for Card {
    fn from(event: &Event) -> Self {
        Self {
            style: style_for(&event.status),
            title: event.image.clone(),
            content: format!("{} ({})", event.message, event.timestamp),
        }
    }
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

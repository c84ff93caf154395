use crate::domain::{Message, MessageRole, SessionSource};
use serde_json::Value;

const MAX_CONTENT_DEPTH: usize = 32;

/// Parses newline-delimited JSON, one record per non-blank line.
///
/// Lines that are not valid JSON are dropped without an error: a torn last
/// line of a head read, or one corrupt line in a long history, must not hide
/// the rest of the session.
pub fn parse_lines(bytes: &[u8]) -> Vec<Value> {
    bytes
        .split(|byte| *byte == b'\n')
        .filter_map(parse_line)
        .collect()
}

pub fn parse_line(line: &[u8]) -> Option<Value> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_slice(trimmed).ok()
}

/// Content shapes found in message bodies, reduced to the fields text
/// extraction looks at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContentValue {
    Text(String),
    Sequence(Vec<ContentValue>),
    Object {
        text: Option<Box<ContentValue>>,
        value: Option<Box<ContentValue>>,
        content: Option<Box<ContentValue>>,
        output: Option<Box<ContentValue>>,
    },
    Other,
}

impl ContentValue {
    pub fn from_json(value: &Value) -> Self {
        Self::from_json_at(value, 0)
    }

    fn from_json_at(value: &Value, depth: usize) -> Self {
        if depth > MAX_CONTENT_DEPTH {
            return Self::Other;
        }
        let field = |object: &serde_json::Map<String, Value>, name: &str| {
            object
                .get(name)
                .map(|inner| Box::new(Self::from_json_at(inner, depth + 1)))
        };
        match value {
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(items) => Self::Sequence(
                items
                    .iter()
                    .map(|item| Self::from_json_at(item, depth + 1))
                    .collect(),
            ),
            Value::Object(object) => Self::Object {
                text: field(object, "text"),
                value: field(object, "value"),
                content: field(object, "content"),
                output: field(object, "output"),
            },
            _ => Self::Other,
        }
    }
}

pub fn extract_text(content: &ContentValue) -> String {
    match content {
        ContentValue::Text(text) => text.trim().to_string(),
        ContentValue::Sequence(items) => items
            .iter()
            .map(extract_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        ContentValue::Object {
            text,
            value,
            content,
            output,
        } => [text, value, content, output]
            .into_iter()
            .flatten()
            .map(|inner| extract_text(inner))
            .find(|text| !text.is_empty())
            .unwrap_or_default(),
        ContentValue::Other => String::new(),
    }
}

/// Collapses every whitespace run to one space and trims the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetaHint {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub started_at: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParsedRecord {
    pub timestamp: Option<String>,
    pub meta: MetaHint,
    pub message: Option<Message>,
}

pub fn classify_record(source: SessionSource, value: &Value) -> ParsedRecord {
    let timestamp = non_empty_str(value.get("timestamp"));
    let (meta, message) = match source {
        SessionSource::Codex => classify_codex_record(value),
        SessionSource::Claude => classify_claude_record(value),
    };
    let message = message.map(|(role, text)| Message {
        role,
        text,
        timestamp: timestamp.clone(),
    });
    ParsedRecord {
        timestamp,
        meta,
        message,
    }
}

fn classify_codex_record(value: &Value) -> (MetaHint, Option<(MessageRole, String)>) {
    let payload = value.get("payload").unwrap_or(&Value::Null);
    match value.get("type").and_then(|v| v.as_str()) {
        Some("session_meta") => (
            MetaHint {
                session_id: non_empty_str(payload.get("id")),
                cwd: non_empty_str(payload.get("cwd")),
                started_at: non_empty_str(payload.get("timestamp")),
            },
            None,
        ),
        Some("response_item") => {
            if payload.get("type").and_then(|v| v.as_str()) != Some("message") {
                return (MetaHint::default(), None);
            }
            let role = payload
                .get("role")
                .and_then(|v| v.as_str())
                .and_then(MessageRole::parse);
            let message = role.map(|role| (role, message_text(payload.get("content"))));
            (MetaHint::default(), message)
        }
        _ => (MetaHint::default(), None),
    }
}

fn classify_claude_record(value: &Value) -> (MetaHint, Option<(MessageRole, String)>) {
    let meta = MetaHint {
        session_id: non_empty_str(value.get("sessionId")),
        cwd: non_empty_str(value.get("cwd")),
        started_at: None,
    };
    let role = value
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(MessageRole::parse);
    let message = role.map(|role| {
        let content = value.get("message").and_then(|message| message.get("content"));
        (role, message_text(content))
    });
    (meta, message)
}

fn message_text(content: Option<&Value>) -> String {
    let Some(content) = content else {
        return String::new();
    };
    normalize_text(&extract_text(&ContentValue::from_json(content)))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

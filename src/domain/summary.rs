use crate::domain::{
    Message, MessageRole, SessionSource, SessionSummary, classify_record, normalize_text,
    parse_rfc3339_to_unix_ms, strip_leading_preamble,
};
use serde_json::Value;
use std::path::PathBuf;

const MAX_TITLE_CHARS: usize = 100;
const ELLIPSIS: &str = "...";

/// What a head read of one log file tells us, before file facts are merged in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryDraft {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub message_count: usize,
    pub title: Option<String>,
}

/// Facts about the backing file that fill gaps left by the content.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileFacts {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_rfc3339: Option<String>,
}

/// Walks records in file order, collecting identity hints, the timestamp
/// range and every message.
#[derive(Clone, Debug)]
pub struct SessionAccumulator {
    source: SessionSource,
    message_cap: usize,
    records: usize,
    session_id: Option<String>,
    cwd: Option<String>,
    started_at: Option<String>,
    first_timestamp: Option<String>,
    latest: Option<(Option<i64>, String)>,
    messages: Vec<Message>,
    truncated: bool,
}

/// Accumulated view of a session with the leading preamble already removed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccumulatedSession {
    pub records: usize,
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub messages: Vec<Message>,
    pub truncated: bool,
}

impl SessionAccumulator {
    pub fn new(source: SessionSource) -> Self {
        Self::with_message_cap(source, usize::MAX)
    }

    pub fn with_message_cap(source: SessionSource, message_cap: usize) -> Self {
        Self {
            source,
            message_cap,
            records: 0,
            session_id: None,
            cwd: None,
            started_at: None,
            first_timestamp: None,
            latest: None,
            messages: Vec::new(),
            truncated: false,
        }
    }

    /// True once the message cap has been hit; later records are ignored.
    pub fn is_full(&self) -> bool {
        self.truncated
    }

    pub fn push(&mut self, value: &Value) {
        if self.truncated {
            return;
        }
        self.records += 1;

        let record = classify_record(self.source, value);
        if self.session_id.is_none() {
            self.session_id = record.meta.session_id;
        }
        if self.cwd.is_none() {
            self.cwd = record.meta.cwd;
        }
        if self.started_at.is_none() {
            self.started_at = record.meta.started_at;
        }
        if let Some(timestamp) = record.timestamp {
            if self.first_timestamp.is_none() {
                self.first_timestamp = Some(timestamp.clone());
            }
            self.latest = Some(pick_later(self.latest.take(), timestamp));
        }
        if let Some(message) = record.message {
            if self.messages.len() >= self.message_cap {
                self.truncated = true;
                return;
            }
            self.messages.push(message);
        }
    }

    pub fn finish(self) -> AccumulatedSession {
        let messages = strip_leading_preamble(&self.messages).to_vec();
        AccumulatedSession {
            records: self.records,
            session_id: self.session_id,
            cwd: self.cwd,
            created_at: self.started_at.or(self.first_timestamp),
            updated_at: self.latest.map(|(_, raw)| raw),
            messages,
            truncated: self.truncated,
        }
    }
}

/// Returns `None` when no record parsed at all.
pub fn summarize_records(source: SessionSource, records: &[Value]) -> Option<SummaryDraft> {
    if records.is_empty() {
        return None;
    }

    let mut accumulator = SessionAccumulator::new(source);
    for value in records {
        accumulator.push(value);
    }
    let session = accumulator.finish();

    Some(SummaryDraft {
        title: first_user_title(&session.messages),
        message_count: session.messages.len(),
        session_id: session.session_id,
        cwd: session.cwd,
        created_at: session.created_at,
        updated_at: session.updated_at,
    })
}

/// Title search over a larger prefix; only the title is taken from it.
pub fn find_title(source: SessionSource, records: &[Value]) -> Option<String> {
    let messages: Vec<Message> = records
        .iter()
        .filter_map(|value| classify_record(source, value).message)
        .collect();
    first_user_title(strip_leading_preamble(&messages))
}

fn first_user_title(messages: &[Message]) -> Option<String> {
    messages
        .iter()
        .filter(|message| message.role == MessageRole::User)
        .map(|message| truncate_title(&message.text))
        .find(|title| !title.is_empty())
}

// A parsable timestamp always beats an unparsable one; among equals, the
// later record wins.
fn pick_later(current: Option<(Option<i64>, String)>, raw: String) -> (Option<i64>, String) {
    let parsed = parse_rfc3339_to_unix_ms(&raw);
    match current {
        None => (parsed, raw),
        Some((Some(current_ms), current_raw)) => match parsed {
            Some(ms) if ms >= current_ms => (Some(ms), raw),
            _ => (Some(current_ms), current_raw),
        },
        Some((None, _)) => (parsed, raw),
    }
}

pub fn truncate_title(text: &str) -> String {
    let normalized = normalize_text(text);
    if normalized.chars().count() <= MAX_TITLE_CHARS {
        return normalized;
    }
    let keep = MAX_TITLE_CHARS - ELLIPSIS.len();
    let mut out: String = normalized.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str(ELLIPSIS);
    out
}

pub fn finish_summary(source: SessionSource, draft: SummaryDraft, file: FileFacts) -> SessionSummary {
    let session_id = draft
        .session_id
        .or_else(|| file_stem_string(&file.path))
        .unwrap_or_else(|| "(unknown)".to_string());
    let updated_at = draft
        .updated_at
        .or_else(|| file.modified_rfc3339.clone())
        .unwrap_or_default();
    let created_at = draft.created_at.unwrap_or_else(|| updated_at.clone());
    let title = draft.title.unwrap_or_else(|| session_id.clone());

    SessionSummary {
        source,
        session_id,
        title,
        cwd: draft.cwd.unwrap_or_default(),
        created_at,
        updated_at,
        message_count: draft.message_count,
        file_path: file.path,
        file_size_bytes: file.size_bytes,
    }
}

pub fn file_stem_string(path: &std::path::Path) -> Option<String> {
    path.file_stem()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
}

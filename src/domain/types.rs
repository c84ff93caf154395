use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which log family produced a session.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionSource {
    /// Rollout logs (`session_meta` / `response_item` records).
    Codex,
    /// Project logs where the record `type` names the role.
    Claude,
}

impl SessionSource {
    pub const ALL: [SessionSource; 2] = [SessionSource::Codex, SessionSource::Claude];

    pub fn label(self) -> &'static str {
        match self {
            Self::Codex => "Codex",
            Self::Claude => "Claude",
        }
    }

    pub fn flag_value(self) -> &'static str {
        match self {
            Self::Codex => "codex",
            Self::Claude => "claude",
        }
    }

    pub fn parse_flag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "codex" | "cx" | "a" => Some(Self::Codex),
            "claude" | "cl" | "b" => Some(Self::Claude),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFilter {
    Codex,
    Claude,
    #[default]
    All,
}

impl SourceFilter {
    pub fn sources(self) -> &'static [SessionSource] {
        match self {
            Self::Codex => &[SessionSource::Codex],
            Self::Claude => &[SessionSource::Claude],
            Self::All => &SessionSource::ALL,
        }
    }

    pub fn parse_flag(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        if matches!(normalized.as_str(), "all" | "both" | "") {
            return Some(Self::All);
        }
        SessionSource::parse_flag(&normalized).map(Self::from)
    }
}

impl From<SessionSource> for SourceFilter {
    fn from(value: SessionSource) -> Self {
        match value {
            SessionSource::Codex => Self::Codex,
            SessionSource::Claude => Self::Claude,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" | "developer" => Some(Self::System),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
            Self::System => "System",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub source: SessionSource,
    pub session_id: String,
    pub title: String,
    pub cwd: String,
    pub created_at: String,
    pub updated_at: String,
    pub message_count: usize,
    pub file_path: PathBuf,
    pub file_size_bytes: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub source: SessionSource,
    pub session_id: String,
    pub cwd: String,
    pub created_at: String,
    pub updated_at: String,
    pub file_path: PathBuf,
    pub total_messages: usize,
    pub clipped: bool,
    pub message_limit: usize,
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub file_name: String,
    pub content: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItem {
    pub source: SessionSource,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemResult {
    pub source: SessionSource,
    pub session_id: Option<String>,
    pub file_path: Option<PathBuf>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteOutcome {
    pub total: usize,
    pub deleted: usize,
    pub failed: usize,
    pub results: Vec<DeleteItemResult>,
}

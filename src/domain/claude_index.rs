use serde::Deserialize;
use std::path::PathBuf;

/// `sessions-index.json`, written by Claude Code into each project directory.
#[derive(Clone, Debug, Deserialize)]
pub struct ClaudeSessionsIndex {
    #[serde(rename = "originalPath")]
    pub original_path: Option<String>,

    #[serde(default)]
    pub entries: Vec<ClaudeSessionsIndexEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClaudeSessionsIndexEntry {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,

    #[serde(rename = "fullPath")]
    pub full_path: Option<PathBuf>,

    #[serde(default)]
    pub created: Option<String>,

    #[serde(default)]
    pub modified: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(rename = "firstPrompt", default)]
    pub first_prompt: Option<String>,

    #[serde(rename = "projectPath", default)]
    pub project_path: Option<String>,

    #[serde(rename = "messageCount", default)]
    pub message_count: Option<usize>,
}

impl ClaudeSessionsIndexEntry {
    /// Title text the index already knows, if any.
    pub fn title_hint(&self) -> Option<&str> {
        [self.summary.as_deref(), self.first_prompt.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

pub fn parse_claude_sessions_index(text: &str) -> Result<ClaudeSessionsIndex, serde_json::Error> {
    serde_json::from_str(text)
}

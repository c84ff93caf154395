use crate::domain::{ClaudeSessionsIndexEntry, parse_claude_sessions_index};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SESSIONS_INDEX_FILE: &str = "sessions-index.json";

#[derive(Clone, Debug)]
pub struct IndexHit {
    pub entry: ClaudeSessionsIndexEntry,
    pub original_path: Option<String>,
}

/// Index entries of every project directory, keyed by log path.
#[derive(Clone, Debug, Default)]
pub struct ClaudeIndexLookup {
    entries: HashMap<PathBuf, IndexHit>,
}

impl ClaudeIndexLookup {
    pub fn get(&self, log_path: &Path) -> Option<&IndexHit> {
        self.entries.get(log_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Reads `sessions-index.json` from each project directory under
/// `projects_dir`. Missing or malformed index files are ignored; those
/// projects fall back to head reads.
pub fn load_claude_index_lookup(projects_dir: &Path) -> ClaudeIndexLookup {
    let mut lookup = ClaudeIndexLookup::default();
    let Ok(entries) = fs::read_dir(projects_dir) else {
        return lookup;
    };

    for entry in entries.flatten() {
        let project_key_dir = entry.path();
        if !project_key_dir.is_dir() {
            continue;
        }
        let index_path = project_key_dir.join(SESSIONS_INDEX_FILE);
        let Ok(text) = fs::read_to_string(&index_path) else {
            continue;
        };
        let index = match parse_claude_sessions_index(&text) {
            Ok(index) => index,
            Err(error) => {
                tracing::warn!(path = %index_path.display(), %error, "ignoring malformed sessions index");
                continue;
            }
        };

        for index_entry in index.entries {
            let Some(log_path) = entry_log_path(&project_key_dir, &index_entry) else {
                continue;
            };
            lookup.entries.insert(
                log_path,
                IndexHit {
                    entry: index_entry,
                    original_path: index.original_path.clone(),
                },
            );
        }
    }

    lookup
}

fn entry_log_path(project_key_dir: &Path, entry: &ClaudeSessionsIndexEntry) -> Option<PathBuf> {
    if let Some(full_path) = entry.full_path.as_ref() {
        return Some(if full_path.is_absolute() {
            full_path.clone()
        } else {
            project_key_dir.join(full_path)
        });
    }
    let session_id = entry.session_id.as_deref()?.trim();
    if session_id.is_empty() {
        return None;
    }
    Some(project_key_dir.join(format!("{session_id}.jsonl")))
}

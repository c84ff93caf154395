use crate::domain::{SessionSummary, timestamp_sort_key};
use std::collections::HashSet;

/// Dedupes by `(source, file_path)` keeping the first occurrence, orders by
/// `updated_at` newest first and caps the result at `limit`.
pub fn merge_sessions(
    sessions: impl IntoIterator<Item = SessionSummary>,
    limit: usize,
) -> Vec<SessionSummary> {
    let mut seen = HashSet::new();
    let mut merged: Vec<SessionSummary> = sessions
        .into_iter()
        .filter(|session| seen.insert((session.source, session.file_path.clone())))
        .collect();

    merged.sort_by_key(|session| std::cmp::Reverse(timestamp_sort_key(&session.updated_at)));
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionSource;
    use std::path::PathBuf;

    fn summary(source: SessionSource, path: &str, updated_at: &str, title: &str) -> SessionSummary {
        SessionSummary {
            source,
            session_id: path.to_string(),
            title: title.to_string(),
            cwd: String::new(),
            created_at: updated_at.to_string(),
            updated_at: updated_at.to_string(),
            message_count: 1,
            file_path: PathBuf::from(path),
            file_size_bytes: 0,
        }
    }

    #[test]
    fn dedupes_keeping_first_occurrence() {
        let merged = merge_sessions(
            vec![
                summary(SessionSource::Codex, "/a", "2026-01-01T00:00:00Z", "first"),
                summary(SessionSource::Codex, "/a", "2026-01-02T00:00:00Z", "second"),
                summary(SessionSource::Claude, "/a", "2026-01-01T00:00:00Z", "other source"),
            ],
            10,
        );
        assert_eq!(merged.len(), 2);
        let codex = merged
            .iter()
            .find(|s| s.source == SessionSource::Codex)
            .expect("codex entry");
        assert_eq!(codex.title, "first");
    }

    #[test]
    fn sorts_newest_first_with_bad_timestamps_last_and_caps() {
        let merged = merge_sessions(
            vec![
                summary(SessionSource::Codex, "/old", "2025-01-01T00:00:00Z", "old"),
                summary(SessionSource::Claude, "/bad", "not-a-date", "bad"),
                summary(SessionSource::Codex, "/new", "2026-06-01T00:00:00Z", "new"),
                summary(SessionSource::Claude, "/mid", "2025-06-01T00:00:00+02:00", "mid"),
            ],
            3,
        );
        let titles: Vec<&str> = merged.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[test]
    fn zero_limit_returns_nothing() {
        let merged = merge_sessions(
            vec![summary(SessionSource::Codex, "/a", "2026-01-01T00:00:00Z", "a")],
            0,
        );
        assert!(merged.is_empty());
    }
}

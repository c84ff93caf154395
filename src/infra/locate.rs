use crate::domain::{SessionSource, file_stem_string};
use crate::infra::{ScanOptions, scan_session_files};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateSessionError {
    #[error("session not found: {0}")]
    NotFound(String),
}

/// How a caller names a session: by its log file or by its id.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionTarget {
    Path(PathBuf),
    Id(String),
}

impl SessionTarget {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.contains('/') || raw.contains('\\') || raw.ends_with(".jsonl") {
            Self::Path(PathBuf::from(raw))
        } else {
            Self::Id(raw.to_string())
        }
    }

    /// A file path wins over a session id when both are given.
    pub fn from_parts(file_path: Option<&Path>, session_id: Option<&str>) -> Option<Self> {
        if let Some(path) = file_path.filter(|path| !path.as_os_str().is_empty()) {
            return Some(Self::Path(path.to_path_buf()));
        }
        session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Self::Id(id.to_string()))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Id(id) => id.clone(),
        }
    }
}

/// Resolves a target to a canonical path under `root`.
///
/// Anything outside the canonical root is reported as not found, so callers
/// can never be steered at arbitrary files.
pub fn locate_session(
    root: &Path,
    source: SessionSource,
    target: &SessionTarget,
    scan_budget: usize,
) -> Result<PathBuf, LocateSessionError> {
    let not_found = || LocateSessionError::NotFound(target.describe());
    let root_canonical = fs::canonicalize(root).map_err(|_| not_found())?;

    let candidate = match target {
        SessionTarget::Path(path) => path.clone(),
        SessionTarget::Id(id) => find_by_session_id(root, source, id, scan_budget).ok_or_else(not_found)?,
    };

    let canonical = fs::canonicalize(&candidate).map_err(|_| not_found())?;
    if canonical == root_canonical || !canonical.starts_with(&root_canonical) {
        tracing::warn!(
            path = %candidate.display(),
            root = %root_canonical.display(),
            "rejecting session path outside its root"
        );
        return Err(not_found());
    }
    Ok(canonical)
}

fn find_by_session_id(
    root: &Path,
    source: SessionSource,
    session_id: &str,
    scan_budget: usize,
) -> Option<PathBuf> {
    let rollout_suffix = format!("-{session_id}");
    let output = scan_session_files(root, &ScanOptions::for_source(source, usize::MAX, scan_budget));
    output
        .files
        .into_iter()
        .map(|file| file.path)
        .find(|path| {
            file_stem_string(path)
                .is_some_and(|stem| stem == session_id || stem.ends_with(&rollout_suffix))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_targets() {
        assert_eq!(
            SessionTarget::parse("/a/b.jsonl"),
            SessionTarget::Path(PathBuf::from("/a/b.jsonl"))
        );
        assert_eq!(
            SessionTarget::parse("019a-uuid"),
            SessionTarget::Id("019a-uuid".to_string())
        );
        assert_eq!(
            SessionTarget::from_parts(Some(Path::new("")), Some(" id ")),
            Some(SessionTarget::Id("id".to_string()))
        );
        assert_eq!(SessionTarget::from_parts(None, Some("  ")), None);
    }

    #[test]
    fn resolves_by_path_and_by_rollout_id() {
        let dir = tempdir().expect("tempdir");
        let day = dir.path().join("2026/02/19");
        fs::create_dir_all(&day).expect("mkdir");
        let log = day.join("rollout-2026-02-19T10-00-00-abc123.jsonl");
        fs::write(&log, "{}").expect("write");
        let expected = fs::canonicalize(&log).expect("canonical");

        let by_path = locate_session(
            dir.path(),
            SessionSource::Codex,
            &SessionTarget::Path(log.clone()),
            100,
        )
        .expect("by path");
        assert_eq!(by_path, expected);

        let by_id = locate_session(
            dir.path(),
            SessionSource::Codex,
            &SessionTarget::Id("abc123".to_string()),
            100,
        )
        .expect("by id");
        assert_eq!(by_id, expected);

        let missing = locate_session(
            dir.path(),
            SessionSource::Codex,
            &SessionTarget::Id("nope".to_string()),
            100,
        );
        assert!(matches!(missing, Err(LocateSessionError::NotFound(_))));
    }

    #[test]
    fn rejects_paths_outside_root() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("root");
        fs::create_dir_all(&root).expect("mkdir");
        let outside = dir.path().join("outside.jsonl");
        fs::write(&outside, "{}").expect("write");

        let escaped = root.join("..").join("outside.jsonl");
        for target in [outside.clone(), escaped] {
            let result = locate_session(&root, SessionSource::Claude, &SessionTarget::Path(target), 100);
            assert!(matches!(result, Err(LocateSessionError::NotFound(_))));
        }
    }
}

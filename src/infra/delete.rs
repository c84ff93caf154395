use crate::domain::{BatchDeleteOutcome, DeleteItem, DeleteItemResult, SessionSource};
use crate::infra::{
    LocateSessionError, SESSION_LOG_EXTENSION, SessionTarget, SourceRoots, locate_session,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeleteSessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("invalid session path: {0}")]
    InvalidPath(String),

    #[error("failed to delete {path}: {message}")]
    Io { path: String, message: String },
}

impl From<LocateSessionError> for DeleteSessionError {
    fn from(value: LocateSessionError) -> Self {
        match value {
            LocateSessionError::NotFound(target) => Self::NotFound(target),
        }
    }
}

/// Deletes one session log after resolving it inside `root`.
pub fn delete_session_file(
    root: &Path,
    source: SessionSource,
    target: &SessionTarget,
    scan_budget: usize,
) -> Result<PathBuf, DeleteSessionError> {
    let path = locate_session(root, source, target, scan_budget)?;

    if path.extension().and_then(|ext| ext.to_str()) != Some(SESSION_LOG_EXTENSION) {
        return Err(DeleteSessionError::InvalidPath(path.display().to_string()));
    }
    let is_file = fs::symlink_metadata(&path).is_ok_and(|metadata| metadata.is_file());
    if !is_file {
        return Err(DeleteSessionError::InvalidPath(path.display().to_string()));
    }

    fs::remove_file(&path).map_err(|error| DeleteSessionError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;
    tracing::info!(source = source.flag_value(), path = %path.display(), "deleted session log");
    Ok(path)
}

/// Deletes every item independently; one failure never stops the batch.
pub fn delete_session_batch(
    roots: &SourceRoots,
    items: &[DeleteItem],
    scan_budget: usize,
) -> BatchDeleteOutcome {
    let mut deleted = 0usize;
    let mut failed = 0usize;
    let mut results = Vec::with_capacity(items.len());

    for item in items {
        let outcome = match SessionTarget::from_parts(item.file_path.as_deref(), item.session_id.as_deref()) {
            Some(target) => delete_session_file(roots.get(item.source), item.source, &target, scan_budget),
            None => Err(DeleteSessionError::InvalidPath(
                "either sessionId or filePath is required".to_string(),
            )),
        };
        let error = match outcome {
            Ok(_) => {
                deleted += 1;
                None
            }
            Err(error) => {
                failed += 1;
                Some(error.to_string())
            }
        };
        results.push(DeleteItemResult {
            source: item.source,
            session_id: item.session_id.clone(),
            file_path: item.file_path.clone(),
            success: error.is_none(),
            error,
        });
    }

    BatchDeleteOutcome {
        total: items.len(),
        deleted,
        failed,
        results,
    }
}

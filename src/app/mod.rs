mod cache;
mod config;

use crate::domain::{
    AccumulatedSession, BatchDeleteOutcome, DeleteItem, ExportHeader, SessionDetail,
    SessionExport, SessionSource, SessionSummary, SourceFilter, export_file_name,
    file_stem_string, render_markdown, system_time_to_rfc3339,
};
use crate::infra::{
    DeleteSessionError, LoadSessionLogError, LocateSessionError, SessionTarget,
    delete_session_batch, delete_session_file, load_session_log, locate_session,
    scan_all_sessions,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

pub use cache::*;
pub use config::*;

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 300;
pub const DEFAULT_DETAIL_LIMIT: usize = 200;
pub const MAX_DETAIL_LIMIT: usize = 1_000;
pub const MAX_BATCH_DELETE: usize = 500;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Empty(String),

    #[error("{0}")]
    Io(String),
}

impl From<LocateSessionError> for SessionError {
    fn from(value: LocateSessionError) -> Self {
        Self::NotFound(value.to_string())
    }
}

impl From<LoadSessionLogError> for SessionError {
    fn from(value: LoadSessionLogError) -> Self {
        match value {
            LoadSessionLogError::Empty(_) => Self::Empty(value.to_string()),
            LoadSessionLogError::Read(ref error) if error.kind() == io::ErrorKind::NotFound => {
                Self::NotFound(value.to_string())
            }
            LoadSessionLogError::Read(_) => Self::Io(value.to_string()),
        }
    }
}

impl From<DeleteSessionError> for SessionError {
    fn from(value: DeleteSessionError) -> Self {
        match value {
            DeleteSessionError::NotFound(_) => Self::NotFound(value.to_string()),
            DeleteSessionError::InvalidPath(_) => Self::InvalidInput(value.to_string()),
            DeleteSessionError::Io { .. } => Self::Io(value.to_string()),
        }
    }
}

/// Session log resolved on disk together with its extracted contents.
struct LoadedSession {
    source: SessionSource,
    path: PathBuf,
    session_id: String,
    cwd: String,
    created_at: String,
    updated_at: String,
    log: AccumulatedSession,
}

/// Application context shared by the CLI and the web server.
#[derive(Debug)]
pub struct SessionService {
    config: AppConfig,
    cache: Mutex<SessionCache>,
}

impl SessionService {
    pub fn new(config: AppConfig) -> Self {
        let cache = SessionCache::new(config.cache_ttl);
        Self {
            config,
            cache: Mutex::new(cache),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn list_sessions(
        &self,
        filter: SourceFilter,
        limit: Option<usize>,
        force_refresh: bool,
    ) -> Vec<SessionSummary> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let key = SessionCacheKey { filter, limit };

        {
            let mut cache = self.lock_cache();
            if force_refresh {
                cache.remove(key);
            } else if let Some(sessions) = cache.get(key) {
                return sessions;
            }
        }

        let output = scan_all_sessions(&self.config.roots, filter, limit, self.config.scan_budget);
        if output.warnings.get() > 0 {
            tracing::debug!(warnings = output.warnings.get(), "skipped unreadable session files");
        }
        self.lock_cache().set(key, output.sessions.clone());
        output.sessions
    }

    pub async fn session_detail(
        &self,
        source: SessionSource,
        target: &SessionTarget,
        message_limit: Option<usize>,
    ) -> Result<SessionDetail, SessionError> {
        let limit = message_limit
            .unwrap_or(DEFAULT_DETAIL_LIMIT)
            .clamp(1, MAX_DETAIL_LIMIT);
        let loaded = self.load_session(source, target).await?;

        let mut messages = loaded.log.messages;
        let total_messages = messages.len();
        let clipped = total_messages > limit;
        if clipped {
            messages.drain(..total_messages - limit);
        }

        Ok(SessionDetail {
            source: loaded.source,
            session_id: loaded.session_id,
            cwd: loaded.cwd,
            created_at: loaded.created_at,
            updated_at: loaded.updated_at,
            file_path: loaded.path,
            total_messages,
            clipped,
            message_limit: limit,
            messages,
        })
    }

    pub async fn export_session(
        &self,
        source: SessionSource,
        target: &SessionTarget,
    ) -> Result<SessionExport, SessionError> {
        let loaded = self.load_session(source, target).await?;
        let header = ExportHeader {
            source: loaded.source,
            session_id: &loaded.session_id,
            updated_at: &loaded.updated_at,
            cwd: &loaded.cwd,
            file_path: &loaded.path,
        };
        Ok(SessionExport {
            file_name: export_file_name(loaded.source, &loaded.session_id),
            content: render_markdown(&header, &loaded.log.messages),
        })
    }

    /// Deletes one session log and drops every cached listing.
    pub fn delete_session(
        &self,
        source: SessionSource,
        target: &SessionTarget,
    ) -> Result<PathBuf, SessionError> {
        let path = delete_session_file(
            self.config.roots.get(source),
            source,
            target,
            self.config.scan_budget,
        )?;
        self.lock_cache().invalidate_all();
        Ok(path)
    }

    pub fn delete_sessions_batch(
        &self,
        items: &[DeleteItem],
    ) -> Result<BatchDeleteOutcome, SessionError> {
        if items.is_empty() {
            return Err(SessionError::InvalidInput(
                "at least one session is required".to_string(),
            ));
        }
        if items.len() > MAX_BATCH_DELETE {
            return Err(SessionError::InvalidInput(format!(
                "at most {MAX_BATCH_DELETE} sessions can be deleted at once (got {})",
                items.len()
            )));
        }

        let outcome = delete_session_batch(&self.config.roots, items, self.config.scan_budget);
        self.lock_cache().invalidate_all();
        tracing::info!(
            total = outcome.total,
            deleted = outcome.deleted,
            failed = outcome.failed,
            "batch delete finished"
        );
        Ok(outcome)
    }

    async fn load_session(
        &self,
        source: SessionSource,
        target: &SessionTarget,
    ) -> Result<LoadedSession, SessionError> {
        let root = self.config.roots.get(source);
        let path = locate_session(root, source, target, self.config.scan_budget)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| SessionError::NotFound(format!("session not found: {}", target.describe())))?;
        if !metadata.is_file() {
            return Err(SessionError::NotFound(format!(
                "session not found: {}",
                target.describe()
            )));
        }

        let log = load_session_log(source, &path).await?;
        let modified = metadata.modified().ok().and_then(system_time_to_rfc3339);
        let session_id = log
            .session_id
            .clone()
            .or_else(|| file_stem_string(&path))
            .unwrap_or_else(|| "(unknown)".to_string());
        let updated_at = log.updated_at.clone().or(modified).unwrap_or_default();
        let created_at = log.created_at.clone().unwrap_or_else(|| updated_at.clone());

        Ok(LoadedSession {
            source,
            session_id,
            cwd: log.cwd.clone().unwrap_or_default(),
            created_at,
            updated_at,
            path,
            log,
        })
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, SessionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

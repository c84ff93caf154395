use crate::domain::SessionSource;
use dirs::home_dir;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveRootError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

pub fn root_env_var(source: SessionSource) -> &'static str {
    match source {
        SessionSource::Codex => "CODEX_SESSIONS_DIR",
        SessionSource::Claude => "CLAUDE_PROJECTS_DIR",
    }
}

/// Default log root for a source, honoring its override variable.
pub fn resolve_source_root(source: SessionSource) -> Result<PathBuf, ResolveRootError> {
    if let Some(override_dir) = std::env::var_os(root_env_var(source)) {
        if !override_dir.is_empty() {
            return Ok(PathBuf::from(override_dir));
        }
    }

    let Some(home) = home_dir() else {
        return Err(ResolveRootError::HomeDirNotFound);
    };

    Ok(match source {
        SessionSource::Codex => home.join(".codex").join("sessions"),
        SessionSource::Claude => home.join(".claude").join("projects"),
    })
}

/// Log roots per source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceRoots {
    pub codex: PathBuf,
    pub claude: PathBuf,
}

impl SourceRoots {
    pub fn get(&self, source: SessionSource) -> &Path {
        match source {
            SessionSource::Codex => &self.codex,
            SessionSource::Claude => &self.claude,
        }
    }
}

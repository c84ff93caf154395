use crate::app::DEFAULT_CACHE_TTL;
use crate::domain::SessionSource;
use crate::infra::{DEFAULT_SCAN_BUDGET, ResolveRootError, SourceRoots, resolve_source_root};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const SCAN_BUDGET_ENV: &str = "CODEXMATE_SCAN_BUDGET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    ResolveRoot(#[from] ResolveRootError),

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Values given on the command line; they win over the environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub codex_dir: Option<PathBuf>,
    pub claude_dir: Option<PathBuf>,
    pub scan_budget: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub roots: SourceRoots,
    pub scan_budget: usize,
    pub cache_ttl: Duration,
}

impl AppConfig {
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let codex = match overrides.codex_dir {
            Some(dir) => dir,
            None => resolve_source_root(SessionSource::Codex)?,
        };
        let claude = match overrides.claude_dir {
            Some(dir) => dir,
            None => resolve_source_root(SessionSource::Claude)?,
        };
        let scan_budget = match overrides.scan_budget {
            Some(budget) => budget,
            None => scan_budget_from_env(std::env::var(SCAN_BUDGET_ENV).ok())?,
        };

        Ok(Self {
            roots: SourceRoots { codex, claude },
            scan_budget,
            cache_ttl: DEFAULT_CACHE_TTL,
        })
    }

    pub fn with_roots(roots: SourceRoots) -> Self {
        Self {
            roots,
            scan_budget: DEFAULT_SCAN_BUDGET,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

fn scan_budget_from_env(raw: Option<String>) -> Result<usize, ConfigError> {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(DEFAULT_SCAN_BUDGET);
    };
    match raw.trim().parse::<usize>() {
        Ok(budget) if budget > 0 => Ok(budget),
        _ => Err(ConfigError::InvalidEnv {
            name: SCAN_BUDGET_ENV,
            value: raw,
        }),
    }
}

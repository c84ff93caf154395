mod app;
mod cli;
mod domain;
mod infra;
mod web;

use crate::app::{AppConfig, ConfigError, ConfigOverrides, SessionService};
use crate::cli::{Cli, CliRunError};
use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cli(#[from] CliRunError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.command.default_log_filter());

    if let Err(error) = run_main(cli) {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main(cli: Cli) -> Result<(), MainError> {
    let config = AppConfig::resolve(ConfigOverrides {
        codex_dir: cli.codex_dir,
        claude_dir: cli.claude_dir,
        scan_budget: None,
    })?;
    tracing::debug!(
        codex = %config.roots.codex.display(),
        claude = %config.roots.claude.display(),
        scan_budget = config.scan_budget,
        "resolved session roots"
    );
    let service = Arc::new(SessionService::new(config));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(MainError::Runtime)?;
    runtime.block_on(crate::cli::run(cli.command, service))?;
    Ok(())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

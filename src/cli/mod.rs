use crate::app::{SessionError, SessionService};
use crate::domain::{
    DeleteItem, DeleteItemResult, SessionDetail, SessionSource, SessionSummary, SourceFilter,
};
use crate::infra::SessionTarget;
use crate::web::{ServeError, run_http_server};
use clap::{Parser, Subcommand};
use humansize::{DECIMAL, format_size};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;

#[derive(Debug, Parser)]
#[command(
    name = "codexmate",
    version,
    about = "Browse, export and delete local Codex and Claude session logs"
)]
pub struct Cli {
    /// Codex sessions directory (default: $CODEX_SESSIONS_DIR or ~/.codex/sessions)
    #[arg(long, global = true, value_name = "DIR")]
    pub codex_dir: Option<PathBuf>,

    /// Claude projects directory (default: $CLAUDE_PROJECTS_DIR or ~/.claude/projects)
    #[arg(long, global = true, value_name = "DIR")]
    pub claude_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
pub enum CliCommand {
    /// List sessions, newest first
    List {
        /// all|codex|claude (aliases: cx, a, cl, b)
        #[arg(long, default_value = "all", value_parser = parse_source_filter)]
        source: SourceFilter,

        /// Max sessions to print (1..=300, default 50)
        #[arg(long)]
        limit: Option<usize>,

        /// Ignore cached results
        #[arg(long)]
        refresh: bool,

        /// Output structured JSON
        #[arg(long)]
        json: bool,

        /// Include a file size column
        #[arg(long)]
        size: bool,
    },

    /// Print the messages of one session
    Show {
        /// Session id or path to its log file
        target: String,

        #[arg(long, value_parser = parse_source)]
        source: SessionSource,

        /// Keep only the last N messages (1..=1000, default 200)
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Render one session as Markdown
    Export {
        target: String,

        #[arg(long, value_parser = parse_source)]
        source: SessionSource,

        /// Write to FILE instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Delete session logs
    Delete {
        #[arg(required = true)]
        targets: Vec<String>,

        #[arg(long, value_parser = parse_source)]
        source: SessionSource,
    },

    /// Serve the session API over HTTP
    Serve {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

impl CliCommand {
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Serve { .. } => "codexmate=info",
            _ => "codexmate=warn",
        }
    }
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("{failed} of {total} deletions failed")]
    DeleteFailed { failed: usize, total: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    WriteOutput(#[from] io::Error),
}

pub async fn run(command: CliCommand, service: Arc<SessionService>) -> Result<(), CliRunError> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let stderr = io::stderr();
    let mut err = io::BufWriter::new(stderr.lock());

    match command {
        CliCommand::List {
            source,
            limit,
            refresh,
            json,
            size,
        } => {
            let sessions = service.list_sessions(source, limit, refresh);
            if json {
                write_line(&mut out, &serde_json::to_string_pretty(&sessions)?)?;
                return Ok(());
            }
            for session in &sessions {
                if !write_line(&mut out, &format_summary_line(session, size))? {
                    return Ok(());
                }
            }
            Ok(())
        }
        CliCommand::Show {
            target,
            source,
            limit,
            json,
        } => {
            let detail = service
                .session_detail(source, &SessionTarget::parse(&target), limit)
                .await?;
            if json {
                write_line(&mut out, &serde_json::to_string_pretty(&detail)?)?;
                return Ok(());
            }
            print_detail(&mut out, &detail)?;
            Ok(())
        }
        CliCommand::Export {
            target,
            source,
            output,
        } => {
            let export = service
                .export_session(source, &SessionTarget::parse(&target))
                .await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, export.content.as_bytes()).await?;
                    write_line(&mut err, &format!("wrote:\t{}", path.display()))?;
                }
                None => {
                    write_line(&mut out, export.content.trim_end())?;
                }
            }
            Ok(())
        }
        CliCommand::Delete { targets, source } => {
            if let [target] = targets.as_slice() {
                let path = service.delete_session(source, &SessionTarget::parse(target))?;
                write_line(&mut out, &format!("deleted:\t{}", path.display()))?;
                return Ok(());
            }

            let items = delete_items_from_targets(source, &targets);
            let outcome = service.delete_sessions_batch(&items)?;
            for result in &outcome.results {
                if !write_line(&mut out, &format_delete_result(result))? {
                    break;
                }
            }
            let summary = format!(
                "total: {}\tdeleted: {}\tfailed: {}",
                outcome.total, outcome.deleted, outcome.failed
            );
            write_line(&mut err, &summary)?;
            if outcome.failed > 0 {
                err.flush()?;
                return Err(CliRunError::DeleteFailed {
                    failed: outcome.failed,
                    total: outcome.total,
                });
            }
            Ok(())
        }
        CliCommand::Serve { host, port } => {
            let addr = format!("{host}:{port}")
                .parse::<SocketAddr>()
                .map_err(|_| CliRunError::InvalidAddress(format!("{host}:{port}")))?;
            write_line(&mut err, &format!("listening:\thttp://{addr}"))?;
            err.flush()?;
            drop(err);
            drop(out);
            run_http_server(addr, service).await?;
            Ok(())
        }
    }
}

fn format_summary_line(session: &SessionSummary, size: bool) -> String {
    let title = session.title.replace(['\t', '\n'], " ");
    if size {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            session.updated_at,
            session.source.flag_value(),
            session.session_id,
            session.message_count,
            title,
            format_size(session.file_size_bytes, DECIMAL),
            session.file_path.display(),
        )
    } else {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            session.updated_at,
            session.source.flag_value(),
            session.session_id,
            session.message_count,
            title,
            session.file_path.display(),
        )
    }
}

fn print_detail(out: &mut impl Write, detail: &SessionDetail) -> io::Result<()> {
    let header = [
        format!("session:\t{}", detail.session_id),
        format!("source:\t{}", detail.source.flag_value()),
        format!("cwd:\t{}", detail.cwd),
        format!("updated:\t{}", detail.updated_at),
        format!("file:\t{}", detail.file_path.display()),
        format!(
            "messages:\t{} of {}{}",
            detail.messages.len(),
            detail.total_messages,
            if detail.clipped { " (clipped)" } else { "" }
        ),
    ];
    for line in &header {
        if !write_line(out, line)? {
            return Ok(());
        }
    }

    for message in &detail.messages {
        let heading = match message.timestamp.as_deref() {
            Some(timestamp) => format!("\n[{}] {timestamp}", message.role.label()),
            None => format!("\n[{}]", message.role.label()),
        };
        if !write_line(out, &heading)? || !write_line(out, &message.text)? {
            return Ok(());
        }
    }
    Ok(())
}

fn delete_items_from_targets(source: SessionSource, targets: &[String]) -> Vec<DeleteItem> {
    targets
        .iter()
        .map(|raw| match SessionTarget::parse(raw) {
            SessionTarget::Path(path) => DeleteItem {
                source,
                session_id: None,
                file_path: Some(path),
            },
            SessionTarget::Id(id) => DeleteItem {
                source,
                session_id: Some(id),
                file_path: None,
            },
        })
        .collect()
}

fn format_delete_result(result: &DeleteItemResult) -> String {
    let target = result
        .file_path
        .as_ref()
        .map(|path| path.display().to_string())
        .or_else(|| result.session_id.clone())
        .unwrap_or_default();
    match result.error.as_deref() {
        None => format!("deleted:\t{target}"),
        Some(error) => format!("failed:\t{target}\t{error}"),
    }
}

fn write_line(out: &mut impl Write, line: &str) -> io::Result<bool> {
    match writeln!(out, "{line}") {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(error) => Err(error),
    }
}

fn parse_source(value: &str) -> Result<SessionSource, String> {
    SessionSource::parse_flag(value)
        .ok_or_else(|| format!("unknown source `{value}` (expected codex|claude)"))
}

fn parse_source_filter(value: &str) -> Result<SourceFilter, String> {
    SourceFilter::parse_flag(value)
        .ok_or_else(|| format!("unknown source `{value}` (expected all|codex|claude)"))
}

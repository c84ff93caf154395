use crate::domain::{SessionSource, SessionSummary, SourceFilter, merge_sessions};
use crate::infra::{
    ClaudeIndexLookup, ScanOptions, ScanWarningCount, SourceRoots, load_claude_index_lookup,
    scan_session_files, summarize_session_file,
};
use std::path::Path;

#[derive(Clone, Debug)]
pub struct MultiSourceScanOutput {
    pub sessions: Vec<SessionSummary>,
    pub warnings: ScanWarningCount,
}

/// Scans every source the filter selects and merges the summaries.
pub fn scan_all_sessions(
    roots: &SourceRoots,
    filter: SourceFilter,
    limit: usize,
    scan_budget: usize,
) -> MultiSourceScanOutput {
    let mut sessions: Vec<SessionSummary> = Vec::new();
    let mut warnings = 0usize;

    for &source in filter.sources() {
        let output = scan_source_sessions(source, roots.get(source), limit, scan_budget);
        warnings += output.warnings.get();
        sessions.extend(output.sessions);
    }

    MultiSourceScanOutput {
        sessions: merge_sessions(sessions, limit),
        warnings: ScanWarningCount::from(warnings),
    }
}

fn scan_source_sessions(
    source: SessionSource,
    root: &Path,
    limit: usize,
    scan_budget: usize,
) -> MultiSourceScanOutput {
    let scan = scan_session_files(root, &ScanOptions::for_source(source, limit, scan_budget));
    let index = match source {
        SessionSource::Claude => load_claude_index_lookup(root),
        SessionSource::Codex => ClaudeIndexLookup::default(),
    };

    let mut skipped = 0usize;
    let mut sessions = Vec::with_capacity(scan.files.len());
    for file in &scan.files {
        match summarize_session_file(source, file, index.get(&file.path)) {
            Some(summary) => sessions.push(summary),
            None => skipped += 1,
        }
    }

    tracing::debug!(
        source = source.flag_value(),
        root = %root.display(),
        files = scan.files.len(),
        sessions = sessions.len(),
        skipped,
        "scanned session source"
    );

    MultiSourceScanOutput {
        sessions,
        warnings: ScanWarningCount::from(scan.warnings.get() + skipped),
    }
}

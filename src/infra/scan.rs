use crate::domain::SessionSource;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub const SESSION_LOG_EXTENSION: &str = "jsonl";
pub const DEFAULT_SCAN_BUDGET: usize = 4_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanWarningCount(usize);

impl From<usize> for ScanWarningCount {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl ScanWarningCount {
    pub fn get(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct ScanOptions<'a> {
    pub return_count: usize,
    pub max_files_scanned: usize,
    pub extension: &'a str,
    pub exclude_substring: Option<&'a str>,
}

impl ScanOptions<'static> {
    pub fn for_source(source: SessionSource, return_count: usize, max_files_scanned: usize) -> Self {
        Self {
            return_count,
            max_files_scanned,
            extension: SESSION_LOG_EXTENSION,
            // Claude keeps sub-agent transcripts next to the parent session.
            exclude_substring: match source {
                SessionSource::Codex => None,
                SessionSource::Claude => Some("subagents"),
            },
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub size_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct ScanOutput {
    pub files: Vec<ScannedFile>,
    pub warnings: ScanWarningCount,
}

/// Walks `root` depth-first for session logs, newest first.
///
/// At most `max_files_scanned` matching files are examined, so very old logs
/// in a huge tree may be missed. Unreadable directories are skipped.
pub fn scan_session_files(root: &Path, options: &ScanOptions<'_>) -> ScanOutput {
    let mut warnings = 0usize;
    let mut files: Vec<ScannedFile> = Vec::new();

    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "session root missing, nothing to scan");
        return ScanOutput {
            files,
            warnings: ScanWarningCount::from(warnings),
        };
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_excluded(root, entry.path(), options.exclude_substring));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(%error, "skipping unreadable entry");
                warnings += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some(options.extension) {
            continue;
        }
        if files.len() >= options.max_files_scanned {
            tracing::debug!(
                root = %root.display(),
                budget = options.max_files_scanned,
                "scan budget exhausted"
            );
            break;
        }

        let (modified, size_bytes) = match entry.metadata() {
            Ok(metadata) => (metadata.modified().ok(), metadata.len()),
            Err(_) => {
                warnings += 1;
                (None, 0)
            }
        };
        files.push(ScannedFile {
            path: entry.into_path(),
            modified,
            size_bytes,
        });
    }

    files.sort_by_key(|file| std::cmp::Reverse(file.modified.unwrap_or(SystemTime::UNIX_EPOCH)));
    files.truncate(options.return_count);

    ScanOutput {
        files,
        warnings: ScanWarningCount::from(warnings),
    }
}

fn is_excluded(root: &Path, path: &Path, exclude_substring: Option<&str>) -> bool {
    let Some(needle) = exclude_substring else {
        return false;
    };
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::tempdir;

    fn touch(path: &Path, age_secs: u64) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        let file = File::create(path).expect("create");
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        file.set_modified(modified).expect("set mtime");
    }

    fn options(return_count: usize, budget: usize) -> ScanOptions<'static> {
        ScanOptions {
            return_count,
            max_files_scanned: budget,
            extension: "jsonl",
            exclude_substring: Some("subagents"),
        }
    }

    #[test]
    fn returns_newest_first_and_truncates() {
        let dir = tempdir().expect("tempdir");
        touch(&dir.path().join("2026/01/01/a.jsonl"), 300);
        touch(&dir.path().join("2026/01/02/b.jsonl"), 100);
        touch(&dir.path().join("2026/01/02/c.jsonl"), 200);
        touch(&dir.path().join("2026/01/02/notes.txt"), 10);

        let output = scan_session_files(dir.path(), &options(2, 100));
        let names: Vec<String> = output
            .files
            .iter()
            .map(|file| file.path.file_name().expect("file name").to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["b.jsonl", "c.jsonl"]);
        assert_eq!(output.warnings.get(), 0);
    }

    #[test]
    fn respects_scan_budget() {
        let dir = tempdir().expect("tempdir");
        for i in 0..5 {
            touch(&dir.path().join(format!("s{i}.jsonl")), i * 10);
        }
        let output = scan_session_files(dir.path(), &options(10, 3));
        assert_eq!(output.files.len(), 3);
    }

    #[test]
    fn skips_excluded_subdirectories() {
        let dir = tempdir().expect("tempdir");
        touch(&dir.path().join("proj/s1.jsonl"), 10);
        touch(&dir.path().join("proj/s1/subagents/agent-1.jsonl"), 1);

        let output = scan_session_files(dir.path(), &options(10, 100));
        assert_eq!(output.files.len(), 1);
        assert!(output.files[0].path.ends_with("proj/s1.jsonl"));
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = tempdir().expect("tempdir");
        let output = scan_session_files(&dir.path().join("missing"), &options(10, 100));
        assert!(output.files.is_empty());
    }
}

use crate::domain::{
    FileFacts, SessionSource, SessionSummary, file_stem_string, finish_summary, find_title,
    parse_lines, summarize_records, system_time_to_rfc3339, truncate_title,
};
use crate::infra::{
    HEAD_READ_BYTES, INDEX_CHECK_BYTES, IndexHit, ScannedFile, TITLE_SCAN_BYTES, read_head,
};

/// Builds the list-view summary of one log file, or `None` when nothing in
/// its head parses.
///
/// Counts and timestamps only reflect the head of the file; the detail
/// reader corrects them with a full pass.
pub fn summarize_session_file(
    source: SessionSource,
    file: &ScannedFile,
    index_hit: Option<&IndexHit>,
) -> Option<SessionSummary> {
    let facts = FileFacts {
        path: file.path.clone(),
        size_bytes: file.size_bytes,
        modified_rfc3339: file.modified.and_then(system_time_to_rfc3339),
    };

    // The index can outlive its log's contents; trust it only while the
    // file still holds a parseable record.
    if let Some(hit) = index_hit.filter(|_| has_parseable_record(file)) {
        if let Some(summary) = summary_from_index(source, hit, &facts) {
            return Some(summary);
        }
    }

    let head = match read_head(&file.path, HEAD_READ_BYTES) {
        Ok(head) => head,
        Err(error) => {
            tracing::debug!(path = %file.path.display(), %error, "failed to read session head");
            return None;
        }
    };
    let mut draft = summarize_records(source, &parse_lines(&head))?;

    if draft.title.is_none() && head.len() >= HEAD_READ_BYTES {
        draft.title = read_head(&file.path, TITLE_SCAN_BYTES)
            .ok()
            .and_then(|larger| find_title(source, &parse_lines(&larger)));
    }

    if let Some(hit) = index_hit {
        if draft.message_count == 0 {
            draft.message_count = hit.entry.message_count.unwrap_or(0);
        }
        if draft.cwd.is_none() {
            draft.cwd = index_cwd(hit);
        }
    }

    Some(finish_summary(source, draft, facts))
}

fn has_parseable_record(file: &ScannedFile) -> bool {
    if file.size_bytes == 0 {
        return false;
    }
    read_head(&file.path, INDEX_CHECK_BYTES).is_ok_and(|head| !parse_lines(&head).is_empty())
}

fn summary_from_index(
    source: SessionSource,
    hit: &IndexHit,
    facts: &FileFacts,
) -> Option<SessionSummary> {
    let title = truncate_title(hit.entry.title_hint()?);
    let session_id = non_empty(hit.entry.session_id.as_deref())
        .or_else(|| file_stem_string(&facts.path))
        .unwrap_or_else(|| "(unknown)".to_string());
    let updated_at = non_empty(hit.entry.modified.as_deref())
        .or_else(|| facts.modified_rfc3339.clone())
        .unwrap_or_default();
    let created_at = non_empty(hit.entry.created.as_deref()).unwrap_or_else(|| updated_at.clone());

    Some(SessionSummary {
        source,
        session_id,
        title,
        cwd: index_cwd(hit).unwrap_or_default(),
        created_at,
        updated_at,
        message_count: hit.entry.message_count.unwrap_or(0),
        file_path: facts.path.clone(),
        file_size_bytes: facts.size_bytes,
    })
}

fn index_cwd(hit: &IndexHit) -> Option<String> {
    non_empty(hit.entry.project_path.as_deref()).or_else(|| non_empty(hit.original_path.as_deref()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

use crate::domain::{AccumulatedSession, SessionAccumulator, SessionSource, parse_line, parse_lines};
use std::io;
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const MAX_EXTRACTED_MESSAGES: usize = 5_000;

#[derive(Debug, Error)]
pub enum LoadSessionLogError {
    #[error("session file has no readable records: {0}")]
    Empty(String),

    #[error("failed to read session file: {0}")]
    Read(#[from] io::Error),
}

/// Reads a whole session log, line by line, keeping at most
/// [`MAX_EXTRACTED_MESSAGES`] messages.
///
/// If streaming breaks part way (typically a line that is not UTF-8), the
/// file is read into memory once and parsed per line instead.
pub async fn load_session_log(
    source: SessionSource,
    path: &Path,
) -> Result<AccumulatedSession, LoadSessionLogError> {
    let session = match stream_session_log(source, path).await {
        Ok(session) => session,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "streaming read failed, reading whole file");
            buffered_session_log(source, path).await?
        }
    };

    if session.records == 0 {
        return Err(LoadSessionLogError::Empty(path.display().to_string()));
    }
    Ok(session)
}

async fn stream_session_log(
    source: SessionSource,
    path: &Path,
) -> io::Result<AccumulatedSession> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut accumulator = SessionAccumulator::with_message_cap(source, MAX_EXTRACTED_MESSAGES);

    while let Some(line) = lines.next_line().await? {
        let Some(value) = parse_line(line.as_bytes()) else {
            continue;
        };
        accumulator.push(&value);
        if accumulator.is_full() {
            tracing::debug!(path = %path.display(), "message cap reached, stopping read");
            break;
        }
    }

    Ok(accumulator.finish())
}

async fn buffered_session_log(
    source: SessionSource,
    path: &Path,
) -> io::Result<AccumulatedSession> {
    let bytes = tokio::fs::read(path).await?;
    let mut accumulator = SessionAccumulator::with_message_cap(source, MAX_EXTRACTED_MESSAGES);
    for value in parse_lines(&bytes) {
        accumulator.push(&value);
        if accumulator.is_full() {
            break;
        }
    }
    Ok(accumulator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageRole;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_every_line_of_a_codex_log() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("rollout.jsonl");
        let mut text = String::from(
            r#"{"timestamp":"2026-01-01T00:00:00Z","type":"session_meta","payload":{"id":"abc","cwd":"/tmp"}}"#,
        );
        text.push('\n');
        text.push_str(r#"{"type":"response_item","payload":{"type":"message","role":"developer","content":[{"type":"input_text","text":"rules"}]}}"#);
        text.push('\n');
        for i in 0..50 {
            text.push_str(&format!(
                r#"{{"timestamp":"2026-01-01T00:{:02}:00Z","type":"response_item","payload":{{"type":"message","role":"user","content":[{{"type":"input_text","text":"msg {i}"}}]}}}}"#,
                i % 60
            ));
            text.push('\n');
        }
        fs::write(&path, text).expect("write");

        let session = load_session_log(SessionSource::Codex, &path).await.expect("load");
        assert_eq!(session.session_id.as_deref(), Some("abc"));
        assert_eq!(session.messages.len(), 50);
        assert_eq!(session.messages[0].role, MessageRole::User);
        assert_eq!(session.messages[49].text, "msg 49");
        assert_eq!(session.updated_at.as_deref(), Some("2026-01-01T00:49:00Z"));
        assert!(!session.truncated);
    }

    #[tokio::test]
    async fn falls_back_when_stream_hits_invalid_utf8() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("s.jsonl");
        let mut bytes = br#"{"type":"user","message":{"content":"before"}}"#.to_vec();
        bytes.push(b'\n');
        bytes.extend_from_slice(b"\xff\xfe broken\n");
        bytes.extend_from_slice(br#"{"type":"assistant","message":{"content":"after"}}"#);
        bytes.push(b'\n');
        fs::write(&path, bytes).expect("write");

        let session = load_session_log(SessionSource::Claude, &path).await.expect("load");
        let texts: Vec<&str> = session.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["before", "after"]);
    }

    #[tokio::test]
    async fn empty_and_unparsable_files_are_empty() {
        let dir = tempdir().expect("tempdir");
        let empty = dir.path().join("empty.jsonl");
        fs::write(&empty, "").expect("write");
        let garbage = dir.path().join("garbage.jsonl");
        fs::write(&garbage, "nope\n").expect("write");

        for path in [empty, garbage] {
            let result = load_session_log(SessionSource::Claude, &path).await;
            assert!(matches!(result, Err(LoadSessionLogError::Empty(_))));
        }
    }
}

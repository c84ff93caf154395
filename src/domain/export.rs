use crate::domain::{Message, SessionSource};
use std::fmt::Write as _;
use std::path::Path;

pub struct ExportHeader<'a> {
    pub source: SessionSource,
    pub session_id: &'a str,
    pub updated_at: &'a str,
    pub cwd: &'a str,
    pub file_path: &'a Path,
}

pub fn render_markdown(header: &ExportHeader<'_>, messages: &[Message]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} session {}", header.source.label(), header.session_id);
    out.push('\n');
    let _ = writeln!(out, "- Source: {}", header.source.label());
    let _ = writeln!(out, "- Session ID: {}", header.session_id);
    let _ = writeln!(out, "- Updated: {}", or_dash(header.updated_at));
    let _ = writeln!(out, "- Working directory: {}", or_dash(header.cwd));
    let _ = writeln!(out, "- File: {}", header.file_path.display());
    out.push('\n');
    out.push_str("---\n\n");

    if messages.is_empty() {
        out.push_str("_No messages found in this session._\n");
        return out;
    }

    for (index, message) in messages.iter().enumerate() {
        let _ = write!(out, "## {}. {}", index + 1, message.role.label());
        if let Some(timestamp) = message.timestamp.as_deref() {
            let _ = write!(out, " · {timestamp}");
        }
        out.push_str("\n\n");
        if message.text.is_empty() {
            out.push_str("_(empty message)_\n\n");
        } else {
            out.push_str(&message.text);
            out.push_str("\n\n");
        }
    }
    out
}

/// `<source>-<session id>.md`, restricted to characters safe in a file name.
pub fn export_file_name(source: SessionSource, session_id: &str) -> String {
    let sanitized: String = session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('.');
    let stem = if sanitized.is_empty() { "session" } else { sanitized };
    format!("{}-{stem}.md", source.flag_value())
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageRole;

    fn header(path: &Path) -> ExportHeader<'_> {
        ExportHeader {
            source: SessionSource::Codex,
            session_id: "abc",
            updated_at: "2026-01-01T00:00:00Z",
            cwd: "",
            file_path: path,
        }
    }

    #[test]
    fn renders_messages_in_order_with_roles() {
        let path = Path::new("/s/a.jsonl");
        let messages = vec![
            Message {
                role: MessageRole::User,
                text: "Fix bug".to_string(),
                timestamp: Some("2026-01-01T00:00:00Z".to_string()),
            },
            Message {
                role: MessageRole::Assistant,
                text: String::new(),
                timestamp: None,
            },
            Message {
                role: MessageRole::Assistant,
                text: "Done".to_string(),
                timestamp: None,
            },
        ];
        let markdown = render_markdown(&header(path), &messages);

        assert!(markdown.starts_with("# Codex session abc\n"));
        assert!(markdown.contains("- Working directory: -\n"));
        assert!(markdown.contains("- File: /s/a.jsonl\n"));
        let first = markdown.find("## 1. User · 2026-01-01T00:00:00Z").expect("first");
        let empty = markdown.find("## 2. Assistant\n\n_(empty message)_").expect("second");
        let third = markdown.find("## 3. Assistant\n\nDone").expect("third");
        assert!(first < empty && empty < third);
        assert!(markdown[first..empty].contains("Fix bug"));
    }

    #[test]
    fn states_when_no_messages_exist() {
        let markdown = render_markdown(&header(Path::new("/s/a.jsonl")), &[]);
        assert!(markdown.contains("_No messages found in this session._"));
        assert!(!markdown.contains("## 1."));
    }

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(
            export_file_name(SessionSource::Claude, "../etc/passwd"),
            "claude-_etc_passwd.md"
        );
        assert_eq!(export_file_name(SessionSource::Codex, "abc-1"), "codex-abc-1.md");
        assert_eq!(export_file_name(SessionSource::Codex, ""), "codex-session.md");
    }
}

use crate::domain::{Message, MessageRole};

const BOOTSTRAP_MARKERS: &[&str] = &[
    "<environment_context>",
    "<user_instructions>",
    "# agents.md instructions",
    "<instructions>",
    "<permissions instructions>",
    "caveat: the messages below were generated by the user",
    "<command-name>",
    "<local-command-stdout>",
];

/// True when the text looks like instructions or environment context the
/// tool injected, rather than something the user typed.
pub fn is_bootstrap_text(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BOOTSTRAP_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

fn is_preamble(message: &Message) -> bool {
    message.role == MessageRole::System || is_bootstrap_text(&message.text)
}

/// Drops the leading run of system and bootstrap-like messages.
///
/// Every log opens with injected instructions in its first slot; the run
/// ends at the first message that is neither.
pub fn strip_leading_preamble(messages: &[Message]) -> &[Message] {
    let start = messages
        .iter()
        .position(|message| !is_preamble(message))
        .unwrap_or(messages.len());
    &messages[start..]
}

mod message;

pub use message::{ChatMessage, MessageRole};

/// Renders a history as `role: content` lines, used for debug logging.
pub fn transcript(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|message| format!("{}: {}", message.role, message.content))
        .collect::<Vec<String>>()
        .join("\n")
}

pub mod client;
pub mod context;
pub mod prompt;

pub use context::{ChatMessage, MessageRole};

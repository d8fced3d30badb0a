mod agent;
pub mod providers;

pub use agent::{CompletionAgent, EmptyCompletion};

//! Retrieval-augmented question answering over a Qdrant collection.
//!
//! [`get_rag_chain`] wires a history-aware retriever and a stuff-documents
//! answer step into a [`RagChain`]:
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use ragchain::{ChatMessage, config::store::RagConfig, get_rag_chain};
//!
//! let config = RagConfig::read("config.toml".into())?;
//! let chain = get_rag_chain("gpt-4o-mini", &config)?;
//!
//! let history = vec![
//!     ChatMessage::user("Who maintains the handbook?"),
//!     ChatMessage::assistant("The platform team."),
//! ];
//! let output = chain.invoke("How do I reach them?", &history).await?;
//! println!("{}", output.answer);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod chain;
pub mod chat;
pub mod config;
pub mod utils;

pub use archive::{Document, Retriever};
pub use chain::{DEFAULT_MODEL, RagChain, RagOutput, get_rag_chain};
pub use chat::{ChatMessage, MessageRole};

pub mod retriever;
pub mod storage;

pub use retriever::{Retriever, VectorStoreRetriever};
pub use storage::{Document, DocumentStorage};

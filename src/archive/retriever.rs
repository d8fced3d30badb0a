use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::{
    chat::client::providers::DynEmbeddingModel,
    config::structure::{LLMConfig, RetrievalConfig},
};

use super::storage::{Document, DocumentStorage};

/// Anything that can turn a query into an ordered list of documents.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> anyhow::Result<Vec<Document>>;
}

/// Embeds the query and asks the vector store for the `k` nearest documents.
pub struct VectorStoreRetriever {
    embedding_model: Arc<dyn DynEmbeddingModel>,
    storage: Arc<DocumentStorage>,
    k: u64,
}

impl VectorStoreRetriever {
    pub fn new(
        embedding_model: Arc<dyn DynEmbeddingModel>,
        storage: Arc<DocumentStorage>,
        k: u64,
    ) -> Self {
        Self {
            embedding_model,
            storage,
            k,
        }
    }

    /// Builds the embedding client and storage handle described by `config`.
    /// Without an explicit embedding provider the completion provider and its
    /// credentials are reused.
    pub fn from_config(config: &RetrievalConfig, llm: &LLMConfig) -> anyhow::Result<Self> {
        let (provider, api_key, api_key_env, base_url) = match config.embedding_provider {
            Some(provider) => (
                provider,
                config.embedding_api_key.as_deref(),
                config.embedding_api_key_env.as_deref(),
                config.embedding_base_url.as_deref(),
            ),
            None => (
                llm.provider,
                config
                    .embedding_api_key
                    .as_deref()
                    .or(llm.api_key.as_deref()),
                config
                    .embedding_api_key_env
                    .as_deref()
                    .or(llm.api_key_env.as_deref()),
                config
                    .embedding_base_url
                    .as_deref()
                    .or(llm.base_url.as_deref()),
            ),
        };

        let client = provider.client(&provider.api_key(api_key, api_key_env)?, base_url);
        let embedding_model = client
            .embedding_model(&config.embedding_model)
            .ok_or_else(|| anyhow!("{provider} does not provide embedding models"))?;

        let storage = Arc::new(DocumentStorage::new(config)?);

        Ok(Self::new(embedding_model, storage, config.k))
    }

    /// Verifies the collection matches the embedding model's dimensions.
    pub async fn health_check(&self) -> anyhow::Result<()> {
        self.storage
            .health_check(self.embedding_model.ndims() as u64)
            .await
    }
}

#[async_trait]
impl Retriever for VectorStoreRetriever {
    async fn retrieve(&self, query: &str) -> anyhow::Result<Vec<Document>> {
        let embedded = self.embedding_model.embed_text(query).await?;

        let documents = self
            .storage
            .search(
                embedded.vec.into_iter().map(|x| x as f32).collect::<Vec<f32>>(),
                self.k,
            )
            .await?;

        log::info!("retrieved {} document(s) for {query:?}", documents.len());

        Ok(documents)
    }
}

//! The retrieval chain: rewrite the question, retrieve, then answer.

mod history_aware;
mod stuff;

use std::sync::Arc;

use serde::Serialize;

pub use history_aware::HistoryAwareRetriever;
pub use stuff::{DEFAULT_DOCUMENT_SEPARATOR, StuffDocumentsChain};

use crate::{
    archive::{Document, Retriever, VectorStoreRetriever},
    chat::{ChatMessage, client::CompletionAgent, prompt::PromptConfig},
    config::structure::RagConfigInner,
};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Everything one invocation saw and produced.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RagOutput {
    pub input: String,
    pub chat_history: Vec<ChatMessage>,
    pub context: Vec<Document>,
    pub answer: String,
}

#[derive(Clone)]
pub struct RagChain {
    retriever: HistoryAwareRetriever,
    combine: StuffDocumentsChain,
}

impl RagChain {
    /// Both stages share `llm`.
    pub fn new(
        llm: CompletionAgent,
        retriever: Arc<dyn Retriever>,
        prompts: &PromptConfig,
    ) -> anyhow::Result<Self> {
        let retriever =
            HistoryAwareRetriever::new(llm.clone(), retriever, prompts.contextualize_prompt());
        let combine = StuffDocumentsChain::new(llm, prompts.qa_prompt())?;

        Ok(Self { retriever, combine })
    }

    pub async fn invoke(
        &self,
        input: &str,
        chat_history: &[ChatMessage],
    ) -> anyhow::Result<RagOutput> {
        let context = self.retriever.invoke(input, chat_history).await?;
        let answer = self.combine.invoke(input, chat_history, &context).await?;

        Ok(RagOutput {
            input: input.to_string(),
            chat_history: chat_history.to_vec(),
            context,
            answer,
        })
    }
}

/// Builds the full chain for `model`. The name is handed to the provider as
/// is; an unknown model only fails once the chain is invoked.
pub fn get_rag_chain(model: &str, config: &RagConfigInner) -> anyhow::Result<RagChain> {
    let llm = CompletionAgent::new(&config.llm, model)?
        .with_settings(config.llm.max_tokens, config.llm.temperature);
    let retriever = VectorStoreRetriever::from_config(&config.retrieval, &config.llm)?;

    log::info!(
        "rag chain ready: {}/{} over `{}` (k = {})",
        config.llm.provider,
        model,
        config.retrieval.collection,
        config.retrieval.k
    );

    RagChain::new(llm, Arc::new(retriever), &config.prompt)
}

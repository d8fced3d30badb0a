use std::sync::Arc;

use crate::{
    archive::{Document, Retriever},
    chat::{
        ChatMessage,
        client::CompletionAgent,
        context,
        prompt::{CHAT_HISTORY, ChatPromptTemplate, INPUT, TemplateVariables},
    },
};

/// Retrieves with a standalone version of the latest question.
#[derive(Clone)]
pub struct HistoryAwareRetriever {
    llm: CompletionAgent,
    retriever: Arc<dyn Retriever>,
    prompt: ChatPromptTemplate,
}

impl HistoryAwareRetriever {
    pub fn new(
        llm: CompletionAgent,
        retriever: Arc<dyn Retriever>,
        prompt: ChatPromptTemplate,
    ) -> Self {
        Self {
            llm,
            retriever,
            prompt,
        }
    }

    /// Without history the input already stands alone and is returned as is,
    /// otherwise the model rewrites it.
    pub async fn standalone_question(
        &self,
        input: &str,
        chat_history: &[ChatMessage],
    ) -> anyhow::Result<String> {
        if chat_history.is_empty() {
            return Ok(input.to_string());
        }

        log::debug!("history:\n{}", context::transcript(chat_history));

        let prompt = self.prompt.format_prompt(
            &TemplateVariables::new()
                .with(INPUT, input)
                .with_messages(CHAT_HISTORY, chat_history),
        )?;

        let question = self.llm.complete(prompt).await?;
        log::info!("reformulated {input:?} as {question:?}");

        Ok(question)
    }

    pub async fn invoke(
        &self,
        input: &str,
        chat_history: &[ChatMessage],
    ) -> anyhow::Result<Vec<Document>> {
        let question = self.standalone_question(input, chat_history).await?;
        self.retriever.retrieve(&question).await
    }
}

use anyhow::ensure;

use crate::{
    archive::Document,
    chat::{
        ChatMessage,
        client::CompletionAgent,
        prompt::{CHAT_HISTORY, CONTEXT, ChatPromptTemplate, INPUT, TemplateVariables},
    },
};

pub const DEFAULT_DOCUMENT_SEPARATOR: &str = "\n\n";

/// Answers from every retrieved document at once, stuffed into `{context}`.
#[derive(Clone)]
pub struct StuffDocumentsChain {
    llm: CompletionAgent,
    prompt: ChatPromptTemplate,
}

impl StuffDocumentsChain {
    pub fn new(llm: CompletionAgent, prompt: ChatPromptTemplate) -> anyhow::Result<Self> {
        let variables = prompt.input_variables()?;
        ensure!(
            variables.iter().any(|name| name == CONTEXT),
            "answer prompt must reference {{{CONTEXT}}}, found {variables:?}"
        );

        Ok(Self { llm, prompt })
    }

    pub fn format_documents(documents: &[Document]) -> String {
        documents
            .iter()
            .map(|document| document.page_content.as_str())
            .collect::<Vec<&str>>()
            .join(DEFAULT_DOCUMENT_SEPARATOR)
    }

    pub async fn invoke(
        &self,
        input: &str,
        chat_history: &[ChatMessage],
        documents: &[Document],
    ) -> anyhow::Result<String> {
        let context = Self::format_documents(documents);

        let prompt = self.prompt.format_prompt(
            &TemplateVariables::new()
                .with(INPUT, input)
                .with(CONTEXT, &context)
                .with_messages(CHAT_HISTORY, chat_history),
        )?;

        self.llm.complete(prompt).await
    }
}

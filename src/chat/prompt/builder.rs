use serde::{Deserialize, Serialize};

use super::{ChatPromptTemplate, PromptPart};

pub const CHAT_HISTORY: &str = "chat_history";
pub const INPUT: &str = "input";
pub const CONTEXT: &str = "context";

const CONTEXTUALIZE_SYSTEM: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, \
formulate a standalone question which can be understood \
without the chat history. Do NOT answer the question, \
just reformulate it if needed and otherwise return it as is.";

const QA_SYSTEM: &str =
    "You are a helpful AI assistant. Use the following context to answer the user's question.";

const CONTEXT_TEMPLATE: &str = "Context: {context}";

/// System texts of the two chain prompts, overridable from the config file.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PromptConfig {
    #[serde(default = "default_contextualize_system")]
    pub contextualize_system: String,
    #[serde(default = "default_qa_system")]
    pub qa_system: String,
    /// Must reference `{context}`.
    #[serde(default = "default_context_template")]
    pub context_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            contextualize_system: default_contextualize_system(),
            qa_system: default_qa_system(),
            context_template: default_context_template(),
        }
    }
}

impl PromptConfig {
    /// Rewrites the latest question into a standalone one.
    pub fn contextualize_prompt(&self) -> ChatPromptTemplate {
        ChatPromptTemplate::from_messages([
            PromptPart::system(self.contextualize_system.clone()),
            PromptPart::placeholder(CHAT_HISTORY),
            PromptPart::user(format!("{{{INPUT}}}")),
        ])
    }

    /// Answers the question from the stuffed context.
    pub fn qa_prompt(&self) -> ChatPromptTemplate {
        ChatPromptTemplate::from_messages([
            PromptPart::system(self.qa_system.clone()),
            PromptPart::system(self.context_template.clone()),
            PromptPart::placeholder(CHAT_HISTORY),
            PromptPart::user(format!("{{{INPUT}}}")),
        ])
    }
}

fn default_contextualize_system() -> String {
    CONTEXTUALIZE_SYSTEM.to_string()
}

fn default_qa_system() -> String {
    QA_SYSTEM.to_string()
}

fn default_context_template() -> String {
    CONTEXT_TEMPLATE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompts_have_expected_shape() {
        let config = PromptConfig::default();

        let contextualize = config.contextualize_prompt();
        assert_eq!(contextualize.parts().len(), 3);
        assert_eq!(contextualize.parts()[2], PromptPart::user("{input}"));
        assert!(config.contextualize_system.contains("Do NOT answer the question"));

        let qa = config.qa_prompt();
        assert_eq!(qa.parts()[1], PromptPart::system("Context: {context}"));
        assert_eq!(qa.parts()[2], PromptPart::placeholder("chat_history"));
    }
}

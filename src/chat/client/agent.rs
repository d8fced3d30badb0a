use std::sync::Arc;

use rig::{completion::CompletionRequest, message::AssistantContent};

use crate::{chat::prompt::PromptValue, config::structure::LLMConfig};

use super::providers::DynCompletionModel;

#[derive(Debug, thiserror::Error)]
#[error("the language model returned no text content")]
pub struct EmptyCompletion;

/// A chat model plus the sampling settings every request carries.
#[derive(Clone)]
pub struct CompletionAgent {
    completion_model: Arc<dyn DynCompletionModel>,
    max_tokens: Option<u64>,
    temperature: Option<f64>,
}

impl CompletionAgent {
    /// Builds an agent for `model`. The name is not validated here.
    pub fn new(config: &LLMConfig, model: &str) -> anyhow::Result<Self> {
        let api_key = config
            .provider
            .api_key(config.api_key.as_deref(), config.api_key_env.as_deref())?;
        let client = config
            .provider
            .client(&api_key, config.base_url.as_deref());

        log::debug!("completion model: {}/{}", config.provider, model);

        Ok(Self {
            completion_model: client.completion_model(model),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn from_model(completion_model: Arc<dyn DynCompletionModel>) -> Self {
        Self {
            completion_model,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_settings(mut self, max_tokens: Option<u64>, temperature: Option<f64>) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Sends a rendered prompt and returns the text of the reply, trimmed.
    pub async fn complete(&self, prompt: PromptValue) -> anyhow::Result<String> {
        let request = CompletionRequest {
            additional_params: None,
            chat_history: prompt.chat_history.into_iter().map(|x| x.into()).collect(),
            documents: vec![],
            max_tokens: self.max_tokens,
            preamble: prompt.preamble,
            temperature: self.temperature,
            tools: vec![],
            prompt: prompt.prompt.into(),
        };

        let response = self.completion_model.completion(request).await?;

        let text = response
            .iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<&str>>()
            .join("");

        match text.trim() {
            "" => Err(EmptyCompletion.into()),
            trimmed => Ok(trimmed.to_string()),
        }
    }
}

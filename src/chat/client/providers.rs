use std::{fmt::Display, sync::Arc};

use anyhow::anyhow;
use async_trait::async_trait;

use rig::{
    OneOrMany,
    completion::{CompletionError, CompletionRequest},
    embeddings::{Embedding, EmbeddingError},
    message::AssistantContent,
    providers::{anthropic, cohere, gemini, openai, perplexity, xai},
};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub enum ProviderClient {
    Anthropic(anthropic::Client),
    Cohere(cohere::Client),
    Gemini(gemini::Client),
    OpenAI(openai::Client),
    Perplexity(perplexity::Client),
    Xai(xai::Client),
}

#[async_trait]
pub trait DynEmbeddingModel: Send + Sync {
    async fn embed_text(&self, input: &str) -> Result<Embedding, EmbeddingError>;
    fn ndims(&self) -> usize;
}

#[async_trait]
impl<T> DynEmbeddingModel for T
where
    T: rig::embeddings::EmbeddingModel + Send + Sync,
{
    async fn embed_text(&self, input: &str) -> Result<Embedding, EmbeddingError> {
        rig::embeddings::EmbeddingModel::embed_text(self, input).await
    }

    fn ndims(&self) -> usize {
        rig::embeddings::EmbeddingModel::ndims(self)
    }
}

#[async_trait]
pub trait DynCompletionModel: Send + Sync {
    async fn completion(
        &self,
        completion: CompletionRequest,
    ) -> Result<OneOrMany<AssistantContent>, CompletionError>;
}

#[async_trait]
impl<T> DynCompletionModel for T
where
    T: rig::completion::CompletionModel + Send + Sync,
{
    async fn completion(
        &self,
        request: CompletionRequest,
    ) -> Result<OneOrMany<AssistantContent>, CompletionError> {
        Ok(rig::completion::CompletionModel::completion(self, request)
            .await?
            .choice)
    }
}

impl ProviderClient {
    /// Returns a completion model wrapper for the given provider and model name.
    /// The model name is passed through untouched, the provider rejects unknown ones.
    pub fn completion_model(&self, model: &str) -> Arc<dyn DynCompletionModel> {
        match self {
            ProviderClient::Anthropic(client) => Arc::new(client.completion_model(model)),
            ProviderClient::Cohere(client) => Arc::new(client.completion_model(model)),
            ProviderClient::Gemini(client) => Arc::new(client.completion_model(model)),
            ProviderClient::OpenAI(client) => Arc::new(client.completion_model(model)),
            ProviderClient::Perplexity(client) => Arc::new(client.completion_model(model)),
            ProviderClient::Xai(client) => Arc::new(client.completion_model(model)),
        }
    }

    /// Returns an embedding model wrapper for the given provider and model name.
    /// Returns `None` if the provider does not support embeddings.
    pub fn embedding_model(&self, model: &str) -> Option<Arc<dyn DynEmbeddingModel>> {
        match self {
            ProviderClient::Anthropic(_) => None,
            // retrieval embeds queries, documents were embedded as "search_document"
            ProviderClient::Cohere(client) => {
                Some(Arc::new(client.embedding_model(model, "search_query")))
            }
            ProviderClient::Gemini(client) => Some(Arc::new(client.embedding_model(model))),
            ProviderClient::OpenAI(client) => Some(Arc::new(client.embedding_model(model))),
            ProviderClient::Perplexity(_) => None,
            ProviderClient::Xai(client) => Some(Arc::new(client.embedding_model(model))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Provider {
    #[serde(rename = "anthropic")]
    Anthropic,

    #[serde(rename = "cohere")]
    Cohere,

    #[serde(rename = "gemini")]
    Gemini,

    #[default]
    #[serde(rename = "openai")]
    #[serde(alias = "openai-api")]
    #[serde(alias = "openai-compatible")]
    OpenAI,

    #[serde(rename = "perplexity")]
    Perplexity,

    #[serde(rename = "xai")]
    Xai,
}

impl TryFrom<String> for Provider {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        serde_plain::from_str(&value).map_err(|e| anyhow::anyhow!("{}", e))
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        serde_plain::to_string(self)
            .map_err(|_| std::fmt::Error)?
            .fmt(f)
    }
}

impl Provider {
    /// Environment variable consulted when no key is configured.
    pub fn env_key(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Cohere => "COHERE_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Perplexity => "PERPLEXITY_API_KEY",
            Provider::Xai => "XAI_API_KEY",
        }
    }

    /// Picks the configured key, falling back to `env_var` or, when that is
    /// unset too, to [`Provider::env_key`].
    pub fn api_key(
        &self,
        configured: Option<&str>,
        env_var: Option<&str>,
    ) -> anyhow::Result<String> {
        if let Some(key) = configured.filter(|key| !key.is_empty()) {
            return Ok(key.to_string());
        }

        let env_var = env_var.unwrap_or(self.env_key());
        match std::env::var(env_var) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(anyhow!(
                "missing API key for {}: set it in the config or export {}",
                self,
                env_var
            )),
        }
    }

    pub fn client(&self, api_key: &str, custom_url: Option<&str>) -> ProviderClient {
        match self {
            Provider::Anthropic => {
                let builder = anthropic::ClientBuilder::new(api_key);
                if let Some(url) = custom_url {
                    ProviderClient::Anthropic(builder.base_url(url).build())
                } else {
                    ProviderClient::Anthropic(builder.build())
                }
            }
            Provider::Cohere => match custom_url {
                None => ProviderClient::Cohere(cohere::Client::new(api_key)),
                Some(url) => ProviderClient::Cohere(cohere::Client::from_url(api_key, url)),
            },
            Provider::Gemini => match custom_url {
                None => ProviderClient::Gemini(gemini::Client::new(api_key)),
                Some(url) => ProviderClient::Gemini(gemini::Client::from_url(api_key, url)),
            },
            Provider::OpenAI => match custom_url {
                None => ProviderClient::OpenAI(openai::Client::new(api_key)),
                Some(url) => ProviderClient::OpenAI(openai::Client::from_url(api_key, url)),
            },
            Provider::Perplexity => match custom_url {
                None => ProviderClient::Perplexity(perplexity::Client::new(api_key)),
                Some(url) => ProviderClient::Perplexity(perplexity::Client::from_url(api_key, url)),
            },
            Provider::Xai => {
                if custom_url.is_some() {
                    log::warn!("xai does not support a custom base url, ignoring it");
                }
                ProviderClient::Xai(xai::Client::new(api_key))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip_through_strings() {
        assert_eq!(
            Provider::try_from("openai-compatible".to_string()).unwrap(),
            Provider::OpenAI
        );
        assert_eq!(Provider::try_from("gemini".to_string()).unwrap(), Provider::Gemini);
        assert!(Provider::try_from("llamafile".to_string()).is_err());
        assert_eq!(Provider::Xai.to_string(), "xai");
    }

    #[test]
    fn configured_key_wins_over_environment() {
        let key = Provider::Perplexity
            .api_key(Some("pplx-configured"), Some("PATH"))
            .unwrap();
        assert_eq!(key, "pplx-configured");
    }

    #[test]
    fn unset_variable_is_a_missing_key() {
        let var = format!("RAGCHAIN_UNSET_KEY_{}", std::process::id());

        let why = Provider::Cohere.api_key(None, Some(&var)).unwrap_err();
        assert_eq!(
            why.to_string(),
            format!("missing API key for cohere: set it in the config or export {var}")
        );

        // an empty configured key does not count
        assert!(Provider::Cohere.api_key(Some(""), Some(&var)).is_err());
    }

    #[test]
    fn key_is_read_from_the_named_variable() {
        // PATH is set in any environment the tests run in
        let key = Provider::OpenAI.api_key(None, Some("PATH")).unwrap();
        assert_eq!(key, std::env::var("PATH").unwrap());
    }

    #[test]
    fn any_model_name_is_accepted() {
        let client = Provider::OpenAI.client("sk-test", Some("http://127.0.0.1:9"));
        let _ = client.completion_model("not-a-real-model");
        let _ = client.completion_model("");
        assert!(client.embedding_model("text-embedding-3-small").is_some());
        assert!(
            Provider::Anthropic
                .client("sk-test", None)
                .embedding_model("anything")
                .is_none()
        );
    }
}

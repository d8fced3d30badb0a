use serde::{Deserialize, Serialize};

use crate::chat::{client::providers::Provider, prompt::PromptConfig};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RagConfigTOML {
    pub config: RagConfigInner,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RagConfigInner {
    #[serde(default)]
    pub llm: LLMConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LLMConfig {
    #[serde(default)]
    pub provider: Provider,
    /// Falls back to the environment when unset.
    pub api_key: Option<String>,
    /// Variable holding the key, defaults to the provider's usual one.
    pub api_key_env: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: Option<u64>,
    pub temperature: Option<f64>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            api_key_env: None,
            model: default_model(),
            base_url: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    #[serde(default = "default_qdrant_host")]
    pub qdrant_host: String,
    pub qdrant_port: Option<u16>,
    pub qdrant_https: Option<bool>,
    pub qdrant_api_key: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Number of documents handed to the answer prompt.
    #[serde(default = "default_k")]
    pub k: u64,
    pub similarity_threshold: Option<f32>,
    /// Payload field holding the document text.
    #[serde(default = "default_content_field")]
    pub content_field: String,

    /// Defaults to the completion provider.
    pub embedding_provider: Option<Provider>,
    pub embedding_api_key: Option<String>,
    pub embedding_api_key_env: Option<String>,
    pub embedding_base_url: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            qdrant_host: default_qdrant_host(),
            qdrant_port: None,
            qdrant_https: None,
            qdrant_api_key: None,
            collection: default_collection(),
            k: default_k(),
            similarity_threshold: None,
            content_field: default_content_field(),
            embedding_provider: None,
            embedding_api_key: None,
            embedding_api_key_env: None,
            embedding_base_url: None,
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_model() -> String {
    crate::chain::DEFAULT_MODEL.to_string()
}

fn default_qdrant_host() -> String {
    "localhost".to_string()
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_k() -> u64 {
    2
}

fn default_content_field() -> String {
    "page_content".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: RagConfigTOML = toml::from_str(
            r#"
            [config.llm]
            provider = "anthropic"
            model = "claude-3-5-haiku-latest"
            max_tokens = 1024

            [config.retrieval]
            collection = "handbook"
            "#,
        )
        .unwrap();

        let config = parsed.config;
        assert_eq!(config.llm.provider, Provider::Anthropic);
        assert_eq!(config.llm.max_tokens, Some(1024));
        assert_eq!(config.llm.api_key, None);
        assert_eq!(config.retrieval.collection, "handbook");
        assert_eq!(config.retrieval.k, 2);
        assert_eq!(config.retrieval.content_field, "page_content");
        assert_eq!(config.prompt, PromptConfig::default());
    }

    #[test]
    fn empty_config_table_is_default() {
        let parsed: RagConfigTOML = toml::from_str("[config]").unwrap();
        assert_eq!(parsed, RagConfigTOML::default());
        assert_eq!(parsed.config.llm.model, "gpt-4o-mini");
    }
}

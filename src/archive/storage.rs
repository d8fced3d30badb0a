use std::collections::HashMap;

use qdrant_client::{
    Qdrant,
    qdrant::{
        SearchPoints, SearchPointsBuilder, Value, point_id::PointIdOptions,
        vectors_config::Config,
    },
};
use serde::{Deserialize, Serialize};

use crate::config::structure::RetrievalConfig;

/// A fragment of a source document as stored in the vector collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub page_content: String,
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(id: impl Into<String>, page_content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            page_content: page_content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Reads `content_field` as the text and every other payload field as metadata.
    pub fn try_from(
        id: String,
        mut payload: HashMap<String, Value>,
        content_field: &str,
    ) -> Option<Self> {
        let page_content = payload.remove(content_field)?.as_str()?.to_string();

        let metadata = payload
            .into_iter()
            .map(|(key, value)| {
                let value = match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string(),
                };
                (key, value)
            })
            .collect();

        Some(Self {
            id,
            page_content,
            metadata,
        })
    }
}

struct StorageSettings {
    collection: String,
    content_field: String,
    similarity_threshold: Option<f32>,
}

impl StorageSettings {
    /// Nearest-neighbour query; the score threshold is applied by Qdrant.
    fn search_request(&self, embedding: Vec<f32>, limit: u64) -> SearchPoints {
        let builder =
            SearchPointsBuilder::new(&self.collection, embedding, limit).with_payload(true);

        match self.similarity_threshold {
            Some(threshold) => builder.score_threshold(threshold).build(),
            None => builder.build(),
        }
    }
}

/// Read-only access to a Qdrant collection populated by an external indexer.
pub struct DocumentStorage {
    client: Qdrant,
    settings: StorageSettings,
}

impl DocumentStorage {
    pub fn new(config: &RetrievalConfig) -> anyhow::Result<Self> {
        let url = format!(
            "http{}://{}:{}",
            match config.qdrant_https.unwrap_or(false) {
                true => "s",
                false => "",
            },
            config.qdrant_host,
            config.qdrant_port.unwrap_or(6334)
        );

        log::debug!("qdrant url: {url}, collection: {}", config.collection);

        let client = Qdrant::from_url(&url)
            .api_key(config.qdrant_api_key.clone())
            .skip_compatibility_check()
            .build()?;

        Ok(DocumentStorage {
            client,
            settings: StorageSettings {
                collection: config.collection.clone(),
                content_field: config.content_field.clone(),
                similarity_threshold: config.similarity_threshold,
            },
        })
    }

    /// Checks that the server is up and the collection holds `ndims` vectors.
    pub async fn health_check(&self, ndims: u64) -> anyhow::Result<()> {
        self.client.health_check().await?;

        let collection_info = self
            .client
            .collection_info(self.settings.collection.clone())
            .await?;

        let vector_size: u64 = async {
            if let Config::Params(params) = collection_info
                .result?
                .config?
                .params?
                .vectors_config?
                .config?
            {
                Some(params.size)
            } else {
                None
            }
        }
        .await
        .ok_or(anyhow::anyhow!("failed to get vector size"))?;

        if vector_size != ndims {
            Err(anyhow::anyhow!(
                "vector size mismatch, expected {} but got {}",
                ndims,
                vector_size
            ))
        } else {
            Ok(())
        }
    }

    /// Returns up to `limit` documents nearest to `embedding`, best first.
    pub async fn search(
        &self,
        embedding: Vec<impl Into<f32>>,
        limit: u64,
    ) -> anyhow::Result<Vec<Document>> {
        let embedding = embedding
            .into_iter()
            .map(|x| x.into())
            .collect::<Vec<f32>>();

        let search_result = self
            .client
            .search_points(self.settings.search_request(embedding, limit))
            .await?;

        Ok(search_result
            .result
            .into_iter()
            .enumerate()
            .filter_map(|(i, point)| {
                let id = match point.id?.point_id_options? {
                    PointIdOptions::Num(id) => id.to_string(),
                    PointIdOptions::Uuid(id) => id,
                };

                log::debug!("hit #{i}: {id} (score {})", point.score);

                let document = Document::try_from(id, point.payload, &self.settings.content_field);
                if document.is_none() {
                    log::warn!(
                        "point without a `{}` string payload, skipping",
                        self.settings.content_field
                    );
                }
                document
            })
            .collect())
    }
}

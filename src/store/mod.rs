//! Qdrant vector database integration
//!
//! This module wraps the Qdrant client and provides:
//! - Collection management (create with cosine distance, destructive reset)
//! - Batched point upserts
//! - Vector similarity search
//! - Full-text metadata scrolling for the lexical retrieval leg

mod payload;

pub use payload::*;

use crate::config::Config;
use crate::error::{Error, Result};
use qdrant_client::qdrant::condition::ConditionOneOf;
use qdrant_client::qdrant::r#match::MatchValue;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance,
    FieldCondition, FieldType, Filter, Match, PointId, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use tracing::{debug, info};

/// A hit from either ranking source. `score` is source-specific: cosine
/// similarity for vector search, unset (0.0) for lexical scroll results,
/// whose relevance is positional.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub source_id: String,
    pub payload: DocPayload,
    pub score: f32,
}

/// Information about a Qdrant collection
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub points_count: u64,
    pub indexed_vectors_count: u64,
    pub status: String,
}

/// Qdrant store handle
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantStore {
    /// Connect to Qdrant using config
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::new(
            &config.qdrant_url,
            &config.collection_name,
            config.embedding.dimension,
        )
        .await
    }

    /// Create a new store connection directly with URL and collection name
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .skip_compatibility_check()
            .build()
            .map_err(|e| Error::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
        })
    }

    /// Ensure the collection exists with the configured dimensionality and
    /// cosine distance, plus a full-text index on the content payload for
    /// the lexical queries. Creating is non-destructive; see
    /// `reset_collection` for the destructive path.
    pub async fn ensure_collection(&self) -> Result<()> {
        let exists = self.client.collection_exists(&self.collection).await?;

        if exists {
            debug!("Collection {} already exists", self.collection);
            return Ok(());
        }

        info!(
            "Creating collection {} with dimension {}",
            self.collection, self.dimension
        );

        let vectors_config = VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(vectors_config),
            )
            .await?;

        self.client
            .create_field_index(CreateFieldIndexCollectionBuilder::new(
                &self.collection,
                "content",
                FieldType::Text,
            ))
            .await?;

        info!("Collection {} created successfully", self.collection);
        Ok(())
    }

    /// Check if the collection exists
    pub async fn collection_exists(&self) -> Result<bool> {
        Ok(self.client.collection_exists(&self.collection).await?)
    }

    /// Reset the collection (delete and recreate). Destructive; callers
    /// must make this an explicit operation, never part of a load.
    pub async fn reset_collection(&self) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            info!("Deleting existing collection {}", self.collection);
            self.client.delete_collection(&self.collection).await?;
        }

        self.ensure_collection().await
    }

    /// Get collection info (point count, etc)
    pub async fn get_collection_info(&self) -> Result<Option<CollectionInfo>> {
        if !self.client.collection_exists(&self.collection).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(&self.collection).await?;
        if let Some(result) = info.result {
            Ok(Some(CollectionInfo {
                points_count: result.points_count.unwrap_or(0),
                indexed_vectors_count: result.indexed_vectors_count.unwrap_or(0),
                status: format!("{:?}", result.status()),
            }))
        } else {
            Ok(None)
        }
    }

    /// Upsert DocPoint objects (converts to PointStruct internally)
    pub async fn upsert_points(&self, points: Vec<DocPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        debug!(
            "Upserting {} points to collection {}",
            points.len(),
            self.collection
        );

        let point_structs: Vec<PointStruct> =
            points.into_iter().map(|p| p.to_point_struct()).collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, point_structs))
            .await?;

        Ok(())
    }

    /// Search for similar vectors
    pub async fn search(&self, query_vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>> {
        debug!(
            "Searching collection {} with limit {}",
            self.collection, limit
        );

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query_vector, limit as u64)
                    .with_payload(true),
            )
            .await?;

        let hits = response
            .result
            .into_iter()
            .map(|p| {
                let payload = DocPayload::from_qdrant_payload(p.payload);
                let source_id = if payload.source_id.is_empty() {
                    point_id_to_string(p.id)
                } else {
                    payload.source_id.clone()
                };
                SearchHit {
                    source_id,
                    payload,
                    score: p.score,
                }
            })
            .collect();

        Ok(hits)
    }

    /// Scroll points whose content matches any of the given keywords
    /// (disjunctive full-text match).
    pub async fn scroll_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<DocPayload>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let filter = Filter {
            should: keywords
                .iter()
                .map(|kw| text_condition("content", kw))
                .collect(),
            must: vec![],
            must_not: vec![],
            min_should: None,
        };

        self.scroll_filtered(filter, limit).await
    }

    /// Scroll points whose content matches the exact phrase
    /// (conjunctive full-text match).
    pub async fn scroll_phrase(&self, phrase: &str, limit: usize) -> Result<Vec<DocPayload>> {
        let filter = Filter {
            must: vec![text_condition("content", phrase)],
            should: vec![],
            must_not: vec![],
            min_should: None,
        };

        self.scroll_filtered(filter, limit).await
    }

    async fn scroll_filtered(&self, filter: Filter, limit: usize) -> Result<Vec<DocPayload>> {
        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(&self.collection)
                    .filter(filter)
                    .limit(limit as u32)
                    .with_payload(true)
                    .with_vectors(false),
            )
            .await?;

        let payloads = response
            .result
            .into_iter()
            .map(|p| {
                let mut payload = DocPayload::from_qdrant_payload(p.payload);
                if payload.source_id.is_empty() {
                    payload.source_id = point_id_to_string(p.id);
                }
                payload
            })
            .collect();

        Ok(payloads)
    }
}

/// Build a full-text match condition on a payload field
fn text_condition(field: &str, text: &str) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: field.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Text(text.to_string())),
            }),
            ..Default::default()
        })),
    }
}

/// Convert PointId to string
fn point_id_to_string(id: Option<PointId>) -> String {
    match id {
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid)),
        }) => uuid,
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(num)),
        }) => num.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_condition_shape() {
        let condition = text_condition("content", "tracking cookies");
        let Some(ConditionOneOf::Field(field)) = condition.condition_one_of else {
            panic!("expected a field condition");
        };

        assert_eq!(field.key, "content");
        assert!(matches!(
            field.r#match.and_then(|m| m.match_value),
            Some(MatchValue::Text(t)) if t == "tracking cookies"
        ));
    }

    #[test]
    fn test_point_id_to_string() {
        let uuid_id = PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(
                "abc-123".to_string(),
            )),
        };
        assert_eq!(point_id_to_string(Some(uuid_id)), "abc-123");

        let num_id = PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(7)),
        };
        assert_eq!(point_id_to_string(Some(num_id)), "7");
        assert_eq!(point_id_to_string(None), "");
    }
}

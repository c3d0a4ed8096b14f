//! Payload schema for Qdrant points

use qdrant_client::qdrant::{PointStruct, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A point ready to be upserted to Qdrant
#[derive(Debug, Clone)]
pub struct DocPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: DocPayload,
}

impl DocPoint {
    /// Convert to qdrant-client PointStruct
    pub fn to_point_struct(self) -> PointStruct {
        let payload_map = self.payload.to_qdrant_payload();
        PointStruct::new(self.id.to_string(), self.vector, payload_map)
    }
}

/// Payload stored with each chunk in Qdrant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocPayload {
    /// Chunk id (the resume/dedup key, e.g. "apple_chunk2")
    pub source_id: String,

    /// Human-readable source name (e.g. "Apple Terms of Service")
    pub source: String,

    /// Chunk text, full-text indexed for lexical filtering
    pub content: String,
}

impl DocPayload {
    pub fn new(source_id: String, source: String, content: String) -> Self {
        Self {
            source_id,
            source,
            content,
        }
    }

    /// Convert to Qdrant payload format
    pub fn to_qdrant_payload(self) -> HashMap<String, QdrantValue> {
        let mut map = HashMap::new();
        map.insert("source_id".to_string(), string_to_qdrant(&self.source_id));
        map.insert("source".to_string(), string_to_qdrant(&self.source));
        map.insert("content".to_string(), string_to_qdrant(&self.content));
        map
    }

    /// Rebuild a payload from the map Qdrant returns with a point.
    pub fn from_qdrant_payload(map: HashMap<String, QdrantValue>) -> Self {
        let mut payload = DocPayload::default();
        for (key, value) in map {
            let Some(s) = qdrant_string(value) else {
                continue;
            };
            match key.as_str() {
                "source_id" => payload.source_id = s,
                "source" => payload.source = s,
                "content" => payload.content = s,
                _ => {}
            }
        }
        payload
    }
}

fn string_to_qdrant(s: &str) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::StringValue(s.to_string())),
    }
}

fn qdrant_string(v: QdrantValue) -> Option<String> {
    match v.kind {
        Some(qdrant_client::qdrant::value::Kind::StringValue(s)) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip_through_qdrant_map() {
        let payload = DocPayload::new(
            "apple_chunk2".to_string(),
            "Apple ToS".to_string(),
            "tracking cookies".to_string(),
        );

        let map = payload.clone().to_qdrant_payload();
        let rebuilt = DocPayload::from_qdrant_payload(map);

        assert_eq!(rebuilt.source_id, "apple_chunk2");
        assert_eq!(rebuilt.source, "Apple ToS");
        assert_eq!(rebuilt.content, "tracking cookies");
    }
}

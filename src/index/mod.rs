//! Idempotent index population
//!
//! Maps embedded chunks to Qdrant points with deterministic ids so that
//! loading the same chunk twice overwrites the existing point instead of
//! duplicating it. Points are buffered into fixed-size batches to bound
//! request overhead.

use crate::error::Result;
use crate::models::EmbeddedChunk;
use crate::store::{DocPayload, DocPoint, QdrantStore};
use tracing::info;
use uuid::Uuid;

/// Derive the index point id for a chunk id. UUIDv5 over a fixed
/// namespace: same chunk id, same point id, every run.
pub fn point_id_for(chunk_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, chunk_id.as_bytes())
}

/// Batched, idempotent loader of embedded chunks into the vector index.
pub struct IndexLoader<'a> {
    store: &'a QdrantStore,
    batch_size: usize,
}

impl<'a> IndexLoader<'a> {
    pub fn new(store: &'a QdrantStore, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Upsert all chunks, flushing a batch every `batch_size` points and
    /// the remainder at end of input. Returns the number of points
    /// upserted.
    pub async fn load(&self, chunks: impl IntoIterator<Item = EmbeddedChunk>) -> Result<usize> {
        let mut batch: Vec<DocPoint> = Vec::with_capacity(self.batch_size);
        let mut count = 0;

        for chunk in chunks {
            batch.push(DocPoint {
                id: point_id_for(&chunk.id),
                vector: chunk.embedding,
                payload: DocPayload::new(chunk.id, chunk.source, chunk.content),
            });

            if batch.len() >= self.batch_size {
                count += batch.len();
                self.store.upsert_points(std::mem::take(&mut batch)).await?;
            }
        }

        if !batch.is_empty() {
            count += batch.len();
            self.store.upsert_points(batch).await?;
        }

        info!("Upserted {} points", count);
        Ok(count)
    }
}

//! Load and reset command implementations

use crate::config::default_upsert_batch_size;
use crate::error::Result;
use crate::index::IndexLoader;
use crate::pipeline::EmbeddingStore;
use crate::store::QdrantStore;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Statistics from an index load
#[derive(Debug, Clone, Serialize)]
pub struct LoadStats {
    pub points_upserted: usize,
    pub corrupt_records: usize,
}

/// Incrementally upsert embedded chunks into the collection. Creates the
/// collection if it does not exist yet, but never drops existing points;
/// re-loading the same ids overwrites them in place.
pub async fn cmd_load(store: &QdrantStore, embedded_path: &Path) -> Result<LoadStats> {
    store.ensure_collection().await?;

    let embedding_store = EmbeddingStore::new(embedded_path);
    let (records, corrupt_records) = embedding_store.read_all()?;
    if corrupt_records > 0 {
        warn!("Skipped {} corrupt records in {}", corrupt_records, embedded_path.display());
    }

    info!("Loading {} embedded chunks into the index", records.len());

    let loader = IndexLoader::new(store, default_upsert_batch_size());
    let points_upserted = loader.load(records).await?;

    Ok(LoadStats {
        points_upserted,
        corrupt_records,
    })
}

/// Destructively drop and recreate the collection. Kept separate from
/// `cmd_load` so an incremental load can never wipe the index.
pub async fn cmd_reset(store: &QdrantStore) -> Result<()> {
    store.reset_collection().await
}

/// Print load statistics to console
pub fn print_load_stats(stats: &LoadStats) {
    println!("\n✓ Index load complete");
    println!("  Points upserted: {}", stats.points_upserted);
    if stats.corrupt_records > 0 {
        println!("  Corrupt records skipped: {}", stats.corrupt_records);
    }
}

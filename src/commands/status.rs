//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::EmbeddingStore;
use crate::store::QdrantStore;
use serde::Serialize;

/// System status for CLI display
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub qdrant_url: String,
    pub collection_name: String,
    pub collection_points: Option<u64>,
    pub collection_status: Option<String>,
    pub chunks_on_disk: Option<usize>,
    pub embedded_on_disk: Option<usize>,
    pub corrupt_records: usize,
}

/// Collect collection info and on-disk corpus counts.
pub async fn cmd_status(config: &Config, store: &QdrantStore) -> Result<StatusReport> {
    let info = store.get_collection_info().await?;

    let chunks_on_disk = if config.paths.chunks_file.exists() {
        let content = std::fs::read_to_string(&config.paths.chunks_file)?;
        Some(content.lines().filter(|l| !l.trim().is_empty()).count())
    } else {
        None
    };

    let embedding_store = EmbeddingStore::new(&config.paths.embedded_file);
    let (embedded_on_disk, corrupt_records) = if config.paths.embedded_file.exists() {
        let (records, corrupt) = embedding_store.read_all()?;
        (Some(records.len()), corrupt)
    } else {
        (None, 0)
    };

    Ok(StatusReport {
        qdrant_url: config.qdrant_url.clone(),
        collection_name: config.collection_name.clone(),
        collection_points: info.as_ref().map(|i| i.points_count),
        collection_status: info.map(|i| i.status),
        chunks_on_disk,
        embedded_on_disk,
        corrupt_records,
    })
}

/// Print the status report to console
pub fn print_status(status: &StatusReport) {
    println!("\ncurator status");
    println!("  Qdrant: {}", status.qdrant_url);
    println!("  Collection: {}", status.collection_name);

    match status.collection_points {
        Some(points) => {
            println!("  Points: {}", points);
            if let Some(ref s) = status.collection_status {
                println!("  Collection status: {}", s);
            }
        }
        None => println!("  Collection: not created yet (run 'curator load')"),
    }

    match status.chunks_on_disk {
        Some(n) => println!("  Chunks on disk: {}", n),
        None => println!("  Chunks on disk: none (run 'curator chunk')"),
    }

    match status.embedded_on_disk {
        Some(n) => println!("  Embedded chunks on disk: {}", n),
        None => println!("  Embedded chunks on disk: none (run 'curator embed')"),
    }

    if status.corrupt_records > 0 {
        println!("  Corrupt embedded records: {}", status.corrupt_records);
    }
}

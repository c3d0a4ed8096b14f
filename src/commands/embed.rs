//! Embed command implementation

use crate::config::Config;
use crate::embed::Embedder;
use crate::error::Result;
use crate::models::{read_jsonl, Chunk};
use crate::pipeline::{EmbeddingStore, FillStats, IngestPipeline, IngestStats};
use crate::retry::RetryPolicy;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Combined report of the batched pass and the reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedReport {
    pub run: IngestStats,
    pub fill: FillStats,
}

/// Drive all chunks through the embedding provider: one resumable batched
/// pass, then a fill-missing reconciliation pass for anything a skipped
/// batch left behind.
pub async fn cmd_embed(
    config: &Config,
    embedder: &dyn Embedder,
    chunks_path: &Path,
    output_path: &Path,
) -> Result<EmbedReport> {
    let chunks: Vec<Chunk> = read_jsonl(chunks_path)?;
    info!(
        "Embedding {} chunks with model {}",
        chunks.len(),
        embedder.model_name()
    );

    let store = EmbeddingStore::new(output_path);
    let retry = RetryPolicy::new(config.embedding.retry_limit, config.embedding.backoff_base);
    let pipeline = IngestPipeline::new(embedder, &store, config.embedding.batch_size, retry)?;

    let run = pipeline.run(&chunks).await?;
    let fill = pipeline.fill_missing(&chunks).await?;

    Ok(EmbedReport { run, fill })
}

/// Print embedding statistics to console
pub fn print_embed_report(report: &EmbedReport) {
    println!("\n✓ Embedding complete");
    println!("  Chunks total: {}", report.run.total_chunks);
    println!("  Already embedded: {}", report.run.already_embedded);
    println!("  Newly embedded: {}", report.run.embedded);
    println!("  Batches skipped: {}", report.run.skipped_batches);
    if report.run.empty_chunks > 0 {
        println!("  Empty chunks skipped: {}", report.run.empty_chunks);
    }
    if report.run.corrupt_records > 0 {
        println!("  Corrupt store records skipped: {}", report.run.corrupt_records);
    }
    if report.fill.missing > 0 {
        println!(
            "  Reconciliation: {} missing, {} recovered, {} failed",
            report.fill.missing, report.fill.recovered, report.fill.failed
        );
    }
}

//! Resumable batch embedding pipeline
//!
//! Drives chunks through the embedding provider in small batches, writing
//! each successful batch to an append-only JSONL store before the next
//! batch starts. The store is the resume log: a re-run reads the ids
//! already present and only embeds the rest, so crashes, skipped batches,
//! and repeated invocations never duplicate or silently lose a chunk.
//!
//! The store is single-writer per process; running two pipelines against
//! the same file concurrently requires external coordination.

use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::models::{Chunk, EmbeddedChunk};
use crate::retry::RetryPolicy;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Append-only JSONL store of embedded chunks.
pub struct EmbeddingStore {
    path: PathBuf,
}

/// Result of scanning the store for already-processed chunk ids.
#[derive(Debug, Default)]
pub struct StoreScan {
    pub ids: HashSet<String>,
    pub corrupt_lines: usize,
}

impl EmbeddingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Collect the set of chunk ids already persisted. Malformed lines are
    /// skipped and counted, never fatal.
    pub fn processed_ids(&self) -> Result<StoreScan> {
        let mut scan = StoreScan::default();

        if !self.path.exists() {
            return Ok(scan);
        }

        let file = std::fs::File::open(&self.path)?;
        let reader = BufReader::new(file);

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EmbeddedChunk>(&line) {
                Ok(record) => {
                    scan.ids.insert(record.id);
                }
                Err(e) => {
                    debug!("Skipping corrupt record at line {}: {}", idx + 1, e);
                    scan.corrupt_lines += 1;
                }
            }
        }

        Ok(scan)
    }

    /// Read every valid record, counting (not failing on) corrupt lines.
    pub fn read_all(&self) -> Result<(Vec<EmbeddedChunk>, usize)> {
        let mut records = Vec::new();
        let mut corrupt = 0;

        if !self.path.exists() {
            return Ok((records, corrupt));
        }

        let file = std::fs::File::open(&self.path)?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EmbeddedChunk>(&line) {
                Ok(record) => records.push(record),
                Err(_) => corrupt += 1,
            }
        }

        Ok((records, corrupt))
    }

    /// Append records and flush them to disk as one ordered write. A batch
    /// is only considered complete once this returns.
    pub fn append(&self, records: &[EmbeddedChunk]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buffer.as_bytes())?;
        file.sync_data()?;

        Ok(())
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Default, Clone, Serialize)]
pub struct IngestStats {
    pub total_chunks: usize,
    pub already_embedded: usize,
    pub embedded: usize,
    pub skipped_batches: usize,
    pub empty_chunks: usize,
    pub corrupt_records: usize,
}

/// Statistics from the fill-missing reconciliation pass
#[derive(Debug, Default, Clone, Serialize)]
pub struct FillStats {
    pub missing: usize,
    pub recovered: usize,
    pub failed: usize,
}

/// Resumable batch embedding pipeline.
pub struct IngestPipeline<'a> {
    embedder: &'a dyn Embedder,
    store: &'a EmbeddingStore,
    batch_size: usize,
    retry: RetryPolicy,
}

impl<'a> IngestPipeline<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        store: &'a EmbeddingStore,
        batch_size: usize,
        retry: RetryPolicy,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        Ok(Self {
            embedder,
            store,
            batch_size,
            retry,
        })
    }

    /// Embed every chunk not already in the store, one provider call per
    /// batch. A batch that exhausts its retries is skipped for this run;
    /// its chunks stay unprocessed and are picked up by the next run or by
    /// `fill_missing`.
    pub async fn run(&self, chunks: &[Chunk]) -> Result<IngestStats> {
        let scan = self.store.processed_ids()?;

        let mut stats = IngestStats {
            total_chunks: chunks.len(),
            corrupt_records: scan.corrupt_lines,
            ..IngestStats::default()
        };

        let mut pending: Vec<&Chunk> = Vec::new();
        for chunk in chunks {
            if scan.ids.contains(&chunk.id) {
                stats.already_embedded += 1;
            } else if chunk.content.trim().is_empty() {
                warn!("Chunk {} has no content, skipping", chunk.id);
                stats.empty_chunks += 1;
            } else {
                pending.push(chunk);
            }
        }

        info!(
            "{} chunks total, {} already embedded, {} to embed",
            stats.total_chunks,
            stats.already_embedded,
            pending.len()
        );

        if pending.is_empty() {
            return Ok(stats);
        }

        let bar = ProgressBar::new(pending.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for batch in pending.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();

            let result = self
                .retry
                .run(|| self.embedder.embed(texts.clone()))
                .await;

            match result {
                Ok(vectors) if vectors.len() == batch.len() => {
                    let records: Vec<EmbeddedChunk> = batch
                        .iter()
                        .zip(vectors)
                        .map(|(chunk, embedding)| EmbeddedChunk {
                            id: chunk.id.clone(),
                            source: chunk.source.clone(),
                            content: chunk.content.clone(),
                            embedding,
                        })
                        .collect();

                    self.store.append(&records)?;
                    stats.embedded += records.len();
                }
                Ok(vectors) => {
                    warn!(
                        "Provider returned {} vectors for a batch of {}, skipping batch",
                        vectors.len(),
                        batch.len()
                    );
                    stats.skipped_batches += 1;
                }
                Err(e) => {
                    warn!("Skipping batch of {} chunks after failure: {}", batch.len(), e);
                    stats.skipped_batches += 1;
                }
            }

            bar.inc(batch.len() as u64);
        }

        bar.finish_and_clear();
        Ok(stats)
    }

    /// Reconciliation pass: re-embed any chunk still absent from the
    /// store, one at a time. Slower than batching but recovers partially
    /// failed batches without touching what already succeeded.
    pub async fn fill_missing(&self, chunks: &[Chunk]) -> Result<FillStats> {
        let scan = self.store.processed_ids()?;

        let missing: Vec<&Chunk> = chunks
            .iter()
            .filter(|c| !scan.ids.contains(&c.id) && !c.content.trim().is_empty())
            .collect();

        let mut stats = FillStats {
            missing: missing.len(),
            ..FillStats::default()
        };

        if missing.is_empty() {
            info!("No missing embeddings, nothing to reconcile");
            return Ok(stats);
        }

        info!("Reconciling {} missing embeddings", missing.len());

        for chunk in missing {
            let text = chunk.content.clone();
            let result = self
                .retry
                .run(|| self.embedder.embed(vec![text.clone()]))
                .await;

            match result {
                Ok(vectors) if vectors.len() == 1 => {
                    let record = EmbeddedChunk {
                        id: chunk.id.clone(),
                        source: chunk.source.clone(),
                        content: chunk.content.clone(),
                        embedding: vectors.into_iter().next().unwrap_or_default(),
                    };
                    self.store.append(std::slice::from_ref(&record))?;
                    stats.recovered += 1;
                }
                Ok(_) => {
                    warn!("Provider returned wrong vector count for {}", chunk.id);
                    stats.failed += 1;
                }
                Err(e) => {
                    warn!("Failed to embed {}: {}", chunk.id, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}

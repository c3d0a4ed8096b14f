//! Core record types shared across the ingestion and retrieval pipeline
//!
//! Documents, chunks, and embedded chunks are persisted as line-delimited
//! JSON; the readers and writers here keep that format in one place.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A source document as produced by extraction (out of scope here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source: String,
    pub content: String,
}

/// A bounded text window derived from a document.
///
/// Ids are `<doc_id>_chunk<N>` (N starting at 1) when the document was
/// split, or the original document id when it fit within the word budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub source: String,
    pub content: String,
}

/// A chunk plus its embedding vector. Keyed by chunk id; this id is the
/// resume/dedup key for the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub id: String,
    pub source: String,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// A labeled evaluation query naming the expected source_id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalQuery {
    pub query: String,
    pub answer_id: String,
}

/// Read a whole JSONL file strictly; any malformed line is an error.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| Error::CorruptRecord {
            line: idx + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Write records as JSONL, replacing any existing file.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

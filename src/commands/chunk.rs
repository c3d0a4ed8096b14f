//! Chunk command implementation

use crate::chunk::chunk_document;
use crate::config::Config;
use crate::error::Result;
use crate::models::{read_jsonl, write_jsonl, Chunk, Document};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Statistics from a chunking run
#[derive(Debug, Default, Clone, Serialize)]
pub struct ChunkStats {
    pub documents: usize,
    pub split_documents: usize,
    pub chunks: usize,
}

/// Split a documents JSONL file into a chunks JSONL file.
pub fn cmd_chunk(config: &Config, input: &Path, output: &Path) -> Result<ChunkStats> {
    info!("Chunking {} into {}", input.display(), output.display());

    let documents: Vec<Document> = read_jsonl(input)?;
    let mut stats = ChunkStats {
        documents: documents.len(),
        ..ChunkStats::default()
    };

    let mut chunks: Vec<Chunk> = Vec::with_capacity(documents.len());
    for doc in &documents {
        let doc_chunks = chunk_document(doc, &config.chunk)?;
        if doc_chunks.len() > 1 {
            stats.split_documents += 1;
        }
        chunks.extend(doc_chunks);
    }

    stats.chunks = chunks.len();
    write_jsonl(output, &chunks)?;

    info!(
        "Wrote {} chunks from {} documents ({} split)",
        stats.chunks, stats.documents, stats.split_documents
    );
    Ok(stats)
}

/// Print chunking statistics to console
pub fn print_chunk_stats(stats: &ChunkStats) {
    println!("\n✓ Chunking complete");
    println!("  Documents read: {}", stats.documents);
    println!("  Documents split: {}", stats.split_documents);
    println!("  Chunks written: {}", stats.chunks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cmd_chunk_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("docs.jsonl");
        let output = tmp.path().join("chunks.jsonl");

        let long_content = (0..30).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let docs = vec![
            Document {
                id: "short".to_string(),
                source: "Short ToS".to_string(),
                content: "brief terms".to_string(),
            },
            Document {
                id: "long".to_string(),
                source: "Long ToS".to_string(),
                content: long_content,
            },
        ];
        write_jsonl(&input, &docs).unwrap();

        let mut config = Config::default();
        config.chunk.max_words = 10;
        config.chunk.overlap_words = 2;

        let stats = cmd_chunk(&config, &input, &output).unwrap();

        assert_eq!(stats.documents, 2);
        assert_eq!(stats.split_documents, 1);

        let chunks: Vec<Chunk> = read_jsonl(&output).unwrap();
        assert_eq!(chunks.len(), stats.chunks);
        assert_eq!(chunks[0].id, "short");
        assert_eq!(chunks[1].id, "long_chunk1");
    }
}

//! Word-window text chunking
//!
//! Documents are split on whitespace into overlapping windows of a fixed
//! word budget so each chunk fits one embedding request. Splitting is
//! deterministic: the same document always yields the same chunk ids and
//! contents, which is what makes re-ingestion idempotent downstream.

use crate::config::ChunkConfig;
use crate::error::{Error, Result};
use crate::models::{Chunk, Document};

/// Split text into overlapping windows of `max_words` words, advancing by
/// `max_words - overlap_words` each step. The final window may be shorter.
pub fn chunk_text(content: &str, max_words: usize, overlap_words: usize) -> Result<Vec<String>> {
    if overlap_words >= max_words {
        return Err(Error::Config(format!(
            "overlap_words ({}) must be < max_words ({})",
            overlap_words, max_words
        )));
    }

    let words: Vec<&str> = content.split_whitespace().collect();
    let stride = max_words - overlap_words;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = usize::min(start + max_words, words.len());
        chunks.push(words[start..end].join(" "));
        start += stride;
    }

    Ok(chunks)
}

/// Chunk a document, preserving its id when it fits the word budget.
///
/// Split documents get ids `<doc_id>_chunk<N>` with N starting at 1, in
/// document order.
pub fn chunk_document(doc: &Document, config: &ChunkConfig) -> Result<Vec<Chunk>> {
    let word_count = doc.content.split_whitespace().count();

    if word_count <= config.max_words {
        return Ok(vec![Chunk {
            id: doc.id.clone(),
            source: doc.source.clone(),
            content: doc.content.clone(),
        }]);
    }

    let pieces = chunk_text(&doc.content, config.max_words, config.overlap_words)?;
    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(i, content)| Chunk {
            id: format!("{}_chunk{}", doc.id, i + 1),
            source: doc.source.clone(),
            content,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_doc(id: &str, content: &str) -> Document {
        Document {
            id: id.to_string(),
            source: "Test ToS".to_string(),
            content: content.to_string(),
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_short_document_passes_through() {
        let doc = make_doc("apple", &words(10));
        let config = ChunkConfig {
            max_words: 20,
            overlap_words: 5,
        };

        let chunks = chunk_document(&doc, &config).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "apple");
        assert_eq!(chunks[0].content, doc.content);
    }

    #[test]
    fn test_exact_budget_is_not_split() {
        let doc = make_doc("apple", &words(20));
        let config = ChunkConfig {
            max_words: 20,
            overlap_words: 5,
        };

        let chunks = chunk_document(&doc, &config).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "apple");
    }

    #[test]
    fn test_long_document_chunk_ids() {
        let doc = make_doc("apple", &words(45));
        let config = ChunkConfig {
            max_words: 20,
            overlap_words: 5,
        };

        let chunks = chunk_document(&doc, &config).unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].id, "apple_chunk1");
        assert_eq!(chunks[1].id, "apple_chunk2");
        for chunk in &chunks {
            assert!(chunk.content.split_whitespace().count() <= 20);
        }
    }

    #[test]
    fn test_overlap_reconstructs_original() {
        let original = words(107);
        let max_words = 25;
        let overlap = 7;

        let chunks = chunk_text(&original, max_words, overlap).unwrap();

        // Dropping the first `overlap` words of every chunk after the first
        // reconstructs the original word sequence.
        let mut rebuilt: Vec<&str> = chunks[0].split_whitespace().collect();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.split_whitespace().skip(overlap));
        }

        let original_words: Vec<&str> = original.split_whitespace().collect();
        assert_eq!(rebuilt, original_words);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_window() {
        assert!(matches!(
            chunk_text("a b c", 10, 10),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            chunk_text("a b c", 10, 15),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_final_window_may_be_short() {
        let chunks = chunk_text(&words(23), 10, 2).unwrap();
        let last = chunks.last().unwrap();
        assert!(last.split_whitespace().count() < 10);
    }
}

//! Hybrid retrieval with weighted Reciprocal Rank Fusion
//!
//! Vector search captures paraphrase but misses exact terminology; the
//! lexical leg catches names and clause numbers but ignores semantics.
//! RRF fuses the two ranked lists using only relative order, so the raw
//! scores of the two sources never need to be calibrated against each
//! other: an item at 1-based rank `r` contributes `1 / (k_const + r)`.

use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::store::{DocPayload, QdrantStore, SearchHit};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// RRF constant for the vector ranking.
pub const VECTOR_RRF_K: f32 = 60.0;

/// RRF constant for the lexical ranking. Smaller than the vector constant
/// so more score mass concentrates near the top of the noisier lexical
/// list.
pub const LEXICAL_RRF_K: f32 = 30.0;

/// Weight of the vector component in the combined score.
pub const VECTOR_WEIGHT: f32 = 0.7;

/// Weight of the lexical component in the combined score.
pub const LEXICAL_WEIGHT: f32 = 0.3;

/// Multiplier applied to exact-phrase lexical matches.
pub const PHRASE_BOOST: f32 = 1.5;

/// Vector search over-fetch factor (request `3k` candidates for fusion).
pub const VECTOR_CANDIDATE_FACTOR: usize = 3;

/// Keyword scroll over-fetch factor (request `2k` candidates).
pub const KEYWORD_CANDIDATE_FACTOR: usize = 2;

/// Keywords shorter than this many characters are discarded.
const MIN_KEYWORD_CHARS: usize = 3;

/// How a lexical candidate matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalMatch {
    Phrase,
    Keyword,
}

/// A candidate from the lexical leg, tagged with its match type.
#[derive(Debug, Clone)]
pub struct LexicalCandidate {
    pub payload: DocPayload,
    pub matched: LexicalMatch,
}

/// A search hit merged across both ranking sources.
#[derive(Debug, Clone, Serialize)]
pub struct FusedResult {
    pub source_id: String,
    pub combined_score: f32,
    pub payload: DocPayload,
}

/// Derive lexical keywords: lowercase, whitespace-split, drop tokens of
/// length <= 2.
pub fn query_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .map(|token| token.to_string())
        .collect()
}

/// RRF score for a 1-based rank.
fn rrf_score(rank: usize, k_const: f32) -> f32 {
    1.0 / (k_const + rank as f32)
}

/// Merge phrase and keyword scroll results into one ordered lexical
/// candidate list keyed by source_id. Phrase matches come first and take
/// priority when the same id appears in both.
pub fn merge_lexical(
    phrase_hits: Vec<DocPayload>,
    keyword_hits: Vec<DocPayload>,
) -> Vec<LexicalCandidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for payload in phrase_hits {
        if seen.insert(payload.source_id.clone()) {
            candidates.push(LexicalCandidate {
                payload,
                matched: LexicalMatch::Phrase,
            });
        }
    }

    for payload in keyword_hits {
        if seen.insert(payload.source_id.clone()) {
            candidates.push(LexicalCandidate {
                payload,
                matched: LexicalMatch::Keyword,
            });
        }
    }

    candidates
}

/// Fuse the two candidate lists into a single ranking, truncated to `k`.
///
/// Pure function: `combined = 0.7 * vector_rrf + 0.3 * lexical_rrf`, with
/// a 1.5x boost on phrase-tagged lexical scores and 0 for a source absent
/// from a list. Sorting is stable, so ties keep arrival order (vector
/// candidates are enumerated first). When an id exists in the vector set
/// its payload wins; otherwise the lexical payload is used.
pub fn fuse(
    vector_hits: &[SearchHit],
    lexical_candidates: &[LexicalCandidate],
    k: usize,
) -> Vec<FusedResult> {
    let mut vector_scores: HashMap<&str, f32> = HashMap::new();
    let mut vector_payloads: HashMap<&str, &DocPayload> = HashMap::new();
    for (i, hit) in vector_hits.iter().enumerate() {
        vector_scores
            .entry(hit.source_id.as_str())
            .or_insert_with(|| rrf_score(i + 1, VECTOR_RRF_K));
        vector_payloads.entry(hit.source_id.as_str()).or_insert(&hit.payload);
    }

    let mut lexical_scores: HashMap<&str, f32> = HashMap::new();
    let mut lexical_payloads: HashMap<&str, &DocPayload> = HashMap::new();
    for (i, candidate) in lexical_candidates.iter().enumerate() {
        let mut score = rrf_score(i + 1, LEXICAL_RRF_K);
        if candidate.matched == LexicalMatch::Phrase {
            score *= PHRASE_BOOST;
        }
        lexical_scores
            .entry(candidate.payload.source_id.as_str())
            .or_insert(score);
        lexical_payloads
            .entry(candidate.payload.source_id.as_str())
            .or_insert(&candidate.payload);
    }

    // Union of candidate ids in arrival order: vector list first.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ordered_ids: Vec<&str> = Vec::new();
    for hit in vector_hits {
        if seen.insert(hit.source_id.as_str()) {
            ordered_ids.push(hit.source_id.as_str());
        }
    }
    for candidate in lexical_candidates {
        if seen.insert(candidate.payload.source_id.as_str()) {
            ordered_ids.push(candidate.payload.source_id.as_str());
        }
    }

    let mut fused: Vec<FusedResult> = ordered_ids
        .into_iter()
        .map(|id| {
            let vector_component = vector_scores.get(id).copied().unwrap_or(0.0);
            let lexical_component = lexical_scores.get(id).copied().unwrap_or(0.0);
            let payload = vector_payloads
                .get(id)
                .or_else(|| lexical_payloads.get(id))
                .map(|p| (*p).clone())
                .unwrap_or_default();

            FusedResult {
                source_id: id.to_string(),
                combined_score: VECTOR_WEIGHT * vector_component
                    + LEXICAL_WEIGHT * lexical_component,
                payload,
            }
        })
        .collect();

    fused.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused.truncate(k);
    fused
}

/// Hybrid retrieval engine: vector similarity + lexical full-text
/// filtering, fused with weighted RRF.
pub struct HybridEngine<'a> {
    embedder: &'a dyn Embedder,
    store: &'a QdrantStore,
}

impl<'a> HybridEngine<'a> {
    pub fn new(embedder: &'a dyn Embedder, store: &'a QdrantStore) -> Self {
        Self { embedder, store }
    }

    /// Return the top-k fused results for a free-text query.
    ///
    /// A query-embedding or index failure aborts the whole search with a
    /// `Retrieval` error; there is no lexical-only fallback, so behavior
    /// stays deterministic for evaluation.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<FusedResult>> {
        let query_vector = self.embed_query(query).await?;

        let keywords = query_keywords(query);
        let phrase = query.to_lowercase();

        let vector_fut = self.store.search(query_vector, k * VECTOR_CANDIDATE_FACTOR);
        let keyword_fut = self
            .store
            .scroll_keywords(&keywords, k * KEYWORD_CANDIDATE_FACTOR);
        let phrase_fut = self.store.scroll_phrase(&phrase, k);

        let (vector_hits, keyword_hits, phrase_hits) =
            futures::try_join!(vector_fut, keyword_fut, phrase_fut)
                .map_err(|e| Error::Retrieval(e.to_string()))?;

        let lexical = merge_lexical(phrase_hits, keyword_hits);
        Ok(fuse(&vector_hits, &lexical, k))
    }

    /// Plain vector search, used as the evaluation baseline.
    pub async fn vector_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query_vector = self.embed_query(query).await?;
        self.store
            .search(query_vector, k)
            .await
            .map_err(|e| Error::Retrieval(e.to_string()))
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self
            .embedder
            .embed(vec![query.to_string()])
            .await
            .map_err(|e| Error::Retrieval(format!("query embedding failed: {}", e)))?;

        if vectors.len() != 1 {
            return Err(Error::Retrieval(
                "provider returned no embedding for query".to_string(),
            ));
        }

        Ok(vectors.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: &str) -> DocPayload {
        DocPayload::new(id.to_string(), format!("{} ToS", id), format!("{} content", id))
    }

    fn vector_hit(id: &str, score: f32) -> SearchHit {
        SearchHit {
            source_id: id.to_string(),
            payload: payload(id),
            score,
        }
    }

    #[test]
    fn test_query_keywords_drop_short_tokens() {
        let keywords = query_keywords("Does Apple allow me to opt out?");
        assert_eq!(
            keywords,
            vec!["does", "apple", "allow", "opt", "out?"]
        );
    }

    #[test]
    fn test_query_keywords_can_be_empty() {
        assert!(query_keywords("is it ok").iter().all(|k| k.len() > 2));
        assert!(query_keywords("a an it").is_empty());
    }

    #[test]
    fn test_merge_lexical_phrase_priority() {
        let merged = merge_lexical(
            vec![payload("A")],
            vec![payload("A"), payload("B")],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].payload.source_id, "A");
        assert_eq!(merged[0].matched, LexicalMatch::Phrase);
        assert_eq!(merged[1].payload.source_id, "B");
        assert_eq!(merged[1].matched, LexicalMatch::Keyword);
    }

    #[test]
    fn test_fusion_ranks_dual_source_phrase_match_first() {
        // "does apple allow tracking cookies": A in both lists with a
        // phrase match must win.
        let vector = vec![
            vector_hit("A", 0.91),
            vector_hit("B", 0.88),
            vector_hit("C", 0.70),
        ];
        let lexical = merge_lexical(vec![payload("A")], vec![payload("B"), payload("D")]);

        let fused = fuse(&vector, &lexical, 5);

        assert_eq!(fused.len(), 4);
        assert_eq!(fused[0].source_id, "A");
        // B is second: decent vector rank plus a keyword match.
        assert_eq!(fused[1].source_id, "B");
    }

    #[test]
    fn test_absent_source_contributes_zero() {
        let vector = vec![vector_hit("A", 0.9)];
        let lexical = merge_lexical(Vec::new(), vec![payload("B")]);

        let fused = fuse(&vector, &lexical, 5);

        let a = fused.iter().find(|r| r.source_id == "A").unwrap();
        let b = fused.iter().find(|r| r.source_id == "B").unwrap();

        let expected_a = VECTOR_WEIGHT * (1.0 / (VECTOR_RRF_K + 1.0));
        let expected_b = LEXICAL_WEIGHT * (1.0 / (LEXICAL_RRF_K + 1.0));
        assert!((a.combined_score - expected_a).abs() < 1e-6);
        assert!((b.combined_score - expected_b).abs() < 1e-6);
    }

    #[test]
    fn test_phrase_boost_applied() {
        let phrase_fused = fuse(&[], &merge_lexical(vec![payload("A")], Vec::new()), 5);
        let keyword_fused = fuse(&[], &merge_lexical(Vec::new(), vec![payload("A")]), 5);

        let base = LEXICAL_WEIGHT * (1.0 / (LEXICAL_RRF_K + 1.0));
        assert!((keyword_fused[0].combined_score - base).abs() < 1e-6);
        assert!((phrase_fused[0].combined_score - base * PHRASE_BOOST).abs() < 1e-6);
    }

    #[test]
    fn test_improving_vector_rank_never_lowers_score() {
        let lexical = merge_lexical(Vec::new(), vec![payload("X"), payload("T")]);

        // T at vector rank 3.
        let worse = fuse(
            &[vector_hit("A", 0.9), vector_hit("B", 0.8), vector_hit("T", 0.7)],
            &lexical,
            10,
        );
        // T at vector rank 1, lexical list unchanged.
        let better = fuse(
            &[vector_hit("T", 0.9), vector_hit("A", 0.8), vector_hit("B", 0.7)],
            &lexical,
            10,
        );

        let worse_t = worse.iter().find(|r| r.source_id == "T").unwrap();
        let better_t = better.iter().find(|r| r.source_id == "T").unwrap();
        assert!(better_t.combined_score >= worse_t.combined_score);
    }

    #[test]
    fn test_payload_prefers_vector_source() {
        let mut vector_payload = payload("A");
        vector_payload.content = "vector side".to_string();
        let mut lexical_payload = payload("A");
        lexical_payload.content = "lexical side".to_string();

        let vector = vec![SearchHit {
            source_id: "A".to_string(),
            payload: vector_payload,
            score: 0.9,
        }];
        let lexical = merge_lexical(vec![lexical_payload], Vec::new());

        let fused = fuse(&vector, &lexical, 5);
        assert_eq!(fused[0].payload.content, "vector side");
    }

    #[test]
    fn test_fusion_truncates_to_k() {
        let vector: Vec<SearchHit> = (0..10)
            .map(|i| vector_hit(&format!("V{}", i), 1.0 - i as f32 * 0.05))
            .collect();

        let fused = fuse(&vector, &[], 3);
        assert_eq!(fused.len(), 3);
        assert_eq!(fused[0].source_id, "V0");
    }
}

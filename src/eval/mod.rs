//! Retrieval quality evaluation
//!
//! Replays a labeled query set through plain vector search and through the
//! hybrid engine, and scores both with Hit-Rate@k so the two numbers are
//! directly comparable.

use crate::error::Result;
use crate::models::{read_jsonl, EvalQuery};
use serde::Serialize;
use std::path::Path;

/// Hit-Rate@k over already-computed result lists. A query counts as a hit
/// when its ground-truth id appears among the top-k source ids. Pure
/// function, no network.
pub fn hit_rate(results: &[Vec<String>], ground_truths: &[String], k: usize) -> f32 {
    if ground_truths.is_empty() {
        return 0.0;
    }

    let hits = ground_truths
        .iter()
        .zip(results)
        .filter(|(truth, ids)| ids.iter().take(k).any(|id| id == *truth))
        .count();

    hits as f32 / ground_truths.len() as f32
}

/// Load the labeled query set (JSONL of `{query, answer_id}`).
pub fn load_eval_set(path: &Path) -> Result<Vec<EvalQuery>> {
    read_jsonl(path)
}

/// Comparable Hit-Rate@k numbers for the two retrieval modes.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub k: usize,
    pub queries: usize,
    pub vector_hit_rate: f32,
    pub hybrid_hit_rate: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hit_at_rank_three_counts() {
        let results = vec![ids(&["x", "y", "apple", "z", "w"])];
        let truths = ids(&["apple"]);

        assert_eq!(hit_rate(&results, &truths, 5), 1.0);
    }

    #[test]
    fn test_miss_outside_top_k() {
        let results = vec![ids(&["x", "y", "z", "w", "v", "apple"])];
        let truths = ids(&["apple"]);

        assert_eq!(hit_rate(&results, &truths, 5), 0.0);
    }

    #[test]
    fn test_partial_hits() {
        let results = vec![
            ids(&["apple", "x"]),
            ids(&["y", "z"]),
            ids(&["q", "github"]),
            ids(&["n"]),
        ];
        let truths = ids(&["apple", "missing", "github", "also-missing"]);

        assert_eq!(hit_rate(&results, &truths, 5), 0.5);
    }

    #[test]
    fn test_k_limits_consideration() {
        let results = vec![ids(&["x", "y", "apple"])];
        let truths = ids(&["apple"]);

        assert_eq!(hit_rate(&results, &truths, 2), 0.0);
        assert_eq!(hit_rate(&results, &truths, 3), 1.0);
    }

    #[test]
    fn test_empty_query_set() {
        assert_eq!(hit_rate(&[], &[], 5), 0.0);
    }
}

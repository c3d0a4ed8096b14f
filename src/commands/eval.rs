//! Eval command implementation

use crate::embed::Embedder;
use crate::error::Result;
use crate::eval::{hit_rate, load_eval_set, EvalReport};
use crate::rank::HybridEngine;
use crate::store::QdrantStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

/// Replay the labeled query set through plain vector search and the
/// hybrid engine, and report Hit-Rate@k for both.
pub async fn cmd_eval(
    embedder: &dyn Embedder,
    store: &QdrantStore,
    eval_path: &Path,
    k: usize,
) -> Result<EvalReport> {
    let queries = load_eval_set(eval_path)?;
    info!("Loaded {} evaluation queries from {}", queries.len(), eval_path.display());

    let engine = HybridEngine::new(embedder, store);

    let mut vector_results: Vec<Vec<String>> = Vec::with_capacity(queries.len());
    let mut hybrid_results: Vec<Vec<String>> = Vec::with_capacity(queries.len());
    let mut ground_truths: Vec<String> = Vec::with_capacity(queries.len());

    let bar = ProgressBar::new(queries.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} queries",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for item in &queries {
        ground_truths.push(item.answer_id.clone());

        let vector = engine.vector_search(&item.query, k).await?;
        vector_results.push(vector.into_iter().map(|h| h.source_id).collect());

        let hybrid = engine.search(&item.query, k).await?;
        hybrid_results.push(hybrid.into_iter().map(|r| r.source_id).collect());

        bar.inc(1);
    }

    bar.finish_and_clear();

    Ok(EvalReport {
        k,
        queries: queries.len(),
        vector_hit_rate: hit_rate(&vector_results, &ground_truths, k),
        hybrid_hit_rate: hit_rate(&hybrid_results, &ground_truths, k),
    })
}

/// Print the evaluation report to console
pub fn print_eval_report(report: &EvalReport) {
    println!("\n===============================");
    println!(
        "🔍 Hit Rate@{} (Vector Search): {:.3}",
        report.k, report.vector_hit_rate
    );
    println!(
        "⚡ Hit Rate@{} (Hybrid Search): {:.3}",
        report.k, report.hybrid_hit_rate
    );
    println!("===============================");
    println!("Evaluated {} queries", report.queries);
}

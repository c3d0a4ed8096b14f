//! Query command implementation

use crate::embed::Embedder;
use crate::error::Result;
use crate::rank::{FusedResult, HybridEngine};
use crate::store::QdrantStore;
use serde::Serialize;
use tracing::info;

/// Query result for CLI display
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    pub query: String,
    pub results: Vec<FusedResult>,
}

/// Execute a hybrid query and return the top-k fused payloads. These
/// `{source, content}` payloads are what a downstream answer generator
/// consumes; curator's job ends here.
pub async fn cmd_query(
    embedder: &dyn Embedder,
    store: &QdrantStore,
    query: &str,
    k: usize,
) -> Result<QueryOutput> {
    info!("Querying: {}", query);

    let engine = HybridEngine::new(embedder, store);
    let results = engine.search(query, k).await?;

    info!("Returning {} results", results.len());

    Ok(QueryOutput {
        query: query.to_string(),
        results,
    })
}

/// Print query results to console
pub fn print_query_results(output: &QueryOutput) {
    println!("\n🔍 Query: {}\n", output.query);

    if output.results.is_empty() {
        println!("No relevant documents found.");
        return;
    }

    println!("Found {} results:\n", output.results.len());

    for (i, r) in output.results.iter().enumerate() {
        println!(
            "{}. [score: {:.4}] {} ({})",
            i + 1,
            r.combined_score,
            r.payload.source,
            r.source_id
        );

        // Preview: first 200 characters, newlines flattened.
        let preview: String = r.payload.content.chars().take(200).collect();
        let suffix = if r.payload.content.chars().count() > 200 {
            "..."
        } else {
            ""
        };
        println!("   {}{}\n", preview.trim().replace('\n', " "), suffix);
    }
}

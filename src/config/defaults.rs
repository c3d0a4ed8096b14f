//! Default values for configuration

/// Default Qdrant URL for local development
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default collection name
pub fn default_collection_name() -> String {
    "curator_docs".to_string()
}

/// Default embedding endpoint (OpenAI-compatible)
pub fn default_embedding_endpoint() -> String {
    std::env::var("EMBEDDING_ENDPOINT")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Default embedding dimension for text-embedding-3-small
pub fn default_embedding_dimension() -> usize {
    1536
}

/// Default environment variable name for the embedding API key
pub fn default_embedding_api_key_env() -> String {
    "EMBEDDING_API_KEY".to_string()
}

/// Default batch size for embedding requests (small, to respect
/// provider request-size limits on long chunks)
pub fn default_embedding_batch_size() -> usize {
    5
}

/// Default retry limit for transient provider failures
pub fn default_retry_limit() -> u32 {
    3
}

/// Default exponential backoff base in seconds (delay = base^attempt)
pub fn default_backoff_base() -> f64 {
    2.0
}

/// Default request timeout in seconds
pub fn default_request_timeout() -> u64 {
    30
}

/// Default maximum words per chunk
pub fn default_chunk_max_words() -> usize {
    1000
}

/// Default overlap words between chunks
pub fn default_chunk_overlap_words() -> usize {
    100
}

/// Default number of query results
pub fn default_query_top_k() -> usize {
    5
}

/// Default batch size for index upserts
pub fn default_upsert_batch_size() -> usize {
    100
}

//! curator - hybrid retrieval (RAG) over document corpora
//!
//! This crate provides:
//! - Word-window chunking of a JSONL document corpus
//! - A resumable, idempotent batch embedding pipeline with retry/backoff
//! - Idempotent loading of embedded chunks into a Qdrant collection
//! - Hybrid retrieval fusing vector similarity and lexical full-text
//!   matching via weighted Reciprocal Rank Fusion
//! - A Hit-Rate@k evaluation harness comparing vector vs hybrid search

pub mod chunk;
pub mod commands;
pub mod config;
pub mod embed;
pub mod error;
pub mod eval;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod rank;
pub mod retry;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};

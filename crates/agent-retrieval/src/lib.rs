//! # agent-retrieval
//!
//! Similarity-search retrieval for the agent reasoning loop.
//!
//! ## Design
//!
//! - **Embedding is opaque** - the [`EmbeddingProvider`] trait turns text
//!   into fixed-length vectors; which model does it is not this crate's
//!   concern
//! - **One search interface, two paths** - a [`DocumentStore`] either has
//!   a native nearest-neighbor index or the [`Retriever`] falls back to
//!   brute-force cosine ranking over all records
//! - **Deterministic ordering** - results are sorted by descending score
//!   with ties broken by ascending id, so queries are reproducible
//! - **Retrieval as a tool** - [`tools::DocumentSearchTool`] plugs the
//!   retriever into an `agent_core` tool registry
//!
//! The brute-force path is a correctness fallback, not a performance
//! path: it retrieves every record and scores it in O(n).

pub mod embedding;
pub mod error;
pub mod ranker;
pub mod search_tool;
pub mod store;

pub use embedding::{EmbeddingProvider, StaticEmbedder};
pub use error::{Result, RetrievalError};
pub use ranker::{ScoredResult, cosine_similarity, rank};
pub use store::{DocumentRecord, DocumentStore, MemoryStore, Retriever};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::search_tool::DocumentSearchTool;
}

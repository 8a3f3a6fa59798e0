//! # RAG Embeddings
//!
//! Local model inference for hybrid passage retrieval, via fastembed-rs
//! (ONNX Runtime):
//!
//! - [`EmbeddingService`]: text to dense vectors for semantic search
//! - [`RerankerService`]: cross-encoder relevance scores for (query, passage) pairs
//!
//! Callers depend on the [`Embedder`] and [`CrossEncoder`] traits, so the
//! retrieval pipeline can run against any implementation.
//!
//! ## Example
//!
//! ```no_run
//! use rag_embeddings::{CrossEncoder, Embedder, EmbeddingService, RerankerService};
//!
//! fn main() -> Result<(), rag_embeddings::EmbeddingError> {
//!     let embedder = EmbeddingService::new()?;
//!     let vector = embedder.embed_single("deep learning basics")?;
//!     println!("{} dimensions", vector.len());
//!
//!     let reranker = RerankerService::new()?;
//!     let scores = reranker.score_pairs(
//!         "deep learning basics",
//!         &["Neural networks learn representations.", "Paris is in France."],
//!     )?;
//!     println!("{scores:?}");
//!     Ok(())
//! }
//! ```

mod error;
mod rerank;
mod service;

pub use error::EmbeddingError;
pub use rerank::{RerankerConfig, RerankerModelType, RerankerService};
pub use service::{EmbeddingConfig, EmbeddingModelType, EmbeddingService};

/// Default embedding dimension for Nomic-embed-text-v1.5
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Compact embedding dimension (using Matryoshka truncation)
pub const COMPACT_EMBEDDING_DIM: usize = 256;

/// Turns text into fixed-length vectors.
///
/// Must be deterministic for a given model version: the corpus and the
/// queries are embedded by the same implementation.
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order
    fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Generate a single embedding for a text
    fn embed_single(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self.embed(vec![text.to_string()])?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::EmbeddingGeneration("No embedding generated".into()))
    }
}

/// Pairwise relevance model.
///
/// Returns exactly one score per document, in the order the documents were
/// given. Higher means more relevant; scores from one call are comparable
/// with each other regardless of how the documents were retrieved.
pub trait CrossEncoder: Send + Sync {
    fn score_pairs(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, EmbeddingError>;
}

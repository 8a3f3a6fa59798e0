//! # RAG Vector Store
//!
//! Persisted vector index for semantic passage retrieval. Documents are stored
//! with their metadata and embedding in one JSON file; queries run an
//! exhaustive cosine-similarity scan.
//!
//! The serving path only reads: [`VectorStore::open`] loads the file once,
//! [`VectorStore::list_all`] hands the documents to the corpus loader, and
//! [`VectorStore::similarity_search`] answers nearest-neighbour queries.
//!
//! ## Example
//!
//! ```no_run
//! use rag_embeddings::{Embedder, EmbeddingService};
//! use rag_vector_store::VectorStore;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let embedder = EmbeddingService::new()?;
//!     let store = VectorStore::open(Path::new("data/vector/index.json")).await?;
//!
//!     let query = embedder.embed_single("deep learning basics")?;
//!     let results = store.similarity_search(&query, 10)?;
//!
//!     println!("Found {} similar passages", results.len());
//!     Ok(())
//! }
//! ```

mod document;
mod error;
mod store;

pub use document::DocumentMetadata;
pub use error::VectorStoreError;
pub use store::{SearchResult, VectorStore};

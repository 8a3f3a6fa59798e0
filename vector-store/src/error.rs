use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during vector store operations
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// No index file exists at the given path
    #[error("Vector index not found at {}", .0.display())]
    NotFound(PathBuf),

    /// The index file exists but its contents are unusable
    #[error("Failed to initialize vector store: {0}")]
    Initialization(String),

    /// A vector does not have the dimension the index was built with
    #[error("Dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Failed to add data to the vector store
    #[error("Failed to add data: {0}")]
    AdditionFailed(String),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(#[from] rag_embeddings::EmbeddingError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

use thiserror::Error;

/// Errors that can occur while loading or running an embedding or reranking model
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Failed to initialize the model
    #[error("Failed to initialize model: {0}")]
    ModelInitialization(String),

    /// Failed to generate embeddings
    #[error("Failed to generate embeddings: {0}")]
    EmbeddingGeneration(String),

    /// Failed to score query/document pairs
    #[error("Failed to rerank: {0}")]
    Reranking(String),

    /// Invalid input provided to the model
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

use crate::availability::Dependency;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Query must not be blank")]
    EmptyQuery,

    #[error("Query too short: minimum {min} characters, got {actual}")]
    QueryTooShort { min: usize, actual: usize },

    #[error("Search services not properly initialized: {} unavailable", join(.0))]
    Unavailable(Vec<Dependency>),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] rag_vector_store::VectorStoreError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] rag_embeddings::EmbeddingError),

    #[error("Retrieval task failed: {0}")]
    Task(String),

    #[error("Invalid retrieval configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification used by transports to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent an unusable query
    InvalidRequest,
    /// A required dependency failed to initialize
    Unavailable,
    /// Unexpected fault while processing
    Internal,
}

impl RetrievalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RetrievalError::EmptyQuery | RetrievalError::QueryTooShort { .. } => {
                ErrorKind::InvalidRequest
            }
            RetrievalError::Unavailable(_) => ErrorKind::Unavailable,
            RetrievalError::VectorStore(_)
            | RetrievalError::Embedding(_)
            | RetrievalError::Task(_)
            | RetrievalError::InvalidConfig(_) => ErrorKind::Internal,
        }
    }
}

impl From<tokio::task::JoinError> for RetrievalError {
    fn from(err: tokio::task::JoinError) -> Self {
        RetrievalError::Task(err.to_string())
    }
}

fn join(dependencies: &[Dependency]) -> String {
    dependencies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, RetrievalError>;

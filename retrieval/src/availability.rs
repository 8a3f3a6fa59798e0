use serde::{Deserialize, Serialize};
use std::fmt;

/// A process-wide dependency of the retrieval pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependency {
    /// Embedder plus vector index
    Semantic,
    /// BM25 index over the corpus
    Lexical,
    /// Cross-encoder reranker
    Reranker,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dependency::Semantic => "semantic retriever",
            Dependency::Lexical => "lexical retriever",
            Dependency::Reranker => "reranker",
        };
        f.write_str(name)
    }
}

/// Which dependencies finished initializing. Computed once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub semantic_ready: bool,
    pub lexical_ready: bool,
    pub rerank_ready: bool,
}

impl Availability {
    pub fn all_ready() -> Self {
        Self {
            semantic_ready: true,
            lexical_ready: true,
            rerank_ready: true,
        }
    }

    /// Dependencies that must be present before a query can be served.
    /// The reranker is not one of them.
    pub fn missing_for_retrieval(&self) -> Vec<Dependency> {
        let mut missing = Vec::new();
        if !self.semantic_ready {
            missing.push(Dependency::Semantic);
        }
        if !self.lexical_ready {
            missing.push(Dependency::Lexical);
        }
        missing
    }

    pub fn can_retrieve(&self) -> bool {
        self.semantic_ready && self.lexical_ready
    }
}

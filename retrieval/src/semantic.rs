use crate::corpus::{DEFAULT_TITLE, Document};
use crate::error::Result;
use crate::result::RetrievalHit;
use log::debug;
use rag_embeddings::Embedder;
use rag_vector_store::{VectorStore, VectorStoreError};
use std::sync::Arc;

/// Embeds the query and searches the vector index
pub struct SemanticRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<VectorStore>,
}

impl SemanticRetriever {
    /// Pair an embedder with the index it built.
    ///
    /// Fails when the index was written with a different vector dimension.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<VectorStore>) -> Result<Self> {
        if let Some(expected) = store.dimension() {
            let actual = embedder.dimension();
            if expected != actual {
                return Err(VectorStoreError::DimensionMismatch { expected, actual }.into());
            }
        }

        Ok(Self { embedder, store })
    }

    /// Up to `k` hits ordered by similarity, each carrying its similarity score
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalHit>> {
        let query_vector = self.embedder.embed_single(query)?;
        let results = self.store.similarity_search(&query_vector, k)?;
        debug!("Semantic search returned {} hits", results.len());

        Ok(results
            .into_iter()
            .map(|result| {
                let title = result
                    .metadata
                    .title
                    .unwrap_or_else(|| DEFAULT_TITLE.to_string());
                RetrievalHit::semantic(Document::new(result.document, title), result.score)
            })
            .collect())
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }
}

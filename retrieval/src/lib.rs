/*!
# RAG Retrieval

Hybrid passage retrieval over a fixed corpus:
- **Semantic search** via query embeddings and the persisted vector index
- **Lexical search** via BM25 over the in-memory corpus
- **Cross-encoder reranking** to put both candidate sets on one score scale

## Architecture

```text
Query
  ├─> Semantic Search (embeddings)   ─> top-K hits, Scored(similarity)
  ├─> Lexical Search (BM25)          ─> top-K hits, Unscored
  └─> Fusion (concatenate, semantic first)
        └─> Reranking (cross-encoder) ─> Unified(score)
              └─> Truncate to N
```

Semantic similarity and lexical rank are never compared directly. When the
reranker is missing or fails, candidates keep arrival order and their
provisional scores, with 0.0 standing in for lexical hits.

## Example

```rust,no_run
use rag_retrieval::{CorpusStore, HybridRetrieval, LexicalRetriever, RetrievalConfig, SemanticRetriever};
use rag_embeddings::{EmbeddingService, RerankerService};
use rag_utils_tokenizer::WordTokenizer;
use rag_vector_store::VectorStore;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RetrievalConfig::default();
    let store = Arc::new(VectorStore::open(Path::new("data/vector/index.json")).await?);
    let (contents, metadatas) = store.list_all();
    let corpus = Arc::new(CorpusStore::from_index_contents(contents, metadatas));

    let semantic = SemanticRetriever::new(Arc::new(EmbeddingService::new()?), store)?;
    let lexical = LexicalRetriever::build(corpus, Arc::new(WordTokenizer::default()), config.bm25_k1, config.bm25_b);
    let reranker = Arc::new(RerankerService::new()?);

    let retrieval = HybridRetrieval::new(config, Some(semantic), Some(lexical), Some(reranker))?;
    let results = retrieval.search("deep learning basics").await?;

    for result in results.top(5) {
        println!("{:.3} {}", result.score.value(), result.document.title);
    }

    Ok(())
}
```
*/

mod availability;
mod config;
mod corpus;
mod error;
mod fusion;
mod lexical;
mod rerank;
mod result;
mod retrieval;
mod semantic;

pub use availability::{Availability, Dependency};
pub use config::RetrievalConfig;
pub use corpus::{CorpusStore, DEFAULT_TITLE, Document};
pub use error::{ErrorKind, Result, RetrievalError};
pub use fusion::{FusionEngine, FusionOutcome};
pub use lexical::LexicalRetriever;
pub use rerank::RerankEngine;
pub use result::{
    FusedScore, HitScore, NO_RELEVANT_DOCUMENTS, RankingMode, RetrievalHit, SearchResult,
    SearchResults, SearchSource, SearchStats,
};
pub use retrieval::{CacheStats, HybridRetrieval};
pub use semantic::SemanticRetriever;

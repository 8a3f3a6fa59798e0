#![allow(dead_code)]

use rag_embeddings::{CrossEncoder, Embedder, EmbeddingError};
use rag_retrieval::{
    CorpusStore, HybridRetrieval, LexicalRetriever, RetrievalConfig, SemanticRetriever,
};
use rag_utils_tokenizer::WordTokenizer;
use rag_vector_store::{DocumentMetadata, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub const DIM: usize = 4;

/// Embeds known texts to fixed vectors; everything else maps to a fallback.
/// Counts calls so tests can assert the embedder was never reached.
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    calls: AtomicUsize,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, [f32; DIM])]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                .collect(),
            fallback: vec![0.0, 0.0, 0.0, 1.0],
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for TableEmbedder {
    fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| self.table.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
            .collect())
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

/// Embeds documents fine but fails on every query once armed
pub struct BrokenQueryEmbedder {
    pub armed: std::sync::atomic::AtomicBool,
}

impl Embedder for BrokenQueryEmbedder {
    fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.armed.load(Ordering::SeqCst) {
            return Err(EmbeddingError::EmbeddingGeneration("session crashed".to_string()));
        }
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0, 0.0]).collect())
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

/// Scores each document with a fixed table; unknown documents score 0
pub struct TableScorer {
    pub scores: HashMap<String, f32>,
}

impl TableScorer {
    pub fn new(entries: &[(&str, f32)]) -> Self {
        Self {
            scores: entries.iter().map(|(d, s)| (d.to_string(), *s)).collect(),
        }
    }
}

impl CrossEncoder for TableScorer {
    fn score_pairs(&self, _query: &str, documents: &[&str]) -> Result<Vec<f32>, EmbeddingError> {
        Ok(documents
            .iter()
            .map(|d| self.scores.get(*d).copied().unwrap_or(0.0))
            .collect())
    }
}

/// Scores by how many query words the document contains, plus a length tiebreak
pub struct OverlapScorer;

impl CrossEncoder for OverlapScorer {
    fn score_pairs(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, EmbeddingError> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        Ok(documents
            .iter()
            .map(|doc| {
                let doc = doc.to_lowercase();
                let hits = words.iter().filter(|w| doc.contains(w.as_str())).count() as f32;
                hits + 1.0 / (1.0 + doc.len() as f32)
            })
            .collect())
    }
}

pub struct FailingScorer;

impl CrossEncoder for FailingScorer {
    fn score_pairs(&self, _query: &str, _documents: &[&str]) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Reranking("out of memory".to_string()))
    }
}

/// Vector index on disk plus the corpus read back from it
pub struct Fixture {
    pub store: Arc<VectorStore>,
    pub corpus: Arc<CorpusStore>,
    _dir: TempDir,
}

pub async fn fixture(embedder: &dyn Embedder, texts: &[&str]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut store = VectorStore::new(&dir.path().join("index.json")).await.unwrap();
    store
        .add_documents(
            embedder,
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| (text.to_string(), DocumentMetadata::titled(format!("Doc {i}"))))
                .collect(),
        )
        .await
        .unwrap();

    // Nothing is written for an empty corpus, so only reopen a populated index.
    let reopened = if texts.is_empty() {
        store
    } else {
        VectorStore::open(store.path()).await.unwrap()
    };
    let (contents, metadatas) = reopened.list_all();
    let corpus = CorpusStore::from_index_contents(contents, metadatas);

    Fixture {
        store: Arc::new(reopened),
        corpus: Arc::new(corpus),
        _dir: dir,
    }
}

pub fn retrieval(
    config: RetrievalConfig,
    embedder: Arc<dyn Embedder>,
    fixture: &Fixture,
    cross_encoder: Option<Arc<dyn CrossEncoder>>,
) -> HybridRetrieval {
    let semantic = SemanticRetriever::new(embedder, Arc::clone(&fixture.store)).unwrap();
    let lexical = LexicalRetriever::build(
        Arc::clone(&fixture.corpus),
        Arc::new(WordTokenizer::default()),
        config.bm25_k1,
        config.bm25_b,
    );
    HybridRetrieval::new(config, Some(semantic), Some(lexical), cross_encoder).unwrap()
}

/// Twenty-five short passages about machine learning, none empty
pub fn ml_corpus() -> Vec<String> {
    let topics = [
        "neural networks", "gradient descent", "backpropagation", "convolution",
        "attention", "transformers", "regularization", "dropout", "batch norm",
        "optimizers", "loss functions", "embeddings", "tokenization", "fine tuning",
        "transfer learning", "reinforcement learning", "decision trees", "random forests",
        "clustering", "dimensionality reduction", "deep learning", "activation functions",
        "overfitting", "cross validation", "hyperparameters",
    ];
    topics
        .iter()
        .map(|topic| format!("An overview of {topic} and how {topic} are used in practice"))
        .collect()
}

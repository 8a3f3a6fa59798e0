//! BM25 Okapi ranking over the in-memory corpus.
//!
//! The index is built once from the [`CorpusStore`] and never mutated.
//! Scores stay internal: callers only see documents in rank order.

use crate::corpus::{CorpusStore, Document};
use log::debug;
use rag_utils_tokenizer::Tokenize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: usize,
    term_frequency: u32,
}

/// Inverted index plus the corpus it was built from
pub struct LexicalRetriever {
    corpus: Arc<CorpusStore>,
    tokenizer: Arc<dyn Tokenize>,
    postings: HashMap<String, Vec<Posting>>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f32,
    k1: f32,
    b: f32,
}

impl LexicalRetriever {
    /// Tokenize every corpus document and build the postings lists
    pub fn build(corpus: Arc<CorpusStore>, tokenizer: Arc<dyn Tokenize>, k1: f32, b: f32) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(corpus.len());

        for (doc, document) in corpus.iter().enumerate() {
            let tokens = tokenizer.tokenize(&document.content);
            doc_lengths.push(tokens.len() as u32);

            let mut frequencies: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *frequencies.entry(token).or_insert(0) += 1;
            }
            for (term, term_frequency) in frequencies {
                postings.entry(term).or_default().push(Posting {
                    doc,
                    term_frequency,
                });
            }
        }

        let total: u64 = doc_lengths.iter().map(|&len| u64::from(len)).sum();
        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            total as f32 / doc_lengths.len() as f32
        };

        debug!(
            "Built lexical index: {} documents, {} terms, avg length {:.1}",
            doc_lengths.len(),
            postings.len(),
            avg_doc_length
        );

        Self {
            corpus,
            tokenizer,
            postings,
            doc_lengths,
            avg_doc_length,
            k1,
            b,
        }
    }

    /// Top `k` documents by BM25 score, best first.
    ///
    /// Only documents sharing at least one token with the query are returned.
    /// A query with no tokens yields an empty result.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<Document> {
        self.ranked(query, k)
            .into_iter()
            .filter_map(|(doc, _)| self.corpus.get(doc).cloned())
            .collect()
    }

    fn ranked(&self, query: &str, k: usize) -> Vec<(usize, f32)> {
        let query_tokens = self.tokenizer.tokenize(query);
        if query_tokens.is_empty() || self.doc_lengths.is_empty() || k == 0 {
            return Vec::new();
        }

        let n = self.doc_lengths.len() as f32;
        let mut scores: HashMap<usize, f32> = HashMap::new();

        for token in &query_tokens {
            let Some(postings) = self.postings.get(token) else {
                continue;
            };
            let df = postings.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for posting in postings {
                let dl = self.doc_lengths[posting.doc] as f32;
                let tf = posting.term_frequency as f32;
                let norm = if self.avg_doc_length > 0.0 {
                    dl / self.avg_doc_length
                } else {
                    0.0
                };
                let tf_norm = (tf * (self.k1 + 1.0)) / (tf + self.k1 * (1.0 - self.b + self.b * norm));
                *scores.entry(posting.doc).or_insert(0.0) += idf * tf_norm;
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        ranked.truncate(k);
        ranked
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }
}

use serde::{Deserialize, Serialize};

/// Configuration for hybrid retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Candidates taken from semantic search before reranking
    #[serde(default = "default_semantic_k")]
    pub semantic_k: usize,

    /// Candidates taken from lexical search before reranking
    #[serde(default = "default_lexical_k")]
    pub lexical_k: usize,

    /// Final number of results returned after reranking
    #[serde(default = "default_final_result_count")]
    pub final_result_count: usize,

    /// Minimum query length in characters, after trimming
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    /// BM25 term-frequency saturation
    #[serde(default = "default_bm25_k1")]
    pub bm25_k1: f32,

    /// BM25 document-length normalization (0.0 - 1.0)
    #[serde(default = "default_bm25_b")]
    pub bm25_b: f32,

    /// Run semantic and lexical retrieval concurrently
    #[serde(default = "default_true")]
    pub parallel_retrieval: bool,

    /// Enable caching of search results
    #[serde(default = "default_true")]
    pub enable_cache: bool,

    /// Cache size (number of queries to cache)
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

fn default_semantic_k() -> usize {
    10
}

fn default_lexical_k() -> usize {
    10
}

fn default_final_result_count() -> usize {
    5
}

fn default_min_query_length() -> usize {
    1
}

fn default_bm25_k1() -> f32 {
    1.5
}

fn default_bm25_b() -> f32 {
    0.75
}

fn default_true() -> bool {
    true
}

fn default_cache_size() -> usize {
    100
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_k: default_semantic_k(),
            lexical_k: default_lexical_k(),
            final_result_count: default_final_result_count(),
            min_query_length: default_min_query_length(),
            bm25_k1: default_bm25_k1(),
            bm25_b: default_bm25_b(),
            parallel_retrieval: true,
            enable_cache: true,
            cache_size: default_cache_size(),
        }
    }
}

impl RetrievalConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.semantic_k == 0 {
            return Err("semantic_k must be > 0".to_string());
        }

        if self.lexical_k == 0 {
            return Err("lexical_k must be > 0".to_string());
        }

        if self.final_result_count == 0 {
            return Err("final_result_count must be > 0".to_string());
        }

        let pool = self.candidate_pool_size();
        if self.final_result_count > pool {
            return Err(format!(
                "final_result_count ({}) cannot exceed semantic_k + lexical_k ({pool})",
                self.final_result_count
            ));
        }

        if self.bm25_k1.is_nan() || self.bm25_k1 < 0.0 {
            return Err(format!("bm25_k1 must be >= 0, got {}", self.bm25_k1));
        }

        if !(0.0..=1.0).contains(&self.bm25_b) {
            return Err(format!("bm25_b must be in [0.0, 1.0], got {}", self.bm25_b));
        }

        if self.enable_cache && self.cache_size == 0 {
            return Err("cache_size must be > 0 when caching is enabled".to_string());
        }

        Ok(())
    }

    /// Upper bound on the number of candidates the reranker sees
    pub fn candidate_pool_size(&self) -> usize {
        self.semantic_k + self.lexical_k
    }

    /// Smaller candidate pool, for tight latency budgets
    pub fn fast() -> Self {
        Self {
            semantic_k: 5,
            lexical_k: 5,
            ..Default::default()
        }
    }

    /// Larger candidate pool, so the reranker can recover answers
    /// that rank low on both signals
    pub fn accurate() -> Self {
        Self {
            semantic_k: 25,
            lexical_k: 25,
            ..Default::default()
        }
    }
}

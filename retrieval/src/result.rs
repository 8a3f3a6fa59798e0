use crate::corpus::Document;
use serde::{Deserialize, Serialize};

/// Advisory returned alongside an empty result set
pub const NO_RELEVANT_DOCUMENTS: &str = "No relevant documents found";

/// Retriever a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    Semantic,
    Lexical,
}

/// Score attached by a retriever.
///
/// Semantic similarity and lexical rank live in different spaces, so a lexical
/// hit carries no number at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum HitScore {
    Scored(f32),
    Unscored,
}

impl HitScore {
    pub fn value(&self) -> Option<f32> {
        match self {
            HitScore::Scored(value) => Some(*value),
            HitScore::Unscored => None,
        }
    }
}

/// One candidate produced by a retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub document: Document,
    pub score: HitScore,
    pub source: SearchSource,
}

impl RetrievalHit {
    pub fn semantic(document: Document, similarity: f32) -> Self {
        Self {
            document,
            score: HitScore::Scored(similarity),
            source: SearchSource::Semantic,
        }
    }

    pub fn lexical(document: Document) -> Self {
        Self {
            document,
            score: HitScore::Unscored,
            source: SearchSource::Lexical,
        }
    }
}

/// Score after fusion.
///
/// `Unified` scores come from the cross-encoder and are comparable across
/// every candidate. `Provisional` keeps the retriever's own score when
/// reranking did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum FusedScore {
    Unified(f32),
    Provisional(HitScore),
}

impl FusedScore {
    /// Number to report to callers; unscored hits report 0.0
    pub fn value(&self) -> f32 {
        match self {
            FusedScore::Unified(value) => *value,
            FusedScore::Provisional(hit) => hit.value().unwrap_or(0.0),
        }
    }

    pub fn is_unified(&self) -> bool {
        matches!(self, FusedScore::Unified(_))
    }
}

/// A single ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Document,

    pub score: FusedScore,

    /// Retriever that contributed this candidate
    pub source: SearchSource,

    /// Rank in the result list (0 = best)
    pub rank: usize,
}

impl SearchResult {
    pub fn new(document: Document, score: FusedScore, source: SearchSource) -> Self {
        Self {
            document,
            score,
            source,
            rank: 0,
        }
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }
}

/// How the final order was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Ordered by cross-encoder score
    Reranked,
    /// No reranker loaded; arrival order
    RerankerUnavailable,
    /// The reranker errored for this query; arrival order
    RerankFailed,
}

impl RankingMode {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, RankingMode::Reranked)
    }
}

/// Collection of search results with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Query that produced these results
    pub query: String,

    pub results: Vec<SearchResult>,

    /// Number of candidates handed to fusion
    pub total_candidates: usize,

    pub ranking: RankingMode,

    pub stats: SearchStats,
}

/// Search performance statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Total search time in milliseconds
    pub total_time_ms: u64,

    pub semantic_time_ms: u64,

    pub lexical_time_ms: u64,

    /// Fusion and reranking time in milliseconds
    pub rerank_time_ms: u64,

    pub semantic_count: usize,

    pub lexical_count: usize,

    pub reranked: bool,

    pub cache_hit: bool,
}

impl SearchResults {
    pub fn new(query: String) -> Self {
        Self {
            query,
            results: Vec::new(),
            total_candidates: 0,
            ranking: RankingMode::RerankerUnavailable,
            stats: SearchStats::default(),
        }
    }

    pub fn with_results(mut self, results: Vec<SearchResult>) -> Self {
        self.results = results;
        self
    }

    pub fn with_total_candidates(mut self, count: usize) -> Self {
        self.total_candidates = count;
        self
    }

    pub fn with_ranking(mut self, ranking: RankingMode) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_stats(mut self, stats: SearchStats) -> Self {
        self.stats = stats;
        self
    }

    /// Get top N results
    pub fn top(&self, n: usize) -> &[SearchResult] {
        &self.results[..n.min(self.results.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Human-readable note for an empty result set
    pub fn advisory(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_RELEVANT_DOCUMENTS)
    }
}

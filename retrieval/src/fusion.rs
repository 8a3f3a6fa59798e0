use crate::rerank::RerankEngine;
use crate::result::{RankingMode, RetrievalHit, SearchResult};
use log::debug;

/// Output of one fusion pass
#[derive(Debug, Clone)]
pub struct FusionOutcome {
    pub results: Vec<SearchResult>,
    /// Size of the pool the reranker saw
    pub total_candidates: usize,
    pub ranking: RankingMode,
}

/// Merges both retrievers' hits, reranks them, then truncates.
///
/// Candidates are not deduplicated: a document returned by both retrievers
/// appears twice in the pool. Truncation always happens after reranking, so
/// a candidate that ranked low on one signal can still reach the top.
#[derive(Clone)]
pub struct FusionEngine {
    final_result_count: usize,
    rerank_engine: RerankEngine,
}

impl FusionEngine {
    pub fn new(final_result_count: usize, rerank_engine: RerankEngine) -> Self {
        Self {
            final_result_count,
            rerank_engine,
        }
    }

    pub fn fuse(
        &self,
        query: &str,
        semantic_hits: Vec<RetrievalHit>,
        lexical_hits: Vec<RetrievalHit>,
    ) -> FusionOutcome {
        debug!(
            "Fusing {} semantic + {} lexical candidates",
            semantic_hits.len(),
            lexical_hits.len()
        );

        // Semantic first: ties on the unified score keep this order.
        let mut candidates = semantic_hits;
        candidates.extend(lexical_hits);
        let total_candidates = candidates.len();

        let (mut results, ranking) = self.rerank_engine.rerank(query, candidates);

        results.truncate(self.final_result_count);
        for (rank, result) in results.iter_mut().enumerate() {
            result.rank = rank;
        }

        FusionOutcome {
            results,
            total_candidates,
            ranking,
        }
    }

    pub fn rerank_available(&self) -> bool {
        self.rerank_engine.is_available()
    }
}

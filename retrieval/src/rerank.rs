//! Cross-encoder rescoring of the fused candidate pool.
//!
//! Reranking is an enhancement: when the model is missing, errors, or returns
//! an unusable score list, candidates pass through in arrival order with their
//! provisional scores.

use crate::result::{FusedScore, RankingMode, RetrievalHit, SearchResult};
use log::{debug, warn};
use rag_embeddings::CrossEncoder;
use std::sync::Arc;

/// Rescores candidates with a cross-encoder, when one is loaded
#[derive(Clone, Default)]
pub struct RerankEngine {
    cross_encoder: Option<Arc<dyn CrossEncoder>>,
}

impl RerankEngine {
    pub fn new(cross_encoder: Option<Arc<dyn CrossEncoder>>) -> Self {
        Self { cross_encoder }
    }

    pub fn is_available(&self) -> bool {
        self.cross_encoder.is_some()
    }

    /// Score every candidate against the query and sort by that score.
    ///
    /// The sort is stable, so equal scores keep arrival order.
    pub fn rerank(&self, query: &str, candidates: Vec<RetrievalHit>) -> (Vec<SearchResult>, RankingMode) {
        let Some(cross_encoder) = &self.cross_encoder else {
            return (passthrough(candidates), RankingMode::RerankerUnavailable);
        };
        if candidates.is_empty() {
            return (Vec::new(), RankingMode::Reranked);
        }

        debug!("Cross-encoder reranking {} candidates", candidates.len());

        let texts: Vec<&str> = candidates.iter().map(|hit| hit.document.content.as_str()).collect();
        let scores = match cross_encoder.score_pairs(query, &texts) {
            Ok(scores) => scores,
            Err(err) => {
                warn!("Reranking failed, keeping retrieval order: {err}");
                return (passthrough(candidates), RankingMode::RerankFailed);
            }
        };

        if scores.len() != candidates.len() {
            warn!(
                "Reranker returned {} scores for {} candidates, keeping retrieval order",
                scores.len(),
                candidates.len()
            );
            return (passthrough(candidates), RankingMode::RerankFailed);
        }
        if scores.iter().any(|score| !score.is_finite()) {
            warn!("Reranker returned a non-finite score, keeping retrieval order");
            return (passthrough(candidates), RankingMode::RerankFailed);
        }

        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .zip(scores)
            .map(|(hit, score)| SearchResult::new(hit.document, FusedScore::Unified(score), hit.source))
            .collect();

        results.sort_by(|a, b| b.score.value().total_cmp(&a.score.value()));

        (results, RankingMode::Reranked)
    }
}

fn passthrough(candidates: Vec<RetrievalHit>) -> Vec<SearchResult> {
    candidates
        .into_iter()
        .map(|hit| SearchResult::new(hit.document, FusedScore::Provisional(hit.score), hit.source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::result::HitScore;
    use pretty_assertions::assert_eq;
    use rag_embeddings::EmbeddingError;

    /// Scores each document by its length
    struct LengthScorer;

    impl CrossEncoder for LengthScorer {
        fn score_pairs(&self, _query: &str, documents: &[&str]) -> Result<Vec<f32>, EmbeddingError> {
            Ok(documents.iter().map(|d| d.len() as f32).collect())
        }
    }

    struct FailingScorer;

    impl CrossEncoder for FailingScorer {
        fn score_pairs(&self, _query: &str, _documents: &[&str]) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Reranking("model exploded".to_string()))
        }
    }

    struct ShortScorer;

    impl CrossEncoder for ShortScorer {
        fn score_pairs(&self, _query: &str, _documents: &[&str]) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0])
        }
    }

    fn candidates() -> Vec<RetrievalHit> {
        vec![
            RetrievalHit::semantic(Document::untitled("bb"), 0.9),
            RetrievalHit::semantic(Document::untitled("dddd"), 0.8),
            RetrievalHit::lexical(Document::untitled("a")),
            RetrievalHit::lexical(Document::untitled("cc")),
        ]
    }

    fn contents(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.document.content.as_str()).collect()
    }

    #[test]
    fn sorts_by_cross_encoder_score() {
        let engine = RerankEngine::new(Some(Arc::new(LengthScorer)));
        let (results, mode) = engine.rerank("q", candidates());

        assert_eq!(mode, RankingMode::Reranked);
        assert_eq!(contents(&results), vec!["dddd", "bb", "cc", "a"]);
        assert!(results.iter().all(|r| r.score.is_unified()));
    }

    #[test]
    fn equal_scores_keep_arrival_order() {
        let engine = RerankEngine::new(Some(Arc::new(LengthScorer)));
        let (results, _) = engine.rerank("q", candidates());
        // "bb" (semantic) arrived before "cc" (lexical)
        assert_eq!(results[1].source, crate::result::SearchSource::Semantic);
        assert_eq!(results[2].source, crate::result::SearchSource::Lexical);
    }

    #[test]
    fn missing_reranker_passes_through() {
        let engine = RerankEngine::default();
        assert!(!engine.is_available());

        let (results, mode) = engine.rerank("q", candidates());
        assert_eq!(mode, RankingMode::RerankerUnavailable);
        assert_eq!(contents(&results), vec!["bb", "dddd", "a", "cc"]);
        assert_eq!(results[0].score, FusedScore::Provisional(HitScore::Scored(0.9)));
        assert_eq!(results[2].score.value(), 0.0);
    }

    #[test]
    fn failure_passes_through() {
        let engine = RerankEngine::new(Some(Arc::new(FailingScorer)));
        let (results, mode) = engine.rerank("q", candidates());
        assert_eq!(mode, RankingMode::RerankFailed);
        assert_eq!(contents(&results), vec!["bb", "dddd", "a", "cc"]);
    }

    #[test]
    fn short_score_list_passes_through() {
        let engine = RerankEngine::new(Some(Arc::new(ShortScorer)));
        let (results, mode) = engine.rerank("q", candidates());
        assert_eq!(mode, RankingMode::RerankFailed);
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn empty_pool_skips_model() {
        let engine = RerankEngine::new(Some(Arc::new(FailingScorer)));
        let (results, mode) = engine.rerank("q", Vec::new());
        assert!(results.is_empty());
        assert_eq!(mode, RankingMode::Reranked);
    }
}

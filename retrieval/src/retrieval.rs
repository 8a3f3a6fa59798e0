use crate::availability::Availability;
use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::fusion::FusionEngine;
use crate::lexical::LexicalRetriever;
use crate::rerank::RerankEngine;
use crate::result::{RankingMode, RetrievalHit, SearchResults, SearchStats};
use crate::semantic::SemanticRetriever;
use log::{debug, info, warn};
use lru::LruCache;
use rag_embeddings::CrossEncoder;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Characters of each returned document shown in debug logs
const PREVIEW_CHARS: usize = 200;

/// Hybrid retrieval engine combining semantic and lexical search with
/// cross-encoder reranking.
///
/// Built once at startup from whichever dependencies initialized. Missing
/// retrievers make every query fail with [`RetrievalError::Unavailable`]; a
/// missing reranker only degrades the ordering.
pub struct HybridRetrieval {
    config: RetrievalConfig,
    semantic: Option<Arc<SemanticRetriever>>,
    lexical: Option<Arc<LexicalRetriever>>,
    fusion_engine: FusionEngine,
    availability: Availability,
    cache: Option<RwLock<LruCache<String, SearchResults>>>,
}

impl HybridRetrieval {
    pub fn new(
        config: RetrievalConfig,
        semantic: Option<SemanticRetriever>,
        lexical: Option<LexicalRetriever>,
        cross_encoder: Option<Arc<dyn CrossEncoder>>,
    ) -> Result<Self> {
        config.validate().map_err(RetrievalError::InvalidConfig)?;

        let availability = Availability {
            semantic_ready: semantic.is_some(),
            lexical_ready: lexical.is_some(),
            rerank_ready: cross_encoder.is_some(),
        };
        info!("Initializing hybrid retrieval engine: {availability:?}");

        let cache = if config.enable_cache {
            let size = NonZeroUsize::new(config.cache_size).ok_or_else(|| {
                RetrievalError::InvalidConfig("cache_size must be > 0".to_string())
            })?;
            Some(RwLock::new(LruCache::new(size)))
        } else {
            None
        };

        let fusion_engine = FusionEngine::new(
            config.final_result_count,
            RerankEngine::new(cross_encoder),
        );

        Ok(Self {
            config,
            semantic: semantic.map(Arc::new),
            lexical: lexical.map(Arc::new),
            fusion_engine,
            availability,
            cache,
        })
    }

    /// Answer one query with at most `final_result_count` ranked documents.
    ///
    /// The query is trimmed first. An empty outcome is not an error; see
    /// [`SearchResults::advisory`].
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let start = Instant::now();
        let query = query.trim();

        if query.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        let length = query.chars().count();
        if length < self.config.min_query_length {
            return Err(RetrievalError::QueryTooShort {
                min: self.config.min_query_length,
                actual: length,
            });
        }

        let (Some(semantic), Some(lexical)) = (&self.semantic, &self.lexical) else {
            let missing = self.availability.missing_for_retrieval();
            warn!("Rejecting query, retrieval unavailable: {missing:?}");
            return Err(RetrievalError::Unavailable(missing));
        };

        info!("Received query: '{query}'");

        if let Some(cache) = &self.cache {
            let mut cache = cache.write().await;
            if let Some(cached) = cache.get(query) {
                info!("Cache hit for query: '{query}'");
                let mut result = cached.clone();
                result.stats.cache_hit = true;
                result.stats.total_time_ms = start.elapsed().as_millis() as u64;
                return Ok(result);
            }
        }

        let mut stats = SearchStats::default();

        let (semantic_hits, lexical_hits) = self
            .retrieve_candidates(Arc::clone(semantic), Arc::clone(lexical), query, &mut stats)
            .await?;
        stats.semantic_count = semantic_hits.len();
        stats.lexical_count = lexical_hits.len();
        info!(
            "Retrieved {} semantic and {} lexical candidates",
            stats.semantic_count, stats.lexical_count
        );

        let rerank_start = Instant::now();
        let fusion_engine = self.fusion_engine.clone();
        let owned_query = query.to_string();
        let outcome = tokio::task::spawn_blocking(move || {
            fusion_engine.fuse(&owned_query, semantic_hits, lexical_hits)
        })
        .await?;
        stats.rerank_time_ms = rerank_start.elapsed().as_millis() as u64;
        stats.reranked = outcome.ranking == RankingMode::Reranked;
        stats.total_time_ms = start.elapsed().as_millis() as u64;

        let results = SearchResults::new(query.to_string())
            .with_results(outcome.results)
            .with_total_candidates(outcome.total_candidates)
            .with_ranking(outcome.ranking)
            .with_stats(stats);

        if results.is_empty() {
            warn!("No relevant documents found for query: '{query}'");
        }
        for result in &results.results {
            debug!(
                "#{} score={:.4} source={:?} content='{}'",
                result.rank,
                result.score.value(),
                result.source,
                result.document.preview(PREVIEW_CHARS)
            );
        }

        // Degraded orderings are not pinned in the cache.
        if let Some(cache) = &self.cache
            && results.ranking == RankingMode::Reranked
        {
            cache.write().await.put(query.to_string(), results.clone());
        }

        info!(
            "Search completed in {}ms, returned {} results ({:?})",
            results.stats.total_time_ms,
            results.len(),
            results.ranking
        );

        Ok(results)
    }

    async fn retrieve_candidates(
        &self,
        semantic: Arc<SemanticRetriever>,
        lexical: Arc<LexicalRetriever>,
        query: &str,
        stats: &mut SearchStats,
    ) -> Result<(Vec<RetrievalHit>, Vec<RetrievalHit>)> {
        let semantic_k = self.config.semantic_k;
        let lexical_k = self.config.lexical_k;

        let run_semantic = {
            let query = query.to_string();
            move || {
                let started = Instant::now();
                let hits = semantic.retrieve(&query, semantic_k);
                (hits, started.elapsed().as_millis() as u64)
            }
        };
        let run_lexical = {
            let query = query.to_string();
            move || {
                let started = Instant::now();
                let hits: Vec<RetrievalHit> = lexical
                    .top_k(&query, lexical_k)
                    .into_iter()
                    .map(RetrievalHit::lexical)
                    .collect();
                (hits, started.elapsed().as_millis() as u64)
            }
        };

        let ((semantic_hits, semantic_ms), (lexical_hits, lexical_ms)) =
            if self.config.parallel_retrieval {
                let (semantic, lexical) = tokio::join!(
                    tokio::task::spawn_blocking(run_semantic),
                    tokio::task::spawn_blocking(run_lexical),
                );
                (semantic?, lexical?)
            } else {
                tokio::task::spawn_blocking(move || (run_semantic(), run_lexical())).await?
            };

        stats.semantic_time_ms = semantic_ms;
        stats.lexical_time_ms = lexical_ms;
        debug!("Semantic search took {semantic_ms}ms, lexical search took {lexical_ms}ms");

        Ok((semantic_hits?, lexical_hits))
    }

    /// Which dependencies were available at construction
    pub fn availability(&self) -> Availability {
        self.availability
    }

    /// Number of documents in the lexical corpus
    pub fn corpus_size(&self) -> usize {
        self.lexical
            .as_ref()
            .map(|lexical| lexical.corpus().len())
            .unwrap_or(0)
    }

    /// Clear search cache
    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().await.clear();
            info!("Search cache cleared");
        }
    }

    /// Get cache statistics
    pub async fn cache_stats(&self) -> CacheStats {
        match &self.cache {
            Some(cache) => {
                let cache = cache.read().await;
                CacheStats {
                    size: cache.len(),
                    capacity: cache.cap().get(),
                }
            }
            None => CacheStats::default(),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
}

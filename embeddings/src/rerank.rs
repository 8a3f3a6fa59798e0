use crate::CrossEncoder;
use crate::error::EmbeddingError;
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the cross-encoder reranker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RerankerConfig {
    /// Cross-encoder model
    pub model: RerankerModelType,

    /// Maximum number of pairs scored per forward pass
    pub batch_size: usize,

    /// Where downloaded model files are cached (fastembed default when unset)
    pub cache_dir: Option<PathBuf>,

    /// Show download progress when downloading models
    pub show_download_progress: bool,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model: RerankerModelType::BgeRerankerV2M3,
            batch_size: 32,
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

/// Supported cross-encoder models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RerankerModelType {
    /// BAAI/bge-reranker-v2-m3 (multilingual)
    #[serde(rename = "bge-reranker-v2-m3")]
    BgeRerankerV2M3,
    /// BAAI/bge-reranker-base (English and Chinese, smaller)
    #[serde(rename = "bge-reranker-base")]
    BgeRerankerBase,
}

impl RerankerModelType {
    fn to_fastembed_model(self) -> RerankerModel {
        match self {
            RerankerModelType::BgeRerankerV2M3 => RerankerModel::BGERerankerV2M3,
            RerankerModelType::BgeRerankerBase => RerankerModel::BGERerankerBase,
        }
    }
}

/// Cross-encoder reranking backed by fastembed's `TextRerank`
pub struct RerankerService {
    model: TextRerank,
    config: RerankerConfig,
}

impl RerankerService {
    /// Load the default reranker (bge-reranker-v2-m3)
    pub fn new() -> Result<Self, EmbeddingError> {
        Self::with_config(RerankerConfig::default())
    }

    /// Load a reranker. Blocks while the model is downloaded and loaded.
    pub fn with_config(config: RerankerConfig) -> Result<Self, EmbeddingError> {
        if config.batch_size == 0 {
            return Err(EmbeddingError::InvalidInput(
                "batch_size must be > 0".to_string(),
            ));
        }

        info!("Initializing reranker with model {:?}", config.model);

        let mut init_options = RerankInitOptions::new(config.model.to_fastembed_model())
            .with_show_download_progress(config.show_download_progress);
        if let Some(cache_dir) = &config.cache_dir {
            init_options = init_options.with_cache_dir(cache_dir.clone());
        }

        let model = TextRerank::try_new(init_options).map_err(|e| {
            EmbeddingError::ModelInitialization(format!("Failed to initialize reranker: {e}"))
        })?;

        info!("Reranker initialized successfully");

        Ok(Self { model, config })
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }
}

impl CrossEncoder for RerankerService {
    fn score_pairs(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, EmbeddingError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Scoring {} query/document pairs", documents.len());

        let results = self
            .model
            .rerank(query, documents.to_vec(), false, Some(self.config.batch_size))
            .map_err(|e| EmbeddingError::Reranking(e.to_string()))?;

        // fastembed returns results sorted by score; put them back in input order.
        let mut scores: Vec<Option<f32>> = vec![None; documents.len()];
        for result in results {
            if let Some(slot) = scores.get_mut(result.index) {
                *slot = Some(result.score);
            }
        }

        scores
            .into_iter()
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| {
                EmbeddingError::Reranking(format!(
                    "reranker did not score every one of {} documents",
                    documents.len()
                ))
            })
    }
}

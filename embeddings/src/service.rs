use crate::Embedder;
use crate::error::EmbeddingError;
use crate::{COMPACT_EMBEDDING_DIM, DEFAULT_EMBEDDING_DIM};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the embedding service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings
    pub model: EmbeddingModelType,

    /// Target embedding dimension (for Matryoshka truncation)
    pub dimension: usize,

    /// Maximum batch size for embedding generation
    pub batch_size: usize,

    /// Where downloaded model files are cached (fastembed default when unset)
    pub cache_dir: Option<PathBuf>,

    /// Show download progress when downloading models
    pub show_download_progress: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: EmbeddingModelType::NomicEmbedTextV15,
            dimension: DEFAULT_EMBEDDING_DIM,
            batch_size: 32,
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

/// Supported embedding models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbeddingModelType {
    /// Nomic-embed-text-v1.5
    #[serde(rename = "nomic-embed-text-v1.5")]
    NomicEmbedTextV15,
    /// All-MiniLM-L6-v2 (lightweight, faster)
    #[serde(rename = "all-minilm-l6-v2")]
    AllMiniLmL6V2,
    /// Multilingual E5 small, for corpora that are not English-only
    #[serde(rename = "multilingual-e5-small")]
    MultilingualE5Small,
}

impl EmbeddingModelType {
    fn to_fastembed_model(self) -> EmbeddingModel {
        match self {
            EmbeddingModelType::NomicEmbedTextV15 => EmbeddingModel::NomicEmbedTextV15,
            EmbeddingModelType::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            EmbeddingModelType::MultilingualE5Small => EmbeddingModel::MultilingualE5Small,
        }
    }
}

/// Service for generating text embeddings
pub struct EmbeddingService {
    model: TextEmbedding,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service with default configuration
    pub fn new() -> Result<Self, EmbeddingError> {
        Self::with_config(EmbeddingConfig::default())
    }

    /// Create a new embedding service with custom configuration.
    ///
    /// Blocks while the model is downloaded (first run) and loaded into ONNX Runtime.
    pub fn with_config(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        if config.batch_size == 0 {
            return Err(EmbeddingError::InvalidInput(
                "batch_size must be > 0".to_string(),
            ));
        }

        info!(
            "Initializing embedding service with model {:?}, dimension {}",
            config.model, config.dimension
        );

        let mut init_options = InitOptions::new(config.model.to_fastembed_model())
            .with_show_download_progress(config.show_download_progress);
        if let Some(cache_dir) = &config.cache_dir {
            init_options = init_options.with_cache_dir(cache_dir.clone());
        }

        let model = TextEmbedding::try_new(init_options).map_err(|e| {
            EmbeddingError::ModelInitialization(format!("Failed to initialize model: {e}"))
        })?;

        info!("Embedding service initialized successfully");

        Ok(Self { model, config })
    }

    /// Create a compact embedding service (256 dimensions)
    pub fn new_compact() -> Result<Self, EmbeddingError> {
        let config = EmbeddingConfig {
            dimension: COMPACT_EMBEDDING_DIM,
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Get the configuration of this service
    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

impl Embedder for EmbeddingService {
    fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in text_refs.chunks(self.config.batch_size) {
            let batch_embeddings = self
                .model
                .embed(chunk.to_vec(), None)
                .map_err(|e| EmbeddingError::EmbeddingGeneration(e.to_string()))?;

            for mut embedding in batch_embeddings {
                // Matryoshka truncation
                if embedding.len() > self.config.dimension {
                    embedding.truncate(self.config.dimension);
                }
                all_embeddings.push(embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());

        Ok(all_embeddings)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

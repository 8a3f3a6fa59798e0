use anyhow::Context;
use rag_embeddings::{EmbeddingConfig, RerankerConfig, RerankerModelType};
use rag_retrieval::RetrievalConfig;
use rag_utils_tokenizer::{Tokenize, WordTokenizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Service settings, read from an optional TOML file.
///
/// Every section is optional; missing keys take their defaults and unknown
/// keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: ServerConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub reranker: RerankerSettings,
    pub retrieval: RetrievalConfig,
    pub startup: StartupConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Vector index file written by the ingestion tooling
    pub path: PathBuf,
    /// Tokenizer for the lexical index and for queries
    pub tokenizer: TokenizerChoice,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/vector/index.json"),
            tokenizer: TokenizerChoice::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerChoice {
    /// Unicode word boundaries, lowercased
    #[default]
    Words,
    /// jieba dictionary segmentation (needs the `jieba` feature)
    Jieba,
}

impl TokenizerChoice {
    pub fn is_supported(self) -> bool {
        match self {
            TokenizerChoice::Words => true,
            TokenizerChoice::Jieba => cfg!(feature = "jieba"),
        }
    }

    pub fn build(self) -> anyhow::Result<Arc<dyn Tokenize>> {
        match self {
            TokenizerChoice::Words => Ok(Arc::new(WordTokenizer::default())),
            #[cfg(feature = "jieba")]
            TokenizerChoice::Jieba => Ok(Arc::new(rag_utils_tokenizer::JiebaTokenizer::new())),
            #[cfg(not(feature = "jieba"))]
            TokenizerChoice::Jieba => anyhow::bail!(
                "jieba tokenizer requested but rag-server was built without the `jieba` feature"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RerankerSettings {
    /// Load the cross-encoder at startup. When off, results keep retrieval order.
    pub enabled: bool,
    pub model: RerankerModelType,
    pub batch_size: usize,
    pub cache_dir: Option<PathBuf>,
    pub show_download_progress: bool,
}

impl Default for RerankerSettings {
    fn default() -> Self {
        let defaults = RerankerConfig::default();
        Self {
            enabled: true,
            model: defaults.model,
            batch_size: defaults.batch_size,
            cache_dir: defaults.cache_dir,
            show_download_progress: defaults.show_download_progress,
        }
    }
}

impl RerankerSettings {
    pub fn model_config(&self) -> RerankerConfig {
        RerankerConfig {
            model: self.model,
            batch_size: self.batch_size,
            cache_dir: self.cache_dir.clone(),
            show_download_progress: self.show_download_progress,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartupConfig {
    /// Exit at startup when retrieval is unavailable instead of serving 503s
    pub fail_fast: bool,
}

impl Settings {
    /// Read settings from `path`, or use defaults when no path is given
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(raw)?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.retrieval
            .validate()
            .map_err(|err| anyhow::anyhow!("[retrieval] {err}"))?;

        if self.server.host.trim().is_empty() {
            anyhow::bail!("[server] host must not be empty");
        }
        if self.index.path.as_os_str().is_empty() {
            anyhow::bail!("[index] path must not be empty");
        }
        if !self.index.tokenizer.is_supported() {
            anyhow::bail!(
                "[index] tokenizer {:?} needs rag-server built with the `jieba` feature",
                self.index.tokenizer
            );
        }
        if self.reranker.enabled && self.reranker.batch_size == 0 {
            anyhow::bail!("[reranker] batch_size must be > 0");
        }
        if self.embedding.batch_size == 0 {
            anyhow::bail!("[embedding] batch_size must be > 0");
        }

        Ok(())
    }
}

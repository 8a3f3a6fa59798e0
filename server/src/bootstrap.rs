//! Startup wiring for the retrieval service.
//!
//! Each dependency is loaded in turn and its outcome recorded. A failure never
//! aborts startup; it leaves the matching part of the pipeline unavailable so
//! queries get a service-unavailable answer instead of a partial one.

use crate::config::Settings;
use rag_embeddings::{
    CrossEncoder, Embedder, EmbeddingConfig, EmbeddingError, EmbeddingService, RerankerConfig,
    RerankerService,
};
use rag_retrieval::{CorpusStore, HybridRetrieval, LexicalRetriever, SemanticRetriever};
use rag_vector_store::VectorStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Loads the embedding and reranking models.
///
/// Both calls may block for a long time (model download, ONNX session setup),
/// so the bootstrap runs them on the blocking pool.
pub trait ModelProvider: Send + Sync {
    fn embedder(&self, config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError>;

    fn cross_encoder(
        &self,
        config: &RerankerConfig,
    ) -> Result<Arc<dyn CrossEncoder>, EmbeddingError>;
}

/// fastembed-backed models
pub struct FastembedModels;

impl ModelProvider for FastembedModels {
    fn embedder(&self, config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        Ok(Arc::new(EmbeddingService::with_config(config.clone())?))
    }

    fn cross_encoder(
        &self,
        config: &RerankerConfig,
    ) -> Result<Arc<dyn CrossEncoder>, EmbeddingError> {
        Ok(Arc::new(RerankerService::with_config(config.clone())?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Embedder,
    VectorIndex,
    Corpus,
    LexicalIndex,
    Reranker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Ready,
    Unavailable,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentStatus {
    pub component: Component,
    pub state: ComponentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn ready(component: Component, message: impl Into<String>) -> Self {
        Self {
            component,
            state: ComponentState::Ready,
            message: Some(message.into()),
        }
    }

    fn unavailable(component: Component, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("{component:?} unavailable: {message}");
        Self {
            component,
            state: ComponentState::Unavailable,
            message: Some(message),
        }
    }

    fn disabled(component: Component) -> Self {
        Self {
            component,
            state: ComponentState::Disabled,
            message: None,
        }
    }
}

/// The retrieval engine plus what happened while building it
pub struct ServiceBootstrap {
    pub retrieval: Arc<HybridRetrieval>,
    pub statuses: Vec<ComponentStatus>,
}

impl ServiceBootstrap {
    /// Both retrievers loaded; the reranker is optional
    pub fn is_ready(&self) -> bool {
        self.retrieval.availability().can_retrieve()
    }

    /// Error naming the failed components when retrieval is unavailable
    pub fn ensure_ready(&self) -> anyhow::Result<()> {
        if self.is_ready() {
            return Ok(());
        }

        let failures: Vec<String> = self
            .statuses
            .iter()
            .filter(|status| status.state == ComponentState::Unavailable)
            .map(|status| {
                format!(
                    "{:?}: {}",
                    status.component,
                    status.message.as_deref().unwrap_or("unavailable")
                )
            })
            .collect();
        anyhow::bail!("retrieval unavailable at startup ({})", failures.join("; "))
    }
}

/// Load every dependency and assemble the retrieval engine.
///
/// Only an invalid retrieval configuration is an error here; dependency
/// failures are recorded in the returned statuses.
pub async fn initialize(
    settings: &Settings,
    models: Arc<dyn ModelProvider>,
) -> anyhow::Result<ServiceBootstrap> {
    let mut statuses = Vec::new();

    let embedder = {
        let models = Arc::clone(&models);
        let config = settings.embedding.clone();
        match tokio::task::spawn_blocking(move || models.embedder(&config)).await? {
            Ok(embedder) => {
                statuses.push(ComponentStatus::ready(
                    Component::Embedder,
                    format!("{:?}, dimension {}", settings.embedding.model, embedder.dimension()),
                ));
                Some(embedder)
            }
            Err(err) => {
                statuses.push(ComponentStatus::unavailable(Component::Embedder, err.to_string()));
                None
            }
        }
    };

    let store = match VectorStore::open(&settings.index.path).await {
        Ok(store) => {
            statuses.push(ComponentStatus::ready(
                Component::VectorIndex,
                format!("{} records at {}", store.count(), settings.index.path.display()),
            ));
            Some(Arc::new(store))
        }
        Err(err) => {
            statuses.push(ComponentStatus::unavailable(Component::VectorIndex, err.to_string()));
            None
        }
    };

    let corpus = match &store {
        Some(store) => {
            let (contents, metadatas) = store.list_all();
            let corpus = CorpusStore::from_index_contents(contents, metadatas);
            if corpus.is_empty() {
                statuses.push(ComponentStatus::unavailable(
                    Component::Corpus,
                    "no documents found in vector index",
                ));
                None
            } else {
                info!("Successfully loaded {} documents from vector index", corpus.len());
                statuses.push(ComponentStatus::ready(
                    Component::Corpus,
                    format!("{} documents", corpus.len()),
                ));
                Some(Arc::new(corpus))
            }
        }
        None => {
            statuses.push(ComponentStatus::unavailable(
                Component::Corpus,
                "vector index not loaded",
            ));
            None
        }
    };

    let semantic = match (&embedder, &store, &corpus) {
        (Some(embedder), Some(store), Some(_)) => {
            match SemanticRetriever::new(Arc::clone(embedder), Arc::clone(store)) {
                Ok(semantic) => Some(semantic),
                Err(err) => {
                    let status = ComponentStatus::unavailable(
                        Component::VectorIndex,
                        format!("index does not match embedder: {err}"),
                    );
                    match statuses
                        .iter_mut()
                        .find(|existing| existing.component == Component::VectorIndex)
                    {
                        Some(existing) => *existing = status,
                        None => statuses.push(status),
                    }
                    None
                }
            }
        }
        _ => None,
    };

    let lexical = match (&corpus, settings.index.tokenizer.build()) {
        (Some(corpus), Ok(tokenizer)) => {
            let lexical = LexicalRetriever::build(
                Arc::clone(corpus),
                tokenizer,
                settings.retrieval.bm25_k1,
                settings.retrieval.bm25_b,
            );
            statuses.push(ComponentStatus::ready(
                Component::LexicalIndex,
                format!(
                    "{} terms ({:?} tokenizer)",
                    lexical.term_count(),
                    settings.index.tokenizer
                ),
            ));
            Some(lexical)
        }
        (Some(_), Err(err)) => {
            statuses.push(ComponentStatus::unavailable(
                Component::LexicalIndex,
                err.to_string(),
            ));
            None
        }
        (None, _) => {
            statuses.push(ComponentStatus::unavailable(
                Component::LexicalIndex,
                "corpus not loaded",
            ));
            None
        }
    };

    let cross_encoder = if settings.reranker.enabled {
        let config = settings.reranker.model_config();
        let models = Arc::clone(&models);
        match tokio::task::spawn_blocking(move || models.cross_encoder(&config)).await? {
            Ok(cross_encoder) => {
                statuses.push(ComponentStatus::ready(
                    Component::Reranker,
                    format!("{:?}", settings.reranker.model),
                ));
                Some(cross_encoder)
            }
            Err(err) => {
                statuses.push(ComponentStatus::unavailable(Component::Reranker, err.to_string()));
                None
            }
        }
    } else {
        info!("Reranker disabled in configuration");
        statuses.push(ComponentStatus::disabled(Component::Reranker));
        None
    };

    let retrieval = HybridRetrieval::new(settings.retrieval.clone(), semantic, lexical, cross_encoder)?;
    let availability = retrieval.availability();
    if availability.can_retrieve() {
        info!("Retrieval ready: {availability:?}");
    } else {
        error!("Search services not properly initialized: {availability:?}");
    }

    Ok(ServiceBootstrap {
        retrieval: Arc::new(retrieval),
        statuses,
    })
}

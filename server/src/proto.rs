use crate::bootstrap::ComponentStatus;
use rag_retrieval::{Availability, SearchResults};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHit {
    pub content: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub documents: Vec<DocumentHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<SearchResults> for RetrieveResponse {
    fn from(results: SearchResults) -> Self {
        let warning = results.advisory().map(str::to_string);
        let documents = results
            .results
            .into_iter()
            .map(|result| DocumentHit {
                score: result.score.value(),
                content: result.document.content,
            })
            .collect();
        Self {
            documents,
            warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Retrieval and reranking loaded
    Ok,
    /// Retrieval works, results are not reranked
    Degraded,
    /// Queries are answered with 503
    Unavailable,
}

impl From<Availability> for ServiceStatus {
    fn from(availability: Availability) -> Self {
        if !availability.can_retrieve() {
            ServiceStatus::Unavailable
        } else if availability.rerank_ready {
            ServiceStatus::Ok
        } else {
            ServiceStatus::Degraded
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub availability: Availability,
    pub corpus_size: usize,
    pub components: Vec<ComponentStatus>,
}

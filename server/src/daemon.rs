use crate::bootstrap::{ComponentStatus, ServiceBootstrap};
use crate::proto::{HealthResponse, RetrieveRequest, RetrieveResponse, ServiceStatus};
use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use rag_retrieval::{Dependency, ErrorKind, HybridRetrieval, RetrievalError};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Message returned while required retrievers are missing
pub const UNAVAILABLE_MESSAGE: &str = "Search services not properly initialized";

#[derive(Clone)]
pub struct AppState {
    retrieval: Arc<HybridRetrieval>,
    statuses: Arc<Vec<ComponentStatus>>,
}

impl AppState {
    pub fn new(retrieval: Arc<HybridRetrieval>, statuses: Vec<ComponentStatus>) -> Self {
        Self {
            retrieval,
            statuses: Arc::new(statuses),
        }
    }
}

impl From<ServiceBootstrap> for AppState {
    fn from(bootstrap: ServiceBootstrap) -> Self {
        Self::new(bootstrap.retrieval, bootstrap.statuses)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/retrieve", post(retrieve_handler))
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("rag-server listening on {addr}");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let availability = state.retrieval.availability();
    Json(HealthResponse {
        status: ServiceStatus::from(availability),
        availability,
        corpus_size: state.retrieval.corpus_size(),
        components: state.statuses.as_ref().clone(),
    })
}

async fn retrieve_handler(
    State(state): State<AppState>,
    payload: Result<Json<RetrieveRequest>, JsonRejection>,
) -> Result<Json<RetrieveResponse>, AppError> {
    let Json(request) = payload.map_err(AppError::bad_request)?;

    let results = state.retrieval.search(&request.query).await?;
    if !results.is_empty() {
        info!("Returning {} documents", results.len());
    }

    Ok(Json(RetrieveResponse::from(results)))
}

#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
    unavailable: Vec<Dependency>,
}

impl AppError {
    fn bad_request(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
            unavailable: Vec::new(),
        }
    }

    fn unavailable(dependencies: Vec<Dependency>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: UNAVAILABLE_MESSAGE.to_string(),
            unavailable: dependencies,
        }
    }

    fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
            unavailable: Vec::new(),
        }
    }
}

impl From<RetrievalError> for AppError {
    fn from(err: RetrievalError) -> Self {
        match (err.kind(), err) {
            (_, RetrievalError::Unavailable(dependencies)) => {
                error!("{UNAVAILABLE_MESSAGE}: {dependencies:?}");
                AppError::unavailable(dependencies)
            }
            (ErrorKind::InvalidRequest, err) => {
                warn!("Rejected query: {err}");
                AppError::bad_request(err)
            }
            (_, err) => {
                error!("Error processing request: {err}");
                AppError::internal(err)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = if self.unavailable.is_empty() {
            serde_json::json!({ "error": self.message })
        } else {
            serde_json::json!({ "error": self.message, "unavailable": self.unavailable })
        };
        (self.status, Json(body)).into_response()
    }
}

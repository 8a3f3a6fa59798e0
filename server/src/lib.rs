//! HTTP front end for hybrid passage retrieval.
//!
//! [`bootstrap::initialize`] loads the models, the vector index and the
//! lexical index once; [`daemon::serve`] then answers `POST /retrieve` and
//! `GET /health` from that read-only state.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod proto;

pub use bootstrap::{FastembedModels, ModelProvider, ServiceBootstrap};
pub use cli::Cli;
pub use config::Settings;
pub use daemon::{AppState, create_router, serve};

use crate::config::Settings;
use clap::Parser;
use std::path::PathBuf;

/// Hybrid semantic + lexical passage retrieval over HTTP
#[derive(Debug, Parser)]
#[command(name = "rag-server", version)]
pub struct Cli {
    /// TOML settings file
    #[arg(long, short = 'c', env = "RAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "RAG_HOST")]
    pub host: Option<String>,

    /// Port to bind
    #[arg(long, short = 'p', env = "RAG_PORT")]
    pub port: Option<u16>,

    /// Vector index file
    #[arg(long, env = "RAG_INDEX_PATH")]
    pub index_path: Option<PathBuf>,

    /// Exit when retrieval is unavailable at startup
    #[arg(long)]
    pub fail_fast: bool,

    /// Skip loading the cross-encoder
    #[arg(long)]
    pub no_rerank: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Flags win over file values
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(index_path) = &self.index_path {
            settings.index.path = index_path.clone();
        }
        if self.fail_fast {
            settings.startup.fail_fast = true;
        }
        if self.no_rerank {
            settings.reranker.enabled = false;
        }
    }
}

use anyhow::Context;
use clap::Parser;
use rag_server::{AppState, Cli, FastembedModels, Settings, bootstrap, serve};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so `.env` can feed the RAG_* flag fallbacks.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_tracing(cli.log_json);
    tracing::info!("Starting rag-server v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply(&mut settings);
    settings.validate()?;

    let bootstrap = bootstrap::initialize(&settings, Arc::new(FastembedModels)).await?;
    if settings.startup.fail_fast {
        bootstrap.ensure_ready()?;
    }

    let addr = (settings.server.host.as_str(), settings.server.port);
    let listener = TcpListener::bind(addr).await.with_context(|| {
        format!(
            "failed to bind {}:{}",
            settings.server.host, settings.server.port
        )
    })?;

    serve(listener, AppState::from(bootstrap), shutdown_signal()).await
}

/// `info` unless RUST_LOG says otherwise; `log` records from the library
/// crates are forwarded into the same subscriber.
fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

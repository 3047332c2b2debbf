//! Crossrank HTTP server entrypoint.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use crossrank::config::Config;
use crossrank::gateway::{HandlerState, create_router_with_state};
use crossrank::host::{ModelHost, ModelSlot};
use crossrank::model::device::configure_threads;
use crossrank::model::{Reranker, RerankerConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    // Must happen before any runtime or compute pool spawns threads.
    configure_threads(config.threads);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let result = runtime.block_on(serve(config));
    // A hub download may still be running on the blocking pool; don't wait for it.
    runtime.shutdown_background();
    result
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        threads = config.threads,
        model_id = %config.reranker.model_id,
        "Crossrank starting"
    );

    if config.reranker.stub {
        tracing::warn!("RERANK_STUB_MODEL set, serving the lexical stub encoder");
    }

    let state = HandlerState::<Reranker>::pending(config.reranker.model_id.clone());
    let model_load = load_model(state.host.clone(), config.reranker.clone());
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        loaded = model_load => {
            loaded?;
            server.await?;
        }
    }

    tracing::info!("Crossrank shutdown complete");
    Ok(())
}

/// Loads the model on a blocking worker and publishes it into `slot`.
async fn load_model(slot: ModelSlot<Reranker>, config: RerankerConfig) -> anyhow::Result<()> {
    tracing::info!(model_id = %config.model_id, "Loading cross-encoder");

    let host = tokio::task::spawn_blocking(move || ModelHost::load(config))
        .await
        .context("model loading task failed")?
        .context("failed to load cross-encoder")?;

    if slot.install(host).is_err() {
        tracing::warn!("Model host was already installed; keeping the existing one");
    }

    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.trim().parse::<u16>().ok())
        .unwrap_or(crossrank::constants::DEFAULT_PORT);

    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

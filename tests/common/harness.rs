//! Test server harness.

use crossrank::gateway::{HandlerState, create_router_with_state};
use crossrank::host::{ModelHost, ModelSlot};
use crossrank::model::{CrossEncoder, MockCrossEncoder, Reranker};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
const TEST_THREADS: usize = 2;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    /// When false the server starts with an empty model slot.
    pub start_ready: bool,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            start_ready: true,
        }
    }
}

impl TestServerConfig {
    pub fn pending() -> Self {
        Self {
            start_ready: false,
            ..Default::default()
        }
    }
}

pub struct TestServer<E: CrossEncoder> {
    pub addr: SocketAddr,
    pub slot: ModelSlot<E>,
    server_handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl<E: CrossEncoder> TestServer<E> {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Publishes a host into a server started with [`TestServerConfig::pending`].
    pub fn install(&self, encoder: E) {
        let _ = self.slot.install(ModelHost::new(encoder, TEST_THREADS));
    }

    /// Signals shutdown and waits for the server task to drain.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
    }
}

impl<E: CrossEncoder> Drop for TestServer<E> {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(interval).await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Failed to bind to port: {0}")]
    BindFailed(#[from] std::io::Error),

    #[error("Server startup timed out")]
    Timeout,

    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server backed by the lexical stub encoder.
pub async fn spawn_test_server(
    config: TestServerConfig,
) -> Result<TestServer<Reranker>, ServerStartupError> {
    let state = if config.start_ready {
        let reranker =
            Reranker::stub().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
        HandlerState::ready(ModelHost::new(reranker, TEST_THREADS))
    } else {
        HandlerState::pending(crossrank::constants::STUB_MODEL_ID)
    };

    spawn_server_with_state(config.port, state).await
}

/// Spawns a server backed by a scripted mock encoder.
pub async fn spawn_mock_server(
    encoder: MockCrossEncoder,
) -> Result<TestServer<MockCrossEncoder>, ServerStartupError> {
    let state = HandlerState::ready(ModelHost::new(encoder, TEST_THREADS));
    spawn_server_with_state(0, state).await
}

pub async fn spawn_server_with_state<E: CrossEncoder>(
    port: u16,
    state: HandlerState<E>,
) -> Result<TestServer<E>, ServerStartupError> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    let local_addr = listener.local_addr()?;

    let slot = state.host.clone();
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        slot,
        server_handle: Some(server_handle),
        shutdown_tx: Some(shutdown_tx),
    })
}

//! HTTP gateway (Axum) for reranking and health.
//!
//! Used by the `crossrank` binary and by the integration tests.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use handler::{rerank_handler, rerank_simple_handler, score_handler};
pub use payload::{
    HealthResponse, RerankRequest, RerankResponse, RootResponse, ScoreResponse,
    SimpleRerankResponse,
};
pub use state::HandlerState;

use crate::constants::MAX_REQUEST_BODY_BYTES;
use crate::model::CrossEncoder;

/// Response header carrying a short machine-readable outcome.
pub const RERANK_STATUS_HEADER: &str = "x-rerank-status";
pub const RERANK_STATUS_READY: &str = "ready";
pub const RERANK_STATUS_NOT_READY: &str = "not_ready";

pub fn create_router_with_state<E: CrossEncoder>(state: HandlerState<E>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/rerank", post(rerank_handler))
        .route("/rerank/simple", post(rerank_simple_handler))
        .route("/score", post(score_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tracing::instrument(skip(state))]
pub async fn root_handler<E: CrossEncoder>(State(state): State<HandlerState<E>>) -> Response {
    let host = state.host.get();

    Json(RootResponse {
        status: "healthy".to_string(),
        model: state.model_id.clone(),
        device: host.as_ref().map(|h| h.device().to_string()),
        ready: host.is_some(),
    })
    .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn health_handler<E: CrossEncoder>(State(state): State<HandlerState<E>>) -> Response {
    let Some(host) = state.host.get() else {
        return ApiError::ModelNotReady.into_response();
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        RERANK_STATUS_HEADER,
        HeaderValue::from_static(RERANK_STATUS_READY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: RERANK_STATUS_READY.to_string(),
            model_loaded: true,
            device: host.device().to_string(),
            threads: host.threads(),
        }),
    )
        .into_response()
}

//! Crossrank library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Configuration
//! - [`Config`], [`ConfigError`] - Environment-backed server configuration
//!
//! ## Model
//! - [`CrossEncoder`] - Seam between the HTTP layer and the forward pass
//! - [`Reranker`], [`RerankerConfig`], [`RerankerError`] - Candle-backed cross-encoder
//! - [`ModelHost`], [`ModelSlot`] - The load-once model and its readiness cell
//!
//! ## Scoring
//! - [`compute_scores`], [`rank_documents`], [`rank_indices`] - Score, sort, truncate
//! - [`RerankResult`], [`ScoringError`]
//!
//! ## HTTP
//! - [`create_router_with_state`], [`HandlerState`] - The axum router
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod gateway;
pub mod host;
pub mod model;
pub mod scoring;

pub use config::{Config, ConfigError};
pub use constants::{
    DEFAULT_MODEL_ID, DEFAULT_SIMPLE_TOP_K, MAX_DOCUMENTS, MAX_REQUEST_BODY_BYTES, MAX_SEQ_LEN,
    STUB_MODEL_ID,
};
pub use gateway::{
    ApiError, ErrorResponse, HandlerState, RERANK_STATUS_HEADER, RERANK_STATUS_NOT_READY,
    RERANK_STATUS_READY, create_router_with_state,
};
pub use host::{ModelHost, ModelSlot};
#[cfg(any(test, feature = "mock"))]
pub use model::MockCrossEncoder;
pub use model::{Architecture, CrossEncoder, Reranker, RerankerConfig, RerankerError};
pub use scoring::{
    RankedIndex, RerankResult, ScoringError, compute_scores, rank_documents, rank_indices,
    sigmoid,
};

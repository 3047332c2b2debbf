use serde::{Deserialize, Serialize};

pub use crate::scoring::RerankResult;

fn default_true() -> bool {
    true
}

/// Body of `POST /rerank`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankRequest {
    pub query: String,
    pub documents: Vec<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
    /// `null` and absent both mean "normalize".
    #[serde(default)]
    pub normalize: Option<bool>,
}

impl RerankRequest {
    pub fn normalize(&self) -> bool {
        self.normalize.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankResponse {
    pub query: String,
    pub results: Vec<RerankResult>,
    pub processing_time_ms: f64,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleRerankResponse {
    pub top_k_indices: Vec<usize>,
    pub top_k_scores: Vec<f64>,
    pub processing_time_ms: f64,
}

/// Query parameters of `POST /score`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreParams {
    pub query: String,
    pub document: String,
    #[serde(default = "default_true")]
    pub normalize: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub query: String,
    pub document: String,
    pub score: f64,
    pub processing_time_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub model: String,
    pub device: Option<String>,
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub device: String,
    pub threads: usize,
}

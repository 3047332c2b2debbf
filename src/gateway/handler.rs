use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{BytesRejection, JsonRejection, QueryRejection},
    },
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

use crate::constants::DEFAULT_SIMPLE_TOP_K;
use crate::gateway::error::ApiError;
use crate::gateway::payload::{
    RerankRequest, RerankResponse, ScoreParams, ScoreResponse, SimpleRerankResponse,
};
use crate::gateway::state::HandlerState;
use crate::host::ModelHost;
use crate::model::CrossEncoder;
use crate::scoring::{
    ScoringError, compute_scores, rank_documents, rank_indices, validate_documents,
    validate_top_k,
};

#[instrument(skip(state, request), fields(num_documents = tracing::field::Empty))]
pub async fn rerank_handler<E: CrossEncoder>(
    State(state): State<HandlerState<E>>,
    request: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<RerankResponse>, ApiError> {
    let Json(request) = request?;
    let request: RerankRequest = serde_json::from_value(request)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    tracing::Span::current().record("num_documents", request.documents.len());

    let host = ready_host(&state)?;
    validate_documents(&request.documents)?;
    validate_top_k(request.top_k)?;

    let started = Instant::now();
    let normalize = request.normalize();
    let top_k = request.top_k;
    let num_documents = request.documents.len();

    let (query, documents, scores) =
        score_on_worker(host, request.query, request.documents, normalize).await?;
    let results = rank_documents(documents, &scores, top_k);

    let processing_time_ms = elapsed_ms(started);
    info!(
        num_documents,
        processing_time_ms,
        top_k = ?top_k,
        "Reranked {} docs in {:.2}ms",
        num_documents,
        processing_time_ms
    );

    Ok(Json(RerankResponse {
        query,
        results,
        processing_time_ms,
        model: state.model_id.clone(),
    }))
}

#[derive(Debug, Default)]
struct SimpleParams {
    query: Option<String>,
    documents: Vec<String>,
    top_k: Option<usize>,
}

fn parse_simple_params(pairs: Vec<(String, String)>) -> Result<SimpleParams, ApiError> {
    let mut params = SimpleParams::default();

    for (key, value) in pairs {
        match key.as_str() {
            "query" => params.query = Some(value),
            "documents" | "documents[]" => params.documents.push(value),
            "top_k" => {
                let top_k = value.trim().parse::<usize>().map_err(|_| {
                    ApiError::InvalidRequest(format!("invalid top_k '{}'", value))
                })?;
                params.top_k = Some(top_k);
            }
            _ => {}
        }
    }

    Ok(params)
}

/// Documents come from repeated `documents` query parameters; a JSON array
/// body is accepted when none are given.
#[instrument(skip(state, params, body), fields(num_documents = tracing::field::Empty))]
pub async fn rerank_simple_handler<E: CrossEncoder>(
    State(state): State<HandlerState<E>>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SimpleRerankResponse>, ApiError> {
    let Query(pairs) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let params = parse_simple_params(pairs)?;
    let body = body?;

    let query = params
        .query
        .ok_or_else(|| ApiError::InvalidRequest("missing query parameter 'query'".to_string()))?;

    let documents = if params.documents.is_empty() && !body.is_empty() {
        serde_json::from_slice::<Vec<String>>(&body).map_err(|e| {
            ApiError::InvalidRequest(format!("body must be a JSON array of strings: {}", e))
        })?
    } else {
        params.documents
    };
    tracing::Span::current().record("num_documents", documents.len());

    let host = ready_host(&state)?;
    validate_documents(&documents)?;
    let top_k = params.top_k.unwrap_or(DEFAULT_SIMPLE_TOP_K);
    validate_top_k(Some(top_k))?;

    let started = Instant::now();
    let (_, _, scores) = score_on_worker(host, query, documents, true).await?;
    let ranked = rank_indices(&scores, Some(top_k));

    let processing_time_ms = elapsed_ms(started);
    debug!(
        num_documents = scores.len(),
        top_k,
        processing_time_ms,
        "Simple rerank complete"
    );

    Ok(Json(SimpleRerankResponse {
        top_k_indices: ranked.iter().map(|r| r.index).collect(),
        top_k_scores: ranked.iter().map(|r| r.score).collect(),
        processing_time_ms,
    }))
}

#[instrument(skip(state, params))]
pub async fn score_handler<E: CrossEncoder>(
    State(state): State<HandlerState<E>>,
    params: Result<Query<ScoreParams>, QueryRejection>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let host = ready_host(&state)?;

    let started = Instant::now();
    let (query, mut documents, scores) =
        score_on_worker(host, params.query, vec![params.document], params.normalize).await?;

    let score = scores
        .first()
        .copied()
        .ok_or_else(|| ApiError::InternalError("model returned no score".to_string()))?;
    let document = documents.pop().unwrap_or_default();

    Ok(Json(ScoreResponse {
        query,
        document,
        score,
        processing_time_ms: elapsed_ms(started),
    }))
}

fn ready_host<E: CrossEncoder>(state: &HandlerState<E>) -> Result<Arc<ModelHost<E>>, ApiError> {
    state.host.get().ok_or_else(|| {
        debug!("Scoring request received before model host is ready");
        ApiError::ModelNotReady
    })
}

/// Runs the forward pass on the blocking pool and hands the inputs back.
async fn score_on_worker<E: CrossEncoder>(
    host: Arc<ModelHost<E>>,
    query: String,
    documents: Vec<String>,
    normalize: bool,
) -> Result<(String, Vec<String>, Vec<f64>), ApiError> {
    let outcome = tokio::task::spawn_blocking(move || {
        let scores = compute_scores(host.encoder(), &query, &documents, normalize)?;
        Ok::<_, ScoringError>((query, documents, scores))
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Scoring worker terminated abnormally");
        ApiError::InternalError(format!("scoring worker failed: {}", e))
    })?;

    outcome.map_err(|e| {
        if !e.is_client_error() {
            error!(error = %e, "Error during reranking");
        }
        ApiError::from(e)
    })
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

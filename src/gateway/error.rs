use axum::{
    Json,
    extract::rejection::{BytesRejection, JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::{RERANK_STATUS_HEADER, RERANK_STATUS_NOT_READY};
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Model not loaded yet")]
    ModelNotReady,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Reranking failed: {0}")]
    ScoringFailed(ScoringError),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::InvalidInput { reason } => ApiError::InvalidRequest(reason),
            other => ApiError::ScoringFailed(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl ApiError {
    /// Body-limit rejections keep their 413; everything else is a bad request.
    fn from_rejection(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(message)
        } else {
            ApiError::InvalidRequest(message)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ModelNotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ScoringFailed(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn status_tag(&self) -> &'static str {
        match self {
            ApiError::ModelNotReady => RERANK_STATUS_NOT_READY,
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::ScoringFailed(_) => "scoring_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut headers = HeaderMap::new();
        headers.insert(
            RERANK_STATUS_HEADER,
            HeaderValue::from_static(self.status_tag()),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}

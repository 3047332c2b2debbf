use thiserror::Error;

use crate::model::RerankerError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("tokenization failed: {reason}")]
    Tokenization { reason: String },

    #[error("inference failed: {reason}")]
    Inference { reason: String },

    #[error("reranker error: {0}")]
    Reranker(RerankerError),
}

impl ScoringError {
    /// `true` when the caller can fix the failure by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScoringError::InvalidInput { .. })
    }
}

impl From<RerankerError> for ScoringError {
    fn from(err: RerankerError) -> Self {
        match err {
            RerankerError::TokenizationFailed { reason } => ScoringError::Tokenization { reason },
            RerankerError::InferenceFailed { reason } => ScoringError::Inference { reason },
            other => ScoringError::Reranker(other),
        }
    }
}

//! Scriptable [`CrossEncoder`] for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::reranker::{CrossEncoder, RerankerError};

#[derive(Debug, Clone)]
enum Behavior {
    /// Logit `i` is `logits[i % logits.len()]`.
    Logits(Vec<f32>),
    TokenizationFailure(String),
    InferenceFailure(String),
    /// Returns one logit fewer than requested.
    ShortOutput,
}

#[derive(Debug)]
pub struct MockCrossEncoder {
    model_id: String,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockCrossEncoder {
    fn new(behavior: Behavior) -> Self {
        Self {
            model_id: "mock/cross-encoder".to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_logits(logits: Vec<f32>) -> Self {
        assert!(!logits.is_empty(), "mock needs at least one logit");
        Self::new(Behavior::Logits(logits))
    }

    pub fn constant(logit: f32) -> Self {
        Self::new(Behavior::Logits(vec![logit]))
    }

    pub fn failing_tokenization(reason: impl Into<String>) -> Self {
        Self::new(Behavior::TokenizationFailure(reason.into()))
    }

    pub fn failing_inference(reason: impl Into<String>) -> Self {
        Self::new(Behavior::InferenceFailure(reason.into()))
    }

    pub fn short_output() -> Self {
        Self::new(Behavior::ShortOutput)
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Number of `predict` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CrossEncoder for MockCrossEncoder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn device_label(&self) -> String {
        "cpu".to_string()
    }

    fn predict(&self, _query: &str, documents: &[String]) -> Result<Vec<f32>, RerankerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            Behavior::Logits(logits) => Ok((0..documents.len())
                .map(|i| logits[i % logits.len()])
                .collect()),
            Behavior::TokenizationFailure(reason) => Err(RerankerError::TokenizationFailed {
                reason: reason.clone(),
            }),
            Behavior::InferenceFailure(reason) => Err(RerankerError::InferenceFailed {
                reason: reason.clone(),
            }),
            Behavior::ShortOutput => Ok(vec![0.0; documents.len().saturating_sub(1)]),
        }
    }
}

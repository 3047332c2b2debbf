//! Cross-encoder model layer.
//!
//! - [`loader`] resolves weights from the hub or a local directory.
//! - [`classifier`] picks the architecture from `config.json`.
//! - [`reranker`] turns `(query, document)` pairs into logits.

/// BERT classifier used for BERT/RoBERTa-style cross-encoders.
pub mod bert;
/// Architecture detection and dispatch.
pub mod classifier;
/// Device selection (CPU / Metal / CUDA) and thread pinning.
pub mod device;
/// Model file resolution and tokenizer setup.
pub mod loader;
/// Cross-encoder reranker.
pub mod reranker;

pub use classifier::{Architecture, SequenceClassifier};
pub use reranker::{CrossEncoder, Reranker, RerankerConfig, RerankerError};

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockCrossEncoder;

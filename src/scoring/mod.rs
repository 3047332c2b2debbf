//! Relevance scoring and ranking.
//!
//! [`compute_scores`] runs a [`CrossEncoder`](crate::model::CrossEncoder) over a
//! query and its candidate documents and optionally squashes the logits into
//! `(0, 1)`. [`rank_documents`] and [`rank_indices`] turn those scores into the
//! descending, tie-stable order the HTTP layer returns.

pub mod error;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use scorer::{
    compute_scores, rank_documents, rank_indices, sigmoid, validate_documents, validate_top_k,
};
pub use types::{RankedIndex, RerankResult};

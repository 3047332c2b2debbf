use std::cmp::Ordering;
use tracing::debug;

use crate::constants::MAX_DOCUMENTS;
use crate::model::CrossEncoder;

use super::error::ScoringError;
use super::types::{RankedIndex, RerankResult};

/// Logistic function `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Rejects empty document lists and lists over [`MAX_DOCUMENTS`].
pub fn validate_documents(documents: &[String]) -> Result<(), ScoringError> {
    if documents.is_empty() {
        return Err(ScoringError::InvalidInput {
            reason: "No documents provided".to_string(),
        });
    }

    if documents.len() > MAX_DOCUMENTS {
        return Err(ScoringError::InvalidInput {
            reason: format!(
                "Too many documents ({}). Maximum {} per request",
                documents.len(),
                MAX_DOCUMENTS
            ),
        });
    }

    Ok(())
}

/// Rejects `top_k == 0`.
pub fn validate_top_k(top_k: Option<usize>) -> Result<(), ScoringError> {
    if top_k == Some(0) {
        return Err(ScoringError::InvalidInput {
            reason: "top_k must be a positive integer".to_string(),
        });
    }
    Ok(())
}

/// Scores every `(query, document)` pair with one batched forward pass.
///
/// Output order matches `documents`. With `normalize`, every logit goes
/// through [`sigmoid`]; otherwise raw logits are returned.
pub fn compute_scores<E>(
    encoder: &E,
    query: &str,
    documents: &[String],
    normalize: bool,
) -> Result<Vec<f64>, ScoringError>
where
    E: CrossEncoder + ?Sized,
{
    validate_documents(documents)?;

    let logits = encoder.predict(query, documents)?;

    if logits.len() != documents.len() {
        return Err(ScoringError::Inference {
            reason: format!(
                "expected {} scores, model produced {}",
                documents.len(),
                logits.len()
            ),
        });
    }

    let scores: Vec<f64> = logits
        .into_iter()
        .map(|logit| {
            let logit = f64::from(logit);
            if normalize { sigmoid(logit) } else { logit }
        })
        .collect();

    debug!(
        num_documents = documents.len(),
        normalize,
        top_score = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        "Computed relevance scores"
    );

    Ok(scores)
}

/// Total order, highest first, with `-0.0` and `0.0` comparing equal.
fn descending(a: f64, b: f64) -> Ordering {
    fold_signed_zero(b).total_cmp(&fold_signed_zero(a))
}

fn fold_signed_zero(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x }
}

/// Orders indices by score, highest first, keeping input order among ties,
/// then keeps the first `top_k`.
pub fn rank_indices(scores: &[f64], top_k: Option<usize>) -> Vec<RankedIndex> {
    let mut ranked: Vec<RankedIndex> = scores
        .iter()
        .enumerate()
        .map(|(index, &score)| RankedIndex { index, score })
        .collect();

    // `sort_by` is stable, which is what keeps equal scores in input order.
    ranked.sort_by(|a, b| descending(a.score, b.score));

    if let Some(k) = top_k {
        ranked.truncate(k);
    }

    ranked
}

/// Pairs documents with their scores and ranks them like [`rank_indices`].
pub fn rank_documents(
    documents: Vec<String>,
    scores: &[f64],
    top_k: Option<usize>,
) -> Vec<RerankResult> {
    let mut results: Vec<RerankResult> = documents
        .into_iter()
        .zip(scores.iter().copied())
        .enumerate()
        .map(|(index, (document, score))| RerankResult::new(index, document, score))
        .collect();

    results.sort_by(|a, b| descending(a.score, b.score));

    if let Some(k) = top_k {
        results.truncate(k);
    }

    results
}

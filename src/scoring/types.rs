use serde::{Deserialize, Serialize};

/// One input document with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    /// Position of the document in the request's `documents` list.
    pub index: usize,
    pub document: String,
    pub score: f64,
}

impl RerankResult {
    pub fn new(index: usize, document: String, score: f64) -> Self {
        Self {
            index,
            document,
            score,
        }
    }
}

/// Index/score pair used where document text is not echoed back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedIndex {
    pub index: usize,
    pub score: f64,
}

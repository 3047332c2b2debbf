pub mod config;
pub mod error;


pub use config::RerankerConfig;
pub use error::RerankerError;

use candle_core::{Device, Tensor};
use std::time::Instant;
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use crate::model::classifier::{Architecture, SequenceClassifier};
use crate::model::device::{device_label, select_device};
use crate::model::loader::{ModelFiles, load_pair_tokenizer};

/// Anything that turns `(query, document)` pairs into relevance logits.
///
/// Implementations must return exactly one logit per document, in input order,
/// and must be safe to call concurrently from several blocking workers.
pub trait CrossEncoder: Send + Sync + 'static {
    /// Identifier reported to clients.
    fn model_id(&self) -> &str;

    /// Compute device label (`cpu`, `cuda:0`, ...).
    fn device_label(&self) -> String;

    /// Scores every `(query, documents[i])` pair in one batch, returning raw logits.
    fn predict(&self, query: &str, documents: &[String]) -> Result<Vec<f32>, RerankerError>;
}

pub struct Reranker {
    device: Device,
    config: RerankerConfig,
    model: Option<SequenceClassifier>,
    tokenizer: Option<Tokenizer>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &device_label(&self.device))
            .field("config", &self.config)
            .field("architecture", &self.architecture())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for reranker");

        if config.stub {
            info!("Reranker running in stub mode (lexical overlap scores)");
            return Ok(Self {
                device,
                config,
                model: None,
                tokenizer: None,
            });
        }

        let started = Instant::now();
        let files = ModelFiles::resolve(&config)?;

        info!(
            model_id = %config.model_id,
            weights = %files.weights.display(),
            "Loading reranker model"
        );

        let config_json = std::fs::read_to_string(&files.config)?;
        let model = SequenceClassifier::load(&config_json, &files.weights, &device)?;
        let tokenizer = load_pair_tokenizer(&files.tokenizer, config.max_seq_len)?;

        info!(
            model_id = %config.model_id,
            architecture = ?model.architecture(),
            device = %device_label(&device),
            load_ms = started.elapsed().as_millis() as u64,
            "Reranker model loaded successfully"
        );

        Ok(Self {
            device,
            config,
            model: Some(model),
            tokenizer: Some(tokenizer),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn architecture(&self) -> Option<Architecture> {
        self.model.as_ref().map(SequenceClassifier::architecture)
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn forward_batch(
        &self,
        model: &SequenceClassifier,
        tokenizer: &Tokenizer,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<f32>, RerankerError> {
        let pairs: Vec<(&str, &str)> = documents
            .iter()
            .map(|document| (query, document.as_str()))
            .collect();

        let encodings = tokenizer.encode_batch(pairs, true).map_err(|e| {
            RerankerError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let input_ids = stack_rows(&encodings, Encoding::get_ids, &self.device)?;
        let token_type_ids = stack_rows(&encodings, Encoding::get_type_ids, &self.device)?;
        let attention_mask = stack_rows(&encodings, Encoding::get_attention_mask, &self.device)?;

        debug!(
            batch = encodings.len(),
            seq_len = input_ids.dim(1).unwrap_or(0),
            "Running cross-encoder forward pass"
        );

        let logits = model.logits(&input_ids, &token_type_ids, &attention_mask)?;

        if logits.len() != documents.len() {
            return Err(RerankerError::InferenceFailed {
                reason: format!(
                    "model returned {} logits for {} pairs",
                    logits.len(),
                    documents.len()
                ),
            });
        }

        Ok(logits)
    }

    fn placeholder_logit(&self, query: &str, candidate: &str) -> f32 {
        use std::collections::HashSet;

        let stop_words: HashSet<&str> = [
            "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has",
            "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
            "shall", "can", "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with",
            "at", "by", "from", "as", "into", "through", "during", "before", "after", "above",
            "below", "between", "under", "again", "further", "then", "once", "here", "there",
            "when", "where", "why", "how", "all", "each", "few", "more", "most", "other", "some",
            "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "just",
            "and", "but", "if", "or", "because", "until", "while", "what", "which", "who", "whom",
            "this", "that", "these", "those", "am", "it", "its",
        ]
        .into_iter()
        .collect();

        let query_lower = query.to_lowercase();
        let query_words: HashSet<&str> = query_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !stop_words.contains(w))
            .collect();

        let candidate_lower = candidate.to_lowercase();
        let candidate_words: HashSet<&str> = candidate_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !stop_words.contains(w))
            .collect();

        let base_score = if query_words.is_empty() {
            let len_ratio = (query.len().min(candidate.len()) as f32)
                / (query.len().max(candidate.len()).max(1) as f32);
            len_ratio * 0.3
        } else {
            let matches = query_words.intersection(&candidate_words).count();
            let recall = matches as f32 / query_words.len() as f32;

            let union = query_words.union(&candidate_words).count();
            let jaccard = if union > 0 {
                matches as f32 / union as f32
            } else {
                0.0
            };

            0.6 * recall + 0.4 * jaccard
        };

        // Centered so that sigmoid(logit) reproduces the familiar 0..1 overlap curve.
        8.0 * (base_score - 0.5)
    }
}

impl CrossEncoder for Reranker {
    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn device_label(&self) -> String {
        device_label(&self.device)
    }

    fn predict(&self, query: &str, documents: &[String]) -> Result<Vec<f32>, RerankerError> {
        debug!(
            query_len = query.len(),
            num_documents = documents.len(),
            model_loaded = self.is_model_loaded(),
            "Scoring query-document pairs"
        );

        if documents.is_empty() {
            return Ok(Vec::new());
        }

        if let (Some(model), Some(tokenizer)) = (&self.model, &self.tokenizer) {
            return self.forward_batch(model, tokenizer, query, documents);
        }

        Ok(documents
            .iter()
            .map(|document| self.placeholder_logit(query, document))
            .collect())
    }
}

fn stack_rows(
    encodings: &[Encoding],
    field: fn(&Encoding) -> &[u32],
    device: &Device,
) -> Result<Tensor, RerankerError> {
    let rows = encodings
        .iter()
        .map(|encoding| Tensor::new(field(encoding), device))
        .collect::<candle_core::Result<Vec<_>>>()?;
    Ok(Tensor::stack(&rows, 0)?)
}

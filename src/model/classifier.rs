//! Architecture dispatch for sequence-classification cross-encoders.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{
    Config as XlmRobertaConfig, XLMRobertaForSequenceClassification,
};
use std::path::Path;
use tracing::debug;

use super::bert::BertCrossEncoder;
use super::reranker::RerankerError;

/// Architectures the service knows how to run, keyed by `config.json`'s `model_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Bert,
    XlmRoberta,
}

impl Architecture {
    pub fn from_model_type(model_type: &str) -> Result<Self, RerankerError> {
        match model_type {
            "bert" | "roberta" => Ok(Self::Bert),
            "xlm-roberta" | "xlm_roberta" => Ok(Self::XlmRoberta),
            other => Err(RerankerError::UnsupportedArchitecture {
                model_type: other.to_string(),
            }),
        }
    }

    /// Reads `model_type` out of a raw `config.json` document.
    pub fn detect(config_json: &str) -> Result<Self, RerankerError> {
        let value: serde_json::Value =
            serde_json::from_str(config_json).map_err(|e| RerankerError::ModelLoadFailed {
                reason: format!("Failed to parse config.json: {}", e),
            })?;

        let model_type = value
            .get("model_type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RerankerError::ModelLoadFailed {
                reason: "config.json has no model_type".to_string(),
            })?;

        Self::from_model_type(model_type)
    }
}

/// A loaded classifier producing one relevance logit per input row.
pub enum SequenceClassifier {
    Bert(BertCrossEncoder),
    XlmRoberta(XLMRobertaForSequenceClassification),
}

impl SequenceClassifier {
    pub fn load(
        config_json: &str,
        weights_path: &Path,
        device: &Device,
    ) -> Result<Self, RerankerError> {
        let architecture = Architecture::detect(config_json)?;
        debug!(?architecture, weights = %weights_path.display(), "Loading classifier weights");

        match architecture {
            Architecture::Bert => {
                let model = BertCrossEncoder::load(config_json, weights_path, device)
                    .map_err(load_failed)?;
                Ok(Self::Bert(model))
            }
            Architecture::XlmRoberta => {
                let config: XlmRobertaConfig = serde_json::from_str(config_json).map_err(|e| {
                    RerankerError::ModelLoadFailed {
                        reason: format!("Failed to parse XLM-RoBERTa config: {}", e),
                    }
                })?;

                // SAFETY: the safetensors file is memory-mapped read-only and is
                // not modified while the model is alive.
                let vb = unsafe {
                    VarBuilder::from_mmaped_safetensors(
                        &[weights_path.to_path_buf()],
                        DType::F32,
                        device,
                    )
                    .map_err(load_failed)?
                };

                let model =
                    XLMRobertaForSequenceClassification::new(1, &config, vb).map_err(load_failed)?;
                Ok(Self::XlmRoberta(model))
            }
        }
    }

    pub fn architecture(&self) -> Architecture {
        match self {
            Self::Bert(_) => Architecture::Bert,
            Self::XlmRoberta(_) => Architecture::XlmRoberta,
        }
    }

    /// Runs one forward pass and returns the logits flattened to `batch` values.
    pub fn logits(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Vec<f32>, RerankerError> {
        let logits = match self {
            Self::Bert(model) => model.forward(input_ids, token_type_ids, attention_mask)?,
            Self::XlmRoberta(model) => {
                model.forward(input_ids, attention_mask, token_type_ids)?
            }
        };

        let logits = logits.to_dtype(DType::F32)?.flatten_all()?.to_vec1::<f32>()?;
        Ok(logits)
    }
}

fn load_failed(err: candle_core::Error) -> RerankerError {
    RerankerError::ModelLoadFailed {
        reason: format!("Failed to load classifier weights: {}", err),
    }
}

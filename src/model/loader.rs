//! Resolving model files (hub or local directory) and preparing the tokenizer.

use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use std::path::{Path, PathBuf};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::reranker::{RerankerConfig, RerankerError};

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// Paths to everything needed to instantiate a cross-encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    pub fn resolve(config: &RerankerConfig) -> Result<Self, RerankerError> {
        match config.model_path {
            Some(ref path) => Self::from_dir(path),
            None => Self::from_hub(&config.model_id, &config.revision),
        }
    }

    /// Uses a local directory laid out like a hub snapshot.
    pub fn from_dir(model_dir: &Path) -> Result<Self, RerankerError> {
        if !model_dir.exists() {
            return Err(RerankerError::ModelNotFound {
                path: model_dir.to_path_buf(),
            });
        }

        let files = Self {
            config: model_dir.join(CONFIG_FILE),
            tokenizer: model_dir.join(TOKENIZER_FILE),
            weights: model_dir.join(WEIGHTS_FILE),
        };

        for (name, path) in [
            (CONFIG_FILE, &files.config),
            (TOKENIZER_FILE, &files.tokenizer),
            (WEIGHTS_FILE, &files.weights),
        ] {
            if !path.exists() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", name, model_dir.display()),
                });
            }
        }

        debug!(model_dir = %model_dir.display(), "Using local model files");
        Ok(files)
    }

    /// Downloads (or reuses the cached copy of) the model files from the hub.
    pub fn from_hub(model_id: &str, revision: &str) -> Result<Self, RerankerError> {
        info!(model_id, revision, "Fetching model files from hub");

        // Honors HF_HOME and HF_ENDPOINT.
        let api = ApiBuilder::from_env().build().map_err(|e| RerankerError::DownloadFailed {
            model_id: model_id.to_string(),
            file: "<hub client>".to_string(),
            reason: e.to_string(),
        })?;

        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let fetch = |file: &str| {
            repo.get(file).map_err(|e| RerankerError::DownloadFailed {
                model_id: model_id.to_string(),
                file: file.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            config: fetch(CONFIG_FILE)?,
            tokenizer: fetch(TOKENIZER_FILE)?,
            weights: fetch(WEIGHTS_FILE)?,
        })
    }
}

/// Loads a tokenizer that truncates pairs to `max_len` and pads each batch to
/// its longest member.
pub fn load_pair_tokenizer(path: &Path, max_len: usize) -> Result<Tokenizer, RerankerError> {
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| RerankerError::ModelLoadFailed {
        reason: format!("Failed to load tokenizer from {}: {}", path.display(), e),
    })?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| RerankerError::ModelLoadFailed {
            reason: format!("Failed to configure truncation: {}", e),
        })?;

    let mut padding = tokenizer.get_padding().cloned().unwrap_or_else(|| {
        let (pad_id, pad_token) = ["<pad>", "[PAD]"]
            .iter()
            .find_map(|token| tokenizer.token_to_id(token).map(|id| (id, token.to_string())))
            .unwrap_or((0, "[PAD]".to_string()));

        PaddingParams {
            pad_id,
            pad_token,
            ..Default::default()
        }
    });
    padding.strategy = PaddingStrategy::BatchLongest;
    tokenizer.with_padding(Some(padding));

    Ok(tokenizer)
}

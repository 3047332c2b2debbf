use std::path::PathBuf;

use crate::constants::{DEFAULT_MODEL_ID, DEFAULT_MODEL_REVISION, MAX_SEQ_LEN, STUB_MODEL_ID};

/// Where the cross-encoder weights come from and how inputs are shaped.
#[derive(Debug, Clone)]
pub struct RerankerConfig {
    /// Hub model identifier (also reported to clients).
    pub model_id: String,

    /// Hub revision (branch, tag or commit).
    pub revision: String,

    /// Local directory with `config.json`, `tokenizer.json` and
    /// `model.safetensors`. Takes precedence over the hub when set.
    pub model_path: Option<PathBuf>,

    /// Per-pair token budget after truncation.
    pub max_seq_len: usize,

    /// Use the deterministic lexical encoder instead of real weights.
    pub stub: bool,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: DEFAULT_MODEL_REVISION.to_string(),
            model_path: None,
            max_seq_len: MAX_SEQ_LEN,
            stub: false,
        }
    }
}

impl RerankerConfig {
    /// Hub-backed configuration for `model_id` at the default revision.
    pub fn hub(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    /// Configuration reading weights from a local directory.
    pub fn local<P: Into<PathBuf>>(model_path: P) -> Self {
        let model_path = model_path.into();
        Self {
            model_id: model_path.display().to_string(),
            model_path: Some(model_path),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self {
            model_id: STUB_MODEL_ID.to_string(),
            stub: true,
            ..Default::default()
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        assert!(max_seq_len > 0, "max_seq_len must be greater than 0");
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model_id.trim().is_empty() {
            return Err("model_id cannot be empty".to_string());
        }

        if self.revision.trim().is_empty() {
            return Err("revision cannot be empty".to_string());
        }

        if self.max_seq_len == 0 {
            return Err("max_seq_len must be greater than 0".to_string());
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }

        Ok(())
    }

    pub fn from_env() -> Self {
        let stub = std::env::var("RERANK_STUB_MODEL")
            .ok()
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        if stub {
            return Self::stub();
        }

        let model_path = std::env::var("RERANK_MODEL_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let model_id = std::env::var("RERANK_MODEL_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let revision = std::env::var("RERANK_MODEL_REVISION")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_REVISION.to_string());

        let mut config = match model_path {
            Some(path) => Self::local(path),
            None => Self::default(),
        };

        if let Some(model_id) = model_id {
            config.model_id = model_id;
        }
        config.revision = revision;
        config
    }
}

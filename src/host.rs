//! The process-wide, load-once Model Host and the slot it is published through.
//!
//! The server binds its listener before the model finishes loading; handlers
//! look the host up in a [`ModelSlot`] and answer "not ready" until it is filled.

use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::info;

use crate::model::device::effective_threads;
use crate::model::{CrossEncoder, Reranker, RerankerConfig, RerankerError};

/// Loaded cross-encoder plus the runtime facts reported by `/health`.
#[derive(Debug)]
pub struct ModelHost<E> {
    encoder: E,
    device: String,
    threads: usize,
}

impl<E: CrossEncoder> ModelHost<E> {
    pub fn new(encoder: E, threads: usize) -> Self {
        let device = encoder.device_label();
        Self {
            encoder,
            device,
            threads,
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn model_id(&self) -> &str {
        self.encoder.model_id()
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl ModelHost<Reranker> {
    /// Loads the reranker synchronously. Intended for a blocking worker.
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        let started = Instant::now();
        let reranker = Reranker::load(config)?;
        let host = Self::new(reranker, effective_threads());

        info!(
            model_id = host.model_id(),
            device = host.device(),
            threads = host.threads(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model host ready"
        );

        Ok(host)
    }
}

/// Write-once cell holding the Model Host; cheap to clone into handler state.
pub struct ModelSlot<E> {
    inner: Arc<OnceLock<Arc<ModelHost<E>>>>,
}

impl<E> Clone for ModelSlot<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for ModelSlot<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E> std::fmt::Debug for ModelSlot<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSlot")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl<E> ModelSlot<E> {
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(OnceLock::new()),
        }
    }

    pub fn ready(host: ModelHost<E>) -> Self {
        let slot = Self::empty();
        let _ = slot.install(host);
        slot
    }

    /// Publishes the host. Fails (returning it) if one is already installed.
    pub fn install(&self, host: ModelHost<E>) -> Result<(), Arc<ModelHost<E>>> {
        self.inner.set(Arc::new(host))
    }

    pub fn get(&self) -> Option<Arc<ModelHost<E>>> {
        self.inner.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }
}

use crate::host::{ModelHost, ModelSlot};
use crate::model::CrossEncoder;

pub struct HandlerState<E: CrossEncoder> {
    pub host: ModelSlot<E>,

    /// Reported by `GET /` even before the model has loaded.
    pub model_id: String,
}

impl<E: CrossEncoder> Clone for HandlerState<E> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            model_id: self.model_id.clone(),
        }
    }
}

impl<E: CrossEncoder> HandlerState<E> {
    /// State whose model is still loading.
    pub fn pending(model_id: impl Into<String>) -> Self {
        Self {
            host: ModelSlot::empty(),
            model_id: model_id.into(),
        }
    }

    /// State with an already-loaded model.
    pub fn ready(host: ModelHost<E>) -> Self {
        let model_id = host.model_id().to_string();
        Self {
            host: ModelSlot::ready(host),
            model_id,
        }
    }
}

use std::sync::{Arc, Mutex};

use shared::{Label, PredictionResponse};

use crate::error::ApiError;
use crate::inference::model::Model;
use crate::inference::preprocess::Preprocessor;
use crate::upload::TempUpload;

/// Orchestrates preprocessing and inference for one upload. The model slot
/// starts empty and is filled once at startup; requests arriving before that
/// fail with `ModelUnavailable` while `/health` reports `modelLoaded: false`.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<Mutex<Option<Model>>>,
    preprocessor: Arc<Preprocessor>,
}

impl PredictionService {
    pub fn new(preprocessor: Preprocessor) -> Self {
        Self {
            model: Arc::new(Mutex::new(None)),
            preprocessor: Arc::new(preprocessor),
        }
    }

    pub fn install_model(&self, model: Model) {
        if let Ok(mut slot) = self.model.lock() {
            *slot = Some(model);
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// One-shot prediction over the spooled upload. Pure in its input bytes
    /// and the frozen model state; no retries. The caller owns the
    /// [`TempUpload`] guard, so the spooled file is removed whichever way
    /// this returns.
    pub fn predict(&self, upload: &TempUpload) -> Result<PredictionResponse, ApiError> {
        let guard = self
            .model
            .lock()
            .map_err(|_| ApiError::Internal("model lock poisoned".into()))?;
        let model = guard.as_ref().ok_or(ApiError::ModelUnavailable)?;

        let bytes = upload.read()?;
        let tensor = self.preprocessor.preprocess(&bytes)?;
        let confidence = model.infer(&tensor)?;

        Ok(shape_result(confidence))
    }
}

/// Applies the fixed 0.5 threshold and rounds the confidence to four
/// decimal digits. Exactly 0.5 resolves to "Real".
fn shape_result(confidence: f32) -> PredictionResponse {
    let confidence = (confidence * 10_000.0).round() / 10_000.0;
    let label = if confidence > 0.5 {
        Label::Fake
    } else {
        Label::Real
    };
    PredictionResponse { label, confidence }
}

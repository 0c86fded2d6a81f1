use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Name of the document-store collection holding [`PredictionRecord`]s.
pub const PREDICTIONS_COLLECTION: &str = "predictions";

/// Classification outcome. By convention, confidence close to 1.0 means "Fake".
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
pub enum Label {
    Fake,
    Real,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictionResponse {
    pub label: Label,
    pub confidence: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    #[serde(rename = "modelLoaded")]
    pub model_loaded: bool,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// Audit document written by clients after a successful prediction.
/// The service itself never writes these; admin tooling reads them back
/// filtered on `confidence < 0.5`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PredictionRecord {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub label: Label,
    pub confidence: f32,
    pub timestamp: String,
}

impl PredictionRecord {
    pub fn new(
        user_id: String,
        file_name: String,
        result: &PredictionResponse,
        timestamp: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            file_name,
            label: result.label,
            confidence: result.confidence,
            timestamp,
        }
    }
}

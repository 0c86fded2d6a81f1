use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::inference::model::InferenceError;
use crate::inference::preprocess::PreprocessError;

/// Request-level error taxonomy. Validation failures map to 400, everything
/// else to 500, all serialized as `{error, message?}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Model not loaded")]
    ModelUnavailable,
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<PreprocessError> for ApiError {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::Decode(msg) => ApiError::Decode(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(msg) => ErrorResponse::new(msg.clone()),
            ApiError::ModelUnavailable => ErrorResponse::new("Model not loaded"),
            ApiError::Decode(msg) => ErrorResponse::with_message("Prediction failed", msg.clone()),
            ApiError::Internal(msg) => {
                ErrorResponse::with_message("Internal server error", msg.clone())
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::Validation("No file uploaded".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_classes_map_to_server_error() {
        assert_eq!(
            ApiError::ModelUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Decode("bad magic".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn decode_failure_carries_message() {
        let err = ApiError::from(PreprocessError::Decode("unsupported format".into()));
        match err {
            ApiError::Decode(msg) => assert_eq!(msg, "unsupported format"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}

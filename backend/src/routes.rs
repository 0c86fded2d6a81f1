use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use log::{info, warn};
use shared::HealthResponse;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::service::PredictionService;
use crate::upload::TempUpload;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

async fn health(service: web::Data<PredictionService>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".into(),
        model_loaded: service.model_loaded(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn predict(
    service: web::Data<PredictionService>,
    config: web::Data<ServiceConfig>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut accepted: Option<(TempUpload, Option<String>, Option<String>)> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let (field_name, file_name) = {
            let disposition = field.content_disposition();
            (
                disposition
                    .and_then(|d| d.get_name())
                    .unwrap_or_default()
                    .to_owned(),
                disposition
                    .and_then(|d| d.get_filename())
                    .map(str::to_owned),
            )
        };

        if field_name != "file" {
            // Unrelated form fields are drained and ignored.
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| ApiError::Validation(e.to_string()))?;
            }
            continue;
        }

        let mime = field.content_type().map(|m| m.to_string());
        match mime.as_deref() {
            Some(mime) if config.is_allowed_type(mime) => {}
            _ => {
                return Err(ApiError::Validation(
                    "Invalid file type. Only images and videos are allowed.".into(),
                ));
            }
        }

        let mut upload = TempUpload::create(&config.upload.dir)?;
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| ApiError::Validation(e.to_string()))?;
            upload.write_chunk(&data)?;
            if upload.size() > config.upload.max_bytes {
                return Err(ApiError::Validation(
                    "File size too large. Max 50MB allowed.".into(),
                ));
            }
        }
        upload.finish()?;
        accepted = Some((upload, file_name, mime));
        break;
    }

    let (upload, file_name, mime) = accepted
        .filter(|(upload, _, _)| upload.size() > 0)
        .ok_or_else(|| ApiError::Validation("No file uploaded".into()))?;

    if mime.as_deref().is_some_and(|m| m.starts_with("video/")) {
        // Frame extraction for video is an explicit extension point that does
        // not exist yet; the bytes go through the still-image path and will
        // normally fail to decode.
        warn!("Video upload routed through still-image preprocessing");
    }

    info!(
        "Processing file: {}",
        file_name.as_deref().unwrap_or("unnamed")
    );

    let result = service.predict(&upload)?;
    info!(
        "Prediction result: {} with confidence {}",
        result.label, result.confidence
    );

    Ok(HttpResponse::Ok().json(result))
}

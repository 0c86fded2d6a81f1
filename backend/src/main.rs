use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use std::env;

use backend::config::ServiceConfig;
use backend::inference::model::Model;
use backend::inference::preprocess::Preprocessor;
use backend::routes::configure_routes;
use backend::service::PredictionService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = ServiceConfig::load();
    let (width, height) = config.image_size();

    let service = PredictionService::new(Preprocessor::new(width, height));

    let model = Model::load(&config.model.path, width, height);
    if model.is_placeholder() {
        log::warn!("Serving with an untrained placeholder classifier; confidence values carry no meaning");
    }
    service.install_model(model);

    let bind_address = format!("0.0.0.0:{}", config.server.port);
    log::info!("Starting server on {}", bind_address);

    let config = web::Data::new(config);
    let service = web::Data::new(service);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(config.clone())
            .app_data(service.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}

mod config;
mod error;
mod model;
mod web;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::sync::Arc;

use config::GatewayConfig;
use model::BedrockClient;
use web::routes;

// Shared, read-only state handed to every request
pub struct AppState {
    pub client: Arc<BedrockClient>,
    pub default_model_id: String,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Bedrock gateway");

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Missing credentials are fatal; the error is logged inside connect
    let client = match BedrockClient::connect(&config).await {
        Ok(client) => Arc::new(client),
        Err(_) => std::process::exit(1),
    };

    let app_state = Data::new(AppState {
        client,
        default_model_id: config.default_model_id.clone(),
    });

    info!(
        "Listening on {}:{} (default model: {})",
        config.host, config.port, config.default_model_id
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

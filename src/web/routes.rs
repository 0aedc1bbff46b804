use actix_web::web;

use crate::error::GatewayError;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .service(
            web::scope("/chat")
                .route("/models", web::get().to(handlers::list_models))
                // Model ARNs contain '/'
                .route("/models/{model_id:.*}", web::get().to(handlers::model_info))
                .route("/completions", web::post().to(handlers::create_chat_completion)),
        )
        .route("/health", web::get().to(handlers::health_check));
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| GatewayError::validation("streaming", err.to_string()).into())
}

use actix_web::web::{self, Bytes};
use actix_web::{HttpResponse, Responder};
use futures::StreamExt;
use log::info;
use serde_json::{json, Map};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::web::models::{ChatRequest, CompletionQuery};
use crate::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// Health check endpoint, backed by a live call to Bedrock
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let region = data.client.region();
    if data.client.test_connection().await {
        HttpResponse::Ok().json(json!({ "status": "ok", "region": region }))
    } else {
        HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable", "region": region }))
    }
}

pub async fn list_models(data: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    let models = data.client.list_foundation_models().await?;
    Ok(HttpResponse::Ok().json(models))
}

pub async fn model_info(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let info = data.client.get_model_info(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(info))
}

// Chat completion endpoint, unary or newline-delimited JSON stream
pub async fn create_chat_completion(
    data: web::Data<AppState>,
    query: web::Query<CompletionQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let req = ChatRequest::from_json(&body)?;

    let request_id = Uuid::new_v4();
    let model_id = req
        .model_id
        .clone()
        .unwrap_or_else(|| data.default_model_id.clone());

    info!(
        "Chat request {}: model {} (streaming: {}, max_tokens: {})",
        request_id,
        model_id,
        query.streaming,
        req.max_tokens()
    );

    let extra_params = Map::new();

    if !query.streaming {
        let response = data.client.invoke(&model_id, &req, &extra_params).await?;
        return Ok(HttpResponse::Ok()
            .insert_header((REQUEST_ID_HEADER, request_id.to_string()))
            .json(response));
    }

    let chunks = data
        .client
        .invoke_streaming(&model_id, &req, &extra_params)
        .await?;

    let body = chunks.map(|chunk| {
        chunk.map(|value| {
            let mut line = value.to_string();
            line.push('\n');
            Bytes::from(line)
        })
    });

    Ok(HttpResponse::Ok()
        .insert_header((REQUEST_ID_HEADER, request_id.to_string()))
        .content_type("application/x-ndjson")
        .streaming(body))
}

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the Bedrock client and the HTTP layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No usable AWS credentials could be resolved at startup.
    #[error("AWS credentials not found: {0}")]
    Credentials(String),

    /// A call to the remote service failed.
    #[error("Bedrock service error: {0}")]
    Service(String),

    /// The requested model does not exist.
    #[error("Model not found: {0}")]
    NotFound(String),

    /// The request body or query failed validation.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl GatewayError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Credentials(_) | Self::Service(_) | Self::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Validation { field, message } => json!({
                "error": message,
                "field": field,
            }),
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn validation_error_names_the_field() {
        let err = GatewayError::validation("user_prompt", "must be at least 3 characters");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["field"], "user_prompt");
        assert_eq!(value["error"], "must be at least 3 characters");
    }

    #[test]
    fn remote_failures_are_server_errors() {
        assert_eq!(
            GatewayError::Service("unreachable".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::NotFound("foo".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::from(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

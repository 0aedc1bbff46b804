mod summary;
pub mod transport;

use futures::stream::{BoxStream, StreamExt};
use log::{debug, error, info};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::web::models::{ChatRequest, Message, Role};
use transport::{ModelTransport, SdkTransport};

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Decoded chunk objects from a streamed invocation.
pub type CompletionStream = BoxStream<'static, Result<Value, GatewayError>>;

/// Client for Amazon Bedrock, bound to one region and credential set.
pub struct BedrockClient {
    region: String,
    transport: Arc<dyn ModelTransport>,
}

impl BedrockClient {
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        info!("Initializing Bedrock client for region {}", config.region);
        let transport = SdkTransport::connect(config).await.map_err(|e| {
            error!("Failed to initialize Bedrock client: {}", e);
            e
        })?;
        info!("Bedrock client initialized for region {}", config.region);
        Ok(Self::new(config.region.clone(), Arc::new(transport)))
    }

    pub fn new(region: impl Into<String>, transport: Arc<dyn ModelTransport>) -> Self {
        Self {
            region: region.into(),
            transport,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub async fn list_foundation_models(&self) -> Result<Vec<Value>, GatewayError> {
        self.transport
            .list_foundation_models()
            .await
            .map_err(|e| {
                error!("Failed to list foundation models: {}", e);
                e
            })
    }

    pub async fn invoke(
        &self,
        model_id: &str,
        request: &ChatRequest,
        extra_params: &Map<String, Value>,
    ) -> Result<Value, GatewayError> {
        let body = encode_payload(request, extra_params)?;

        let raw = self
            .transport
            .invoke_model(model_id, body)
            .await
            .map_err(|e| {
                error!("Failed to invoke model {}: {}", model_id, e);
                e
            })?;

        let response: Value = serde_json::from_slice(&raw).map_err(|e| {
            error!("Unexpected response body from model {}: {}", model_id, e);
            GatewayError::Unknown(e.into())
        })?;

        info!("Model {} invoked successfully", model_id);
        debug!("Response JSON: {}", response);
        Ok(response)
    }

    /// Opens a streamed invocation.
    ///
    /// Errors opening the stream are returned directly. Once the stream is
    /// open, a transport or decode failure is yielded as the final item.
    /// Dropping the stream abandons the underlying connection.
    pub async fn invoke_streaming(
        &self,
        model_id: &str,
        request: &ChatRequest,
        extra_params: &Map<String, Value>,
    ) -> Result<CompletionStream, GatewayError> {
        let body = encode_payload(request, extra_params)?;

        let chunks = self
            .transport
            .invoke_model_with_response_stream(model_id, body)
            .await
            .map_err(|e| {
                error!("Failed to stream model {}: {}", model_id, e);
                e
            })?;

        info!("Streaming response opened for model {}", model_id);
        let model_id = model_id.to_string();
        let decoded = chunks
            .map(move |chunk| {
                let decoded = chunk.and_then(|bytes| {
                    serde_json::from_slice::<Value>(&bytes)
                        .map_err(|e| GatewayError::Unknown(e.into()))
                });
                if let Err(e) = &decoded {
                    error!("Streaming from model {} failed: {}", model_id, e);
                }
                decoded
            })
            // Stop at the first failure
            .scan(false, |failed, item| {
                if *failed {
                    return futures::future::ready(None);
                }
                *failed = item.is_err();
                futures::future::ready(Some(item))
            });

        Ok(decoded.boxed())
    }

    pub async fn get_model_info(&self, model_id: &str) -> Result<Value, GatewayError> {
        self.transport
            .get_foundation_model(model_id)
            .await
            .map_err(|e| {
                error!("Failed to fetch info for model {}: {}", model_id, e);
                e
            })
    }

    /// Liveness probe: true iff listing models succeeds. Never fails.
    pub async fn test_connection(&self) -> bool {
        match self.list_foundation_models().await {
            Ok(_) => {
                info!("Connection to Bedrock succeeded");
                true
            }
            Err(_) => {
                info!("Connection to Bedrock failed, reporting unavailable");
                false
            }
        }
    }
}

/// Request body shared by unary and streamed invocations. Extra parameters
/// are merged last and override the defaults.
pub fn build_payload(request: &ChatRequest, extra_params: &Map<String, Value>) -> Value {
    let messages = vec![Message {
        role: Role::User,
        content: request.user_prompt.clone(),
    }];

    let mut payload = json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": request.max_tokens(),
        "temperature": request.temperature(),
        "top_p": request.top_p(),
        "messages": messages,
    });

    if let Value::Object(fields) = &mut payload {
        for (key, value) in extra_params {
            fields.insert(key.clone(), value.clone());
        }
    }
    payload
}

fn encode_payload(
    request: &ChatRequest,
    extra_params: &Map<String, Value>,
) -> Result<Vec<u8>, GatewayError> {
    let payload = build_payload(request, extra_params);
    debug!("Payload: {}", payload);
    serde_json::to_vec(&payload).map_err(|e| GatewayError::Unknown(e.into()))
}

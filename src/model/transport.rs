use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sdk_bedrock::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::ResponseStream;
use futures::stream::BoxStream;
use log::info;
use serde_json::Value;

use super::summary;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Raw chunk payloads, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<Vec<u8>, GatewayError>>;

/// The four calls this service makes against Bedrock.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn list_foundation_models(&self) -> Result<Vec<Value>, GatewayError>;

    async fn get_foundation_model(&self, model_id: &str) -> Result<Value, GatewayError>;

    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, GatewayError>;

    async fn invoke_model_with_response_stream(
        &self,
        model_id: &str,
        body: Vec<u8>,
    ) -> Result<ChunkStream, GatewayError>;
}

/// Transport backed by the AWS SDK control-plane and runtime clients.
pub struct SdkTransport {
    bedrock: aws_sdk_bedrock::Client,
    runtime: aws_sdk_bedrockruntime::Client,
}

impl SdkTransport {
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let sdk_config = load_sdk_config(config).await?;
        Ok(Self {
            bedrock: aws_sdk_bedrock::Client::new(&sdk_config),
            runtime: aws_sdk_bedrockruntime::Client::new(&sdk_config),
        })
    }
}

async fn load_sdk_config(config: &GatewayConfig) -> Result<SdkConfig, GatewayError> {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let Some((access_key_id, secret_access_key)) = config.static_credentials() {
        info!("Using static AWS credentials from the environment");
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            config.session_token.clone(),
            None,
            "gateway-environment",
        ));
    }

    let sdk_config = loader.load().await;

    // Resolve once up front so a missing credential chain fails at startup
    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| GatewayError::Credentials("no credentials provider configured".into()))?;
    provider
        .provide_credentials()
        .await
        .map_err(|e| GatewayError::Credentials(DisplayErrorContext(&e).to_string()))?;

    Ok(sdk_config)
}

fn service_error<E>(err: E) -> GatewayError
where
    E: std::error::Error,
{
    GatewayError::Service(DisplayErrorContext(&err).to_string())
}

#[async_trait]
impl ModelTransport for SdkTransport {
    async fn list_foundation_models(&self) -> Result<Vec<Value>, GatewayError> {
        let output = self
            .bedrock
            .list_foundation_models()
            .send()
            .await
            .map_err(service_error)?;

        Ok(output
            .model_summaries()
            .iter()
            .map(summary::model_summary_json)
            .collect())
    }

    async fn get_foundation_model(&self, model_id: &str) -> Result<Value, GatewayError> {
        let output = self
            .bedrock
            .get_foundation_model()
            .model_identifier(model_id)
            .send()
            .await
            .map_err(|err| {
                let not_found = err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception());
                if not_found {
                    GatewayError::NotFound(model_id.to_string())
                } else {
                    service_error(err)
                }
            })?;

        Ok(output
            .model_details()
            .map(summary::model_details_json)
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, GatewayError> {
        let output = self
            .runtime
            .invoke_model()
            .model_id(model_id)
            .body(Blob::new(body))
            .content_type("application/json")
            .accept("application/json")
            .send()
            .await
            .map_err(service_error)?;

        Ok(output.body.into_inner())
    }

    async fn invoke_model_with_response_stream(
        &self,
        model_id: &str,
        body: Vec<u8>,
    ) -> Result<ChunkStream, GatewayError> {
        let output = self
            .runtime
            .invoke_model_with_response_stream()
            .model_id(model_id)
            .body(Blob::new(body))
            .content_type("application/json")
            .accept("application/json")
            .send()
            .await
            .map_err(service_error)?;

        let mut events = output.body;
        let stream = async_stream::stream! {
            loop {
                match events.recv().await {
                    Ok(Some(ResponseStream::Chunk(part))) => {
                        if let Some(bytes) = part.bytes {
                            yield Ok::<_, GatewayError>(bytes.into_inner());
                        }
                    }
                    // Only chunk events carry model output
                    Ok(Some(_)) => {}
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(service_error(err));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

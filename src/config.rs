use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_REGION: &str = "eu-central-1";
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub default_model_id: String,
    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {raw:?}"))?,
            None => 8080,
        };

        Ok(Self {
            region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            session_token: var("AWS_SESSION_TOKEN"),
            default_model_id: var("BEDROCK_DEFAULT_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }

    /// Static credentials, only when both halves of the key pair are present.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<GatewayConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.default_model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.static_credentials().is_none());
    }

    #[test]
    fn static_credentials_need_both_halves() {
        let config = config_from(&[("AWS_ACCESS_KEY_ID", "AKIA123")]).unwrap();
        assert!(config.static_credentials().is_none());

        let config = config_from(&[
            ("AWS_ACCESS_KEY_ID", "AKIA123"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_REGION", "us-east-1"),
        ])
        .unwrap();
        assert_eq!(config.static_credentials(), Some(("AKIA123", "secret")));
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("AWS_REGION", "  "), ("BEDROCK_DEFAULT_MODEL_ID", "")]).unwrap();
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.default_model_id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn malformed_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const MIN_PROMPT_CHARS: usize = 3;

/// Body of `POST /chat/completions`.
///
/// Deserializing validates, so an invalid instance cannot be built from
/// JSON. Sampling parameters are optional; explicit `null` and omission
/// both resolve to the defaults through the accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawChatRequest")]
pub struct ChatRequest {
    pub user_prompt: String,
    pub model_id: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

// Wire shape before validation
#[derive(Debug, Deserialize)]
struct RawChatRequest {
    #[serde(default)]
    user_prompt: Option<String>,
    #[serde(default)]
    model_id: Option<String>,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    top_p: Option<f64>,
}

impl TryFrom<RawChatRequest> for ChatRequest {
    type Error = GatewayError;

    fn try_from(raw: RawChatRequest) -> Result<Self, Self::Error> {
        let user_prompt = raw
            .user_prompt
            .ok_or_else(|| GatewayError::validation("user_prompt", "field required"))?;
        let request = Self {
            user_prompt,
            model_id: raw.model_id,
            max_tokens: raw.max_tokens,
            temperature: raw.temperature,
            top_p: raw.top_p,
        };
        request.validate()?;
        Ok(request)
    }
}

impl ChatRequest {
    /// Builds a request with default sampling parameters, rejecting short prompts.
    pub fn new(user_prompt: impl Into<String>) -> Result<Self, GatewayError> {
        Self::try_from(RawChatRequest {
            user_prompt: Some(user_prompt.into()),
            model_id: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
        })
    }

    /// Parses and validates a JSON body. Errors name the offending field by
    /// its path, or `body` when the document itself is malformed.
    pub fn from_json(bytes: &[u8]) -> Result<Self, GatewayError> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        let raw: RawChatRequest = serde_path_to_error::deserialize(&mut de).map_err(|err| {
            let field = match err.path().to_string().as_str() {
                "." => "body".to_string(),
                path => path.to_string(),
            };
            GatewayError::validation(field, err.into_inner().to_string())
        })?;
        de.end()
            .map_err(|err| GatewayError::validation("body", err.to_string()))?;
        Self::try_from(raw)
    }

    fn validate(&self) -> Result<(), GatewayError> {
        let prompt = self.user_prompt.trim();
        if prompt.is_empty() {
            return Err(GatewayError::validation("user_prompt", "must not be blank"));
        }
        if self.user_prompt.chars().count() < MIN_PROMPT_CHARS {
            return Err(GatewayError::validation(
                "user_prompt",
                format!("must be at least {MIN_PROMPT_CHARS} characters"),
            ));
        }
        if let Some(model_id) = &self.model_id {
            if model_id.trim().is_empty() {
                return Err(GatewayError::validation("model_id", "must not be blank"));
            }
        }
        Ok(())
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn top_p(&self) -> f64 {
        self.top_p.unwrap_or(DEFAULT_TOP_P)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CompletionQuery {
    #[serde(default)]
    pub streaming: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_prompts_are_rejected() {
        for prompt in ["", "a", "Hi", "   ", "é!"] {
            match ChatRequest::new(prompt) {
                Err(GatewayError::Validation { field, .. }) => assert_eq!(field, "user_prompt"),
                other => panic!("expected validation error for {prompt:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let request = ChatRequest::from_json(br#"{"user_prompt":"Hello, how are you?"}"#).unwrap();
        assert_eq!(request.max_tokens(), 1000);
        assert_eq!(request.temperature(), 0.7);
        assert_eq!(request.top_p(), 0.9);
        assert!(request.model_id.is_none());
    }

    #[test]
    fn explicit_null_falls_back_to_defaults() {
        let request = ChatRequest::from_json(
            br#"{"user_prompt":"Hello","max_tokens":null,"temperature":null,"top_p":0.5}"#,
        )
        .unwrap();
        assert_eq!(request.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(request.temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(request.top_p(), 0.5);
    }

    #[test]
    fn prompt_length_counts_characters() {
        assert!(ChatRequest::new("héé").is_ok());
    }

    fn rejected_field(body: &[u8]) -> String {
        match ChatRequest::from_json(body) {
            Err(GatewayError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn deserializing_rejects_short_prompts() {
        assert!(serde_json::from_str::<ChatRequest>(r#"{"user_prompt":"Hi"}"#).is_err());
        assert_eq!(rejected_field(br#"{"user_prompt":"Hi"}"#), "user_prompt");
    }

    #[test]
    fn errors_name_the_failing_field() {
        assert_eq!(
            rejected_field(br#"{"user_prompt":"Hello","max_tokens":"many"}"#),
            "max_tokens"
        );
        assert_eq!(
            rejected_field(br#"{"user_prompt":"Hello","temperature":"warm"}"#),
            "temperature"
        );
        assert_eq!(rejected_field(br#"{"user_prompt":42}"#), "user_prompt");
        assert_eq!(rejected_field(br#"{"max_tokens":5}"#), "user_prompt");
        assert_eq!(rejected_field(br#"{"user_prompt":"Hello","model_id":" "}"#), "model_id");
    }

    #[test]
    fn malformed_documents_are_reported_as_body() {
        assert_eq!(rejected_field(b"not json"), "body");
        assert_eq!(rejected_field(b"42"), "body");
        assert_eq!(rejected_field(br#"{"user_prompt":"Hello"} trailing"#), "body");
    }

    #[test]
    fn message_serializes_lowercase_role() {
        let message = Message {
            role: Role::User,
            content: "Hello".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"role": "user", "content": "Hello"})
        );
    }
}

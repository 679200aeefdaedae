use async_trait::async_trait;
use cpc_common::{CpcError, Result};
use cpc_http::HttpError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("request timed out")]
    Timeout,

    #[error("configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Classify a raw HTTP failure from a provider call.
    pub fn from_http(e: HttpError) -> Self {
        match e {
            HttpError::Timeout(_) => LlmError::Timeout,
            HttpError::Api {
                status, message, ..
            } => match status.as_u16() {
                401 | 403 => LlmError::Auth(message),
                429 => LlmError::RateLimit(message),
                code => LlmError::Api {
                    status: code,
                    message,
                },
            },
            other => LlmError::Transport(other),
        }
    }
}

impl From<LlmError> for CpcError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => CpcError::Timeout,
            LlmError::Config(msg) => CpcError::Config(msg),
            other => CpcError::Llm(other.to_string()),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one system message and one user message; return the first completion.
    ///
    /// An absent completion is returned as empty text, not an error.
    async fn complete(&self, system_prompt: &str, prompt: &str) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool> {
        match self.complete("You are a health check.", "Respond with just 'OK'").await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(model = %self.model_name(), "llm health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

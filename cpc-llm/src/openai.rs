use crate::traits::{LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use cpc_common::Result;
use cpc_http::HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";
const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One element in the `choices` array
#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, or empty when the provider sent none.
    pub fn first_content(&self) -> String {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .unwrap_or_default()
    }
}

impl OpenAiClient {
    /// Create a client against the public OpenAI endpoint.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_endpoint(OPENAI_API_BASE, api_key, model)
    }

    /// Create a client against any OpenAI-compatible base URL (gateways, proxies).
    pub fn with_endpoint(endpoint: &str, api_key: String, model: String) -> Result<Self> {
        let base = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{endpoint}/")
        };
        let client = HttpClient::new(&base)
            .map_err(|e| LlmError::Config(format!("invalid LLM endpoint {endpoint}: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> Result<LlmResponse> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "llm.openai.request"
        );

        let resp: ChatCompletionResponse = self
            .client
            .post_json(CHAT_COMPLETIONS_PATH, Some(&self.api_key), &req)
            .await
            .map_err(LlmError::from_http)?;

        let text = resp.first_content();
        let tokens_used = resp.usage.as_ref().and_then(|u| u.total_tokens);

        tracing::debug!(
            id = ?resp.id,
            choices = resp.choices.len(),
            finish_reason = ?resp.choices.first().and_then(|c| c.finish_reason.as_deref()),
            ?tokens_used,
            completion_chars = text.chars().count(),
            "llm.openai.response"
        );

        Ok(LlmResponse {
            text,
            model: resp.model,
            tokens_used,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

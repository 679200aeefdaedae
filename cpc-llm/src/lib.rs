//! Provider-agnostic LLM integration for the CPC optimizer.
//!
//! This crate exposes the [`traits::LlmClient`] interface and the OpenAI
//! chat-completions implementation, plus [`build_client`] to construct the
//! provider selected in [`cpc_config::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use cpc_config::LlmConfig;
//! use cpc_llm::build_client;
//!
//! let cfg = LlmConfig {
//!     auth_token: "sk-...".into(),
//!     ..LlmConfig::default()
//! };
//! let client = build_client(&cfg)?;
//! assert_eq!(client.model_name(), "gpt-4o-mini");
//! # Ok::<(), cpc_common::CpcError>(())
//! ```
pub mod openai;
pub mod traits;

use cpc_config::{LlmConfig, LlmProvider};
use openai::OpenAiClient;
use std::sync::Arc;
use traits::LlmClient;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Build the configured provider client.
pub fn build_client(
    config: &LlmConfig,
) -> cpc_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config.provider {
        LlmProvider::Openai => {
            let client = OpenAiClient::with_endpoint(
                &config.endpoint,
                config.auth_token.clone(),
                config.model.clone(),
            )?
            .with_timeout(config.timeout());
            tracing::info!(model = %config.model, endpoint = %config.endpoint, "llm.client.ready");
            Ok(Arc::new(client))
        }
    }
}

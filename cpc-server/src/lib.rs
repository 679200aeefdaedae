//! HTTP surface of the CPC optimizer.
//!
//! Routes:
//! - `POST /api/analyze-url` runs one analysis
//! - `GET /api/i18n` and `GET /api/i18n/{locale}` serve display strings
//! - `GET /healthz` reports liveness and the configured model

pub mod error;
pub mod routes;

use cpc_analyzer::Analyzer;
use cpc_common::CpcError;
use cpc_config::AppConfig;
use cpc_http::HttpClient;
use std::sync::Arc;

pub use error::ApiError;
pub use routes::configure;

/// Immutable per-process state shared by every worker.
pub struct AppState {
    pub analyzer: Analyzer,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    /// Wire the page fetcher and LLM client from configuration.
    pub fn from_config(cfg: &AppConfig) -> cpc_common::Result<Self> {
        let fetcher = HttpClient::unanchored()
            .map_err(|e| CpcError::Http(e.to_string()))?
            .with_user_agent(cfg.fetch.user_agent.clone())
            .with_timeout(cfg.fetch.timeout());
        let llm = cpc_llm::build_client(&cfg.llm)?;
        let analyzer = Analyzer::new(Arc::new(fetcher), llm).with_max_text_chars(cfg.fetch.max_text_chars);
        Ok(Self::new(analyzer))
    }
}

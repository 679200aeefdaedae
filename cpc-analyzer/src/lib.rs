//! URL-to-keyword-analysis pipeline.
//!
//! - [`extract`]: HTML to bounded plain text
//! - [`prompt`]: fixed instruction template for the model
//! - [`normalize`]: tolerant parsing of the model's reply
//! - [`request`]: validation of the client payload
//! - [`pipeline`]: the [`Analyzer`] orchestrating fetch, prompt, call and parse
//! - [`stage`]: explicit progress states reported while a request runs
//!
//! ```no_run
//! use cpc_analyzer::Analyzer;
//! use cpc_http::HttpClient;
//! use std::sync::Arc;
//!
//! # async fn demo(llm: Arc<dyn cpc_llm::traits::LlmClient + Send + Sync>) {
//! let analyzer = Analyzer::new(Arc::new(HttpClient::unanchored().unwrap()), llm);
//! let result = analyzer.handle(br#"{"url": "https://example.com"}"#).await;
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod request;
pub mod stage;
pub mod types;

pub use error::AnalyzeError;
pub use pipeline::{Analyzer, FetchedPage, PageFetcher};
pub use stage::{AnalysisStage, StageObserver};
pub use types::{
    AnalysisResult, ContentQuality, KeywordAnalysis, RawAnalysis, ScorePotential, SemanticCluster,
};

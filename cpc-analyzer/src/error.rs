use crate::normalize::ParseFailure;
use cpc_common::CpcError;
use cpc_http::HttpError;

/// Failure of one analysis request, classified by how the client sees it.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL format")]
    InvalidUrl { input: String, reason: String },

    #[error("Failed to fetch URL content")]
    FetchStatus { status: u16 },

    #[error("AI response parse error")]
    ResponseParse(#[from] ParseFailure),

    /// Transport failure reaching the target page.
    #[error("{0}")]
    Fetch(#[from] HttpError),

    #[error("{0}")]
    Llm(#[from] CpcError),

    /// Request body was not usable JSON.
    #[error("{0}")]
    Body(String),
}

pub const UNCLASSIFIED_MESSAGE: &str = "Failed to analyze URL";

impl AnalyzeError {
    /// HTTP status the failure maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalyzeError::MissingUrl
            | AnalyzeError::InvalidUrl { .. }
            | AnalyzeError::FetchStatus { .. } => 400,
            AnalyzeError::ResponseParse(_)
            | AnalyzeError::Fetch(_)
            | AnalyzeError::Llm(_)
            | AnalyzeError::Body(_) => 500,
        }
    }

    /// The single-sentence `error` string shown to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            AnalyzeError::MissingUrl => "URL is required",
            AnalyzeError::InvalidUrl { .. } => "Invalid URL format",
            AnalyzeError::FetchStatus { .. } => "Failed to fetch URL content",
            AnalyzeError::ResponseParse(_) => "AI response parse error",
            _ => UNCLASSIFIED_MESSAGE,
        }
    }

    /// Extra `details` for unclassified failures; classified ones carry none.
    pub fn details(&self) -> Option<String> {
        match self {
            AnalyzeError::Fetch(_) | AnalyzeError::Llm(_) | AnalyzeError::Body(_) => {
                Some(self.to_string())
            }
            _ => None,
        }
    }
}

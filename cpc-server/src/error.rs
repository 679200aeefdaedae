use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use cpc_analyzer::AnalyzeError;
use serde::Serialize;

/// Error body: `{ "error": ..., "details"?: ... }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AnalyzeError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.0.client_message().to_string(),
            details: self.0.details(),
        })
    }
}

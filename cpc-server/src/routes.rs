use crate::{ApiError, AppState};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use cpc_i18n::Locale;
use serde::Deserialize;
use serde_json::json;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/analyze-url").route(web::post().to(analyze_url)))
        .service(web::resource("/api/i18n").route(web::get().to(messages)))
        .service(web::resource("/api/i18n/{locale}").route(web::get().to(catalog)))
        .service(web::resource("/healthz").route(web::get().to(healthz)));
}

/// Body is read raw so malformed JSON reaches the analyzer's own taxonomy.
async fn analyze_url(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let result = state.analyzer.handle(&body).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

async fn messages(req: HttpRequest, query: web::Query<LangQuery>) -> HttpResponse {
    let accept = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let locale = Locale::resolve(query.lang.as_deref(), accept);
    tracing::debug!(locale = %locale, requested = ?query.lang, "i18n.resolve");
    HttpResponse::Ok().json(json!({
        "locale": locale,
        "available": Locale::ALL,
        "messages": locale.catalog(),
    }))
}

async fn catalog(path: web::Path<String>) -> HttpResponse {
    match path.parse::<Locale>() {
        Ok(locale) => HttpResponse::Ok().json(locale.catalog()),
        Err(e) => HttpResponse::NotFound().json(json!({ "error": e.to_string() })),
    }
}

async fn healthz(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "model": state.analyzer.model_name(),
    }))
}

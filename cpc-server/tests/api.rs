mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use cpc_analyzer::{Analyzer, FetchedPage, PageFetcher};
use cpc_common::{CpcError, Result as CpcResult};
use cpc_http::{HttpClient, HttpError};
use cpc_llm::traits::{LlmClient, LlmResponse};
use cpc_config::{AppConfig, DEFAULT_USER_AGENT};
use cpc_server::{AppState, configure};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETION: &str = "```json\n{\"score\": 72, \"currentKeywords\": [\"example\"], \"highValueKeywords\": [\"example domain registration\"], \"recommendations\": [\"Expand the copy\"], \"estimatedCPCIncrease\": 20, \"contentQuality\": {\"score\": 40, \"strengths\": [\"short\"], \"improvements\": [\"depth\"]}, \"competitiveKeywords\": [\"domain names\"], \"semanticClusters\": [{\"theme\": \"Domains\", \"keywords\": [\"registrar\"]}]}\n```";

/// Serves a fixed page for any URL and records what was requested.
struct FixedPage {
    status: u16,
    body: &'static str,
    requested: Mutex<Vec<String>>,
}

impl FixedPage {
    fn new(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            requested: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl PageFetcher for FixedPage {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, HttpError> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(FetchedPage {
            status: self.status,
            body: self.body.to_string(),
        })
    }
}

struct CannedModel(&'static str);

#[async_trait]
impl LlmClient for CannedModel {
    async fn complete(&self, _system: &str, _prompt: &str) -> CpcResult<LlmResponse> {
        if self.0.is_empty() {
            return Err(CpcError::Llm("API error (503): upstream unavailable".into()));
        }
        Ok(LlmResponse {
            text: self.0.to_string(),
            ..Default::default()
        })
    }

    fn model_name(&self) -> &str {
        "gpt-4o-mini"
    }
}

fn state(fetcher: Arc<dyn PageFetcher>, completion: &'static str) -> web::Data<AppState> {
    web::Data::new(AppState::new(Analyzer::new(
        fetcher,
        Arc::new(CannedModel(completion)),
    )))
}

async fn post_analyze(state: web::Data<AppState>, body: &'static str) -> (StatusCode, Value) {
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/analyze-url")
        .insert_header(("content-type", "application/json"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_web::test]
async fn analyzes_example_com() {
    common::init_test_tracing();
    let page = FixedPage::new(200, "<html><body><h1>Example Domain</h1></body></html>");
    let (status, body) = post_analyze(
        state(page.clone(), COMPLETION),
        r#"{"url": "https://example.com"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["url"], json!("https://example.com"));
    assert_eq!(body["analysis"]["score"], json!(72));
    assert_eq!(body["analysis"]["estimatedCPCIncrease"], json!(20));
    assert_eq!(body["analysis"]["semanticClusters"][0]["theme"], json!("Domains"));
    let analyzed_at = body["analyzedAt"].as_str().unwrap();
    assert!(analyzed_at.ends_with('Z') && analyzed_at.len() == 24, "{analyzed_at}");
    assert_eq!(*page.requested.lock().unwrap(), vec!["https://example.com/"]);
}

#[actix_web::test]
async fn loosely_typed_completions_pass_through() {
    common::init_test_tracing();
    let cases: [(&'static str, &str, Value); 4] = [
        (
            r#"{"score": 70, "estimatedCPCIncrease": "25-35%"}"#,
            "estimatedCPCIncrease",
            json!("25-35%"),
        ),
        (
            r#"{"score": null, "estimatedCPCIncrease": 10}"#,
            "score",
            Value::Null,
        ),
        (
            r#"{"score": 55, "semanticClusters": ["Finance: loans, credit cards"]}"#,
            "semanticClusters",
            json!(["Finance: loans, credit cards"]),
        ),
        (r#"{"score": "72"}"#, "score", json!("72")),
    ];
    for (completion, key, expected) in cases {
        let (status, body) = post_analyze(
            state(FixedPage::new(200, "<p>loans</p>"), completion),
            r#"{"url": "https://example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{completion}");
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["analysis"][key], expected, "{completion}");
    }
}

#[actix_web::test]
async fn missing_url_is_bad_request() {
    common::init_test_tracing();
    let page = FixedPage::new(200, "");
    for body in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": null}"#] {
        let (status, json_body) = post_analyze(state(page.clone(), COMPLETION), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body, json!({"error": "URL is required"}));
    }
    assert!(page.requested.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn malformed_url_is_bad_request() {
    common::init_test_tracing();
    let page = FixedPage::new(200, "");
    let (status, body) = post_analyze(state(page.clone(), COMPLETION), r#"{"url": "not a url"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid URL format"}));
    assert!(page.requested.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn upstream_error_status_is_bad_request() {
    common::init_test_tracing();
    for code in [404, 500] {
        let (status, body) = post_analyze(
            state(FixedPage::new(code, "nope"), COMPLETION),
            r#"{"url": "https://example.com/missing"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Failed to fetch URL content"}));
    }
}

#[actix_web::test]
async fn unparseable_completion_is_server_error() {
    common::init_test_tracing();
    let (status, body) = post_analyze(
        state(FixedPage::new(200, "<p>hi</p>"), "I am unable to comply."),
        r#"{"url": "https://example.com"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "AI response parse error"}));
}

#[actix_web::test]
async fn provider_failure_carries_details() {
    common::init_test_tracing();
    let (status, body) = post_analyze(
        state(FixedPage::new(200, "<p>hi</p>"), ""),
        r#"{"url": "https://example.com"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Failed to analyze URL"));
    assert!(body["details"].as_str().unwrap().contains("upstream unavailable"));
}

#[actix_web::test]
async fn non_json_body_is_unclassified() {
    common::init_test_tracing();
    let (status, body) = post_analyze(state(FixedPage::new(200, ""), COMPLETION), "url=https://example.com").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Failed to analyze URL"));
    assert!(body["details"].is_string());
}

#[actix_web::test]
async fn fetches_real_page_over_http() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/post"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Mortgage rates explained</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpClient::unanchored()
        .unwrap()
        .with_timeout(Duration::from_secs(5));
    let url = format!("{}/blog/post", server.uri());
    let app = test::init_service(
        App::new()
            .app_data(state(Arc::new(fetcher), COMPLETION))
            .configure(configure),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/analyze-url")
        .set_json(json!({ "url": url }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["url"], json!(url));
    assert_eq!(resp["analysis"]["score"], json!(72));
}

#[actix_web::test]
async fn configured_state_fetches_with_default_user_agent() {
    common::init_test_tracing();
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pricing"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Cloud hosting plans</p>"))
        .expect(1)
        .mount(&site)
        .await;
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": COMPLETION}}]
        })))
        .expect(1)
        .mount(&model)
        .await;

    let mut cfg = AppConfig::default();
    cfg.llm.auth_token = "sk-test".into();
    cfg.llm.endpoint = format!("{}/v1", model.uri());
    assert_eq!(cfg.fetch.user_agent, "Mozilla/5.0 (compatible; AdSenseCPCOptimizer/1.0)");

    let state = web::Data::new(AppState::from_config(&cfg).unwrap());
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;
    let url = format!("{}/pricing", site.uri());
    let req = test::TestRequest::post()
        .uri("/api/analyze-url")
        .set_json(json!({ "url": url }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["analysis"]["score"], json!(72));
}

#[actix_web::test]
async fn get_on_analyze_route_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(state(FixedPage::new(200, ""), COMPLETION))
            .configure(configure),
    )
    .await;
    let req = test::TestRequest::get().uri("/api/analyze-url").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn healthz_reports_model() {
    let app = test::init_service(
        App::new()
            .app_data(state(FixedPage::new(200, ""), COMPLETION))
            .configure(configure),
    )
    .await;
    let req = test::TestRequest::get().uri("/healthz").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"status": "ok", "model": "gpt-4o-mini"}));
}

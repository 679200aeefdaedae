use crate::error::AnalyzeError;
use crate::extract::{MAX_TEXT_CHARS, extract_text_with_limit};
use crate::normalize::normalize_completion;
use crate::prompt::build_prompt;
use crate::request::{ValidatedRequest, parse_request};
use crate::stage::{AnalysisStage, NoopObserver, StageObserver, StageTracker};
use crate::types::AnalysisResult;
use async_trait::async_trait;
use cpc_http::{HttpClient, HttpError, RequestOpts};
use cpc_llm::traits::LlmClient;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Raw page as returned by the target server.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves the page behind a validated URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Non-2xx statuses come back as a page; only transport failures are errors.
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, HttpError>;
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, HttpError> {
        let resp = self.get_text(url.as_str(), RequestOpts::default()).await?;
        Ok(FetchedPage {
            status: resp.status.as_u16(),
            body: resp.body,
        })
    }
}

/// Runs one request end to end: fetch, extract, prompt, complete, normalize.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct Analyzer {
    fetcher: Arc<dyn PageFetcher>,
    llm: Arc<dyn LlmClient + Send + Sync>,
    max_text_chars: usize,
}

impl Analyzer {
    pub fn new(fetcher: Arc<dyn PageFetcher>, llm: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self {
            fetcher,
            llm,
            max_text_chars: MAX_TEXT_CHARS,
        }
    }

    pub fn with_max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = max;
        self
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient + Send + Sync> {
        &self.llm
    }

    /// Validate a raw request body and analyze the URL it names.
    pub async fn handle(&self, body: &[u8]) -> Result<AnalysisResult, AnalyzeError> {
        let request = parse_request(body).inspect_err(|e| {
            tracing::info!(error = %e, "analyze.request.rejected");
        })?;
        self.analyze(&request).await
    }

    pub async fn analyze(&self, request: &ValidatedRequest) -> Result<AnalysisResult, AnalyzeError> {
        self.analyze_with_observer(request, &NoopObserver).await
    }

    /// Like [`Analyzer::analyze`], reporting each stage to `observer`.
    pub async fn analyze_with_observer(
        &self,
        request: &ValidatedRequest,
        observer: &dyn StageObserver,
    ) -> Result<AnalysisResult, AnalyzeError> {
        let started = Instant::now();
        let mut tracker = StageTracker::new(observer);

        let outcome = self.run(request, &mut tracker).await;
        match &outcome {
            Ok(result) => {
                tracker.advance(AnalysisStage::Done);
                tracing::info!(
                    url = %request.raw_url,
                    score = result.keywords().score,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "analyze.complete"
                );
            }
            Err(e) => {
                if !tracker.current().is_terminal() {
                    tracker.advance(AnalysisStage::Error);
                }
                tracing::warn!(
                    url = %request.raw_url,
                    status = e.status_code(),
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "analyze.failed"
                );
            }
        }
        outcome
    }

    async fn run(
        &self,
        request: &ValidatedRequest,
        tracker: &mut StageTracker<'_>,
    ) -> Result<AnalysisResult, AnalyzeError> {
        tracker.advance(AnalysisStage::Fetching);
        let page = self.fetcher.fetch_page(&request.url).await?;
        if !page.is_success() {
            tracing::warn!(url = %request.url, status = page.status, "analyze.fetch.non_success");
            return Err(AnalyzeError::FetchStatus { status: page.status });
        }

        let text = extract_text_with_limit(&page.body, self.max_text_chars);
        tracing::debug!(
            url = %request.url,
            html_bytes = page.body.len(),
            text_chars = text.chars().count(),
            "analyze.extract"
        );
        let prompt = build_prompt(&request.raw_url, &text);

        tracker.advance(AnalysisStage::WaitingOnModel);
        let completion = self.llm.complete(&prompt.system, &prompt.user).await?;

        let analysis = normalize_completion(&completion.text).inspect_err(|e| {
            tracing::error!(
                model = %self.llm.model_name(),
                error = %e.source,
                cleaned = %e.cleaned,
                "analyze.response.unparseable"
            );
        })?;

        Ok(AnalysisResult::new(request.raw_url.clone(), analysis))
    }
}

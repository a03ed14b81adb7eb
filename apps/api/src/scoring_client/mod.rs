//! Scoring client: the single point of entry for all calls to the scoring backend.
//!
//! No other module talks HTTP to the backend directly. Callers depend on the
//! `ScoringBackend` trait so the orchestrator and ranking code can run against
//! in-process fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::kinds::{AnalysisInput, AnalysisKind};

pub mod endpoints;

/// Attempts for idempotent calls (analysis, lookup). Writes are never retried.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_BASE_DELAY_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ScoringError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScoringError::Api { status: 404, .. })
    }
}

/// One submission of the ad-hoc ranking flow. Field names follow the backend contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemRequest {
    pub file_name: String,
    pub file_size: u64,
    pub resume_text: String,
    pub page_count: u32,
    pub job_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    pub process_index: usize,
    pub total_files: usize,
    #[serde(rename = "request_type", skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,
}

/// Everything the insights flow needs from the scoring backend.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Runs one analysis kind and returns the raw JSON body.
    async fn analyze(&self, kind: AnalysisKind, input: &AnalysisInput)
        -> Result<Value, ScoringError>;

    /// Fetches a persisted candidate record. `Ok(None)` means the backend answered 404.
    async fn lookup_candidate(&self, email_id: &str) -> Result<Option<Value>, ScoringError>;

    async fn submit_bulk_item(&self, item: &BulkItemRequest) -> Result<Value, ScoringError>;

    /// Writes an accumulated view-state document.
    async fn assemble(&self, document: &Value) -> Result<Value, ScoringError>;

    async fn cover_letter(
        &self,
        resume_text: &str,
        description: &str,
    ) -> Result<Value, ScoringError>;
}

/// reqwest-backed implementation of `ScoringBackend`.
#[derive(Clone)]
pub struct ScoringClient {
    client: Client,
    base_url: String,
}

impl ScoringClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ScoringError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// POSTs a JSON body and returns the decoded JSON response.
    /// Idempotent calls retry once on 429 and 5xx with a short backoff.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
        idempotent: bool,
    ) -> Result<Value, ScoringError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let attempts = if idempotent { MAX_ATTEMPTS } else { 1 };
        let mut last_error: Option<ScoringError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * (1 << (attempt - 1)));
                warn!(
                    "POST {} attempt {} failed, retrying after {}ms",
                    endpoint,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ScoringError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Scoring backend returned {} for {}: {}", status, endpoint, message);
                last_error = Some(ScoringError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(ScoringError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let text = response.text().await?;
            let value = serde_json::from_str::<Value>(&text)?;
            debug!("POST {} succeeded ({} bytes)", endpoint, text.len());
            return Ok(value);
        }

        Err(last_error.unwrap_or(ScoringError::Api {
            status: 0,
            message: format!("no response from {endpoint}"),
        }))
    }
}

#[async_trait]
impl ScoringBackend for ScoringClient {
    async fn analyze(
        &self,
        kind: AnalysisKind,
        input: &AnalysisInput,
    ) -> Result<Value, ScoringError> {
        self.post_json(kind.endpoint(), &kind.request_body(input), true)
            .await
    }

    async fn lookup_candidate(&self, email_id: &str) -> Result<Option<Value>, ScoringError> {
        let body = json!({ "email_id": email_id });
        match self.post_json(endpoints::CANDIDATE_LOOKUP, &body, true).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn submit_bulk_item(&self, item: &BulkItemRequest) -> Result<Value, ScoringError> {
        self.post_json(endpoints::BULK_IMPORT, item, false).await
    }

    async fn assemble(&self, document: &Value) -> Result<Value, ScoringError> {
        self.post_json(endpoints::ASSEMBLE, document, false).await
    }

    async fn cover_letter(
        &self,
        resume_text: &str,
        description: &str,
    ) -> Result<Value, ScoringError> {
        let body = json!({ "resumeText": resume_text, "description": description });
        self.post_json(endpoints::COVER_LETTER, &body, false).await
    }
}

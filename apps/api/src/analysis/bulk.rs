//! Ad-hoc ranking of a batch of resumes against one job.
//!
//! Submissions are sequential with a fixed pause between them; the backend
//! rate-limits bulk imports.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::analysis::coerce::{decode_if_string, number, text, text_or};
use crate::extraction::ExtractedDocument;
use crate::scoring_client::{endpoints, BulkItemRequest, ScoringBackend};

pub const PARSED_OK: &str = "Successful";
pub const PARSED_FAILED: &str = "UnSuccessful";

/// One file of a ranking batch, after extraction was attempted.
#[derive(Debug, Clone)]
pub enum BulkEntry {
    Extracted(ExtractedDocument),
    Unreadable { file_name: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct RankingJob {
    pub job_role: String,
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub file_name: String,
    pub success: bool,
    pub email_id: String,
    pub contact_number: String,
    pub name: String,
    pub match_score: f64,
    pub summary: String,
    pub parsed_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RankedCandidate {
    fn failed(file_name: &str, error: String) -> Self {
        Self {
            file_name: file_name.to_string(),
            success: false,
            email_id: String::new(),
            contact_number: String::new(),
            name: String::new(),
            match_score: 0.0,
            summary: String::new(),
            parsed_status: PARSED_FAILED.to_string(),
            error: Some(error),
        }
    }

    /// Reads the bulk-import response. Each section may arrive JSON-encoded.
    fn from_response(file_name: &str, response: &Value) -> Self {
        let contacts = section(response, "getContacts");
        let input_data = section(response, "input_data");
        let score = section(response, "scoreResume");
        let summary = section(response, "getSummaryOverview");

        Self {
            file_name: file_name.to_string(),
            success: true,
            email_id: text(&contacts, "email_id").unwrap_or_default(),
            contact_number: text(&contacts, "mobile_number").unwrap_or_default(),
            name: text(&input_data, "name").unwrap_or_default(),
            match_score: number(&score, "score"),
            summary: text(&summary, "comment").unwrap_or_default(),
            parsed_status: text_or(response, "parsed_status", PARSED_OK),
            error: None,
        }
    }
}

fn section(response: &Value, key: &str) -> Value {
    response
        .get(key)
        .map(|v| decode_if_string(v).into_owned())
        .unwrap_or(Value::Null)
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingOutcome {
    /// Results in submission order.
    pub processed: Vec<RankedCandidate>,
    /// Results by descending match score; ties keep submission order.
    pub ranked: Vec<RankedCandidate>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Submits every entry in order and ranks the results.
///
/// Unreadable files and failed submissions are recorded as unsuccessful and
/// never abort the batch. `delay` separates consecutive submissions.
pub async fn rank_candidates(
    backend: &dyn ScoringBackend,
    entries: Vec<BulkEntry>,
    job: &RankingJob,
    delay: Duration,
) -> RankingOutcome {
    let total_files = entries.len();
    let mut processed = Vec::with_capacity(total_files);
    let mut submitted_any = false;

    info!(
        "Ranking {} file(s) for role '{}'",
        total_files, job.job_role
    );

    for (index, entry) in entries.into_iter().enumerate() {
        let doc = match entry {
            BulkEntry::Extracted(doc) => doc,
            BulkEntry::Unreadable { file_name, reason } => {
                warn!("Skipping unreadable file {}: {}", file_name, reason);
                processed.push(RankedCandidate::failed(&file_name, reason));
                continue;
            }
        };

        if submitted_any && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        submitted_any = true;

        let request = BulkItemRequest {
            file_name: doc.file_name.clone(),
            file_size: doc.file_size,
            resume_text: doc.text,
            page_count: doc.page_count,
            job_role: job.job_role.clone(),
            job_description: job.job_description.clone(),
            process_index: index + 1,
            total_files,
            request_type: Some(endpoints::ADHOC_REQUEST_TYPE.to_string()),
        };

        let result = match backend.submit_bulk_item(&request).await {
            Ok(response) => RankedCandidate::from_response(&doc.file_name, &response),
            Err(e) => {
                warn!("Bulk submission for {} failed: {}", doc.file_name, e);
                RankedCandidate::failed(&doc.file_name, e.to_string())
            }
        };
        info!(
            "[{}/{}] {} scored {}",
            index + 1,
            total_files,
            result.file_name,
            result.match_score
        );
        processed.push(result);
    }

    let mut ranked = processed.clone();
    ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

    let succeeded = processed.iter().filter(|c| c.success).count();
    let failed = processed.len() - succeeded;

    RankingOutcome {
        processed,
        ranked,
        succeeded,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::kinds::{AnalysisInput, AnalysisKind};
    use crate::scoring_client::ScoringError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scores each file by the number embedded in its resume text.
    #[derive(Default)]
    struct RankingBackend {
        seen: Mutex<Vec<(usize, usize, String)>>,
    }

    #[async_trait]
    impl ScoringBackend for RankingBackend {
        async fn analyze(&self, _k: AnalysisKind, _i: &AnalysisInput) -> Result<Value, ScoringError> {
            Ok(json!({}))
        }

        async fn lookup_candidate(&self, _email_id: &str) -> Result<Option<Value>, ScoringError> {
            Ok(None)
        }

        async fn submit_bulk_item(&self, item: &BulkItemRequest) -> Result<Value, ScoringError> {
            self.seen.lock().unwrap().push((
                item.process_index,
                item.total_files,
                item.file_name.clone(),
            ));
            if item.resume_text == "fail" {
                return Err(ScoringError::Api {
                    status: 500,
                    message: "bulk import failed".to_string(),
                });
            }
            Ok(json!({
                "getContacts": json!({"email_id": format!("{}@x.com", item.file_name),
                                      "mobile_number": "555"}).to_string(),
                "input_data": {"name": item.file_name.to_uppercase()},
                "scoreResume": {"score": format!("{}%", item.resume_text)},
                "getSummaryOverview": {"comment": "fits"},
            }))
        }

        async fn assemble(&self, _document: &Value) -> Result<Value, ScoringError> {
            Ok(json!({}))
        }

        async fn cover_letter(&self, _r: &str, _d: &str) -> Result<Value, ScoringError> {
            Ok(json!({}))
        }
    }

    fn doc(name: &str, text: &str) -> BulkEntry {
        BulkEntry::Extracted(ExtractedDocument {
            file_name: name.to_string(),
            file_size: 100,
            text: text.to_string(),
            page_count: 1,
        })
    }

    fn job() -> RankingJob {
        RankingJob {
            job_role: "Data Engineer".to_string(),
            job_description: Some("Spark and Kafka".to_string()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_sort_and_delay() {
        let backend = RankingBackend::default();
        let entries = vec![doc("a", "50"), doc("b", "80"), doc("c", "50")];

        let started = tokio::time::Instant::now();
        let outcome =
            rank_candidates(&backend, entries, &job(), Duration::from_millis(100)).await;
        let elapsed = started.elapsed();

        let processed: Vec<_> = outcome.processed.iter().map(|c| c.file_name.as_str()).collect();
        let ranked: Vec<_> = outcome.ranked.iter().map(|c| c.file_name.as_str()).collect();
        assert_eq!(processed, vec!["a", "b", "c"]);
        assert_eq!(ranked, vec!["b", "a", "c"]);
        assert_eq!(outcome.succeeded, 3);

        // Two gaps between three submissions, none after the last.
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300));

        let seen = backend.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (1, 3, "a".to_string()),
                (2, 3, "b".to_string()),
                (3, 3, "c".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_response_fields_are_mapped() {
        let backend = RankingBackend::default();
        let outcome = rank_candidates(&backend, vec![doc("jane.pdf", "72")], &job(), Duration::ZERO).await;
        let candidate = &outcome.processed[0];
        assert!(candidate.success);
        assert_eq!(candidate.email_id, "jane.pdf@x.com");
        assert_eq!(candidate.contact_number, "555");
        assert_eq!(candidate.name, "JANE.PDF");
        assert_eq!(candidate.match_score, 72.0);
        assert_eq!(candidate.summary, "fits");
        assert_eq!(candidate.parsed_status, PARSED_OK);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let backend = RankingBackend::default();
        let entries = vec![
            BulkEntry::Unreadable {
                file_name: "scan.pdf".to_string(),
                reason: "no text layer".to_string(),
            },
            doc("broken", "fail"),
            doc("ok", "10"),
        ];
        let outcome = rank_candidates(&backend, entries, &job(), Duration::ZERO).await;

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.processed[0].parsed_status, PARSED_FAILED);
        assert_eq!(outcome.processed[0].error.as_deref(), Some("no text layer"));
        assert!(!outcome.processed[1].success);
        assert_eq!(outcome.ranked[0].file_name, "ok");
        // Unreadable files still count towards processIndex.
        assert_eq!(backend.seen.lock().unwrap()[0].0, 2);
    }
}

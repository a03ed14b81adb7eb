use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::analysis::bulk::{rank_candidates, BulkEntry, RankingJob, RankingOutcome};
use crate::errors::AppError;
use crate::extraction::{validate_batch, RejectedFile, UploadedFile};
use crate::routes::insights::{extract_blocking, read_text};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RankingResponse {
    #[serde(flatten)]
    pub outcome: RankingOutcome,
    /// Files refused by the upload policy; never submitted.
    pub rejected: Vec<RejectedFile>,
    pub duplicates: Vec<String>,
}

/// POST /api/v1/ranking (multipart: files, job_role, job_description)
pub async fn handle_rank(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RankingResponse>, AppError> {
    let mut files = Vec::new();
    let mut job_role = String::new();
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "files" | "files[]" | "file" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
                files.push(UploadedFile { file_name, bytes });
            }
            "job_role" => job_role = read_text(field).await?,
            "job_description" => job_description = read_text(field).await?,
            _ => {}
        }
    }

    if job_role.trim().is_empty() {
        return Err(AppError::Validation("job_role is required".to_string()));
    }
    if files.is_empty() {
        return Err(AppError::Validation("at least one file is required".to_string()));
    }

    let batch = validate_batch(files, state.config.max_upload_bytes);
    if batch.accepted.is_empty() {
        return Err(AppError::Validation(
            "no file passed the upload checks".to_string(),
        ));
    }

    let mut entries = Vec::with_capacity(batch.accepted.len());
    for file in batch.accepted {
        let file_name = file.file_name.clone();
        match extract_blocking(file.file_name, file.bytes).await {
            Ok(doc) => entries.push(BulkEntry::Extracted(doc)),
            Err(e) => {
                warn!("Extraction failed for {}: {}", file_name, e);
                entries.push(BulkEntry::Unreadable {
                    file_name,
                    reason: e.to_string(),
                });
            }
        }
    }

    let job = RankingJob {
        job_role: job_role.trim().to_string(),
        job_description: Some(job_description.trim().to_string()).filter(|d| !d.is_empty()),
    };
    let outcome = rank_candidates(
        state.scoring.as_ref(),
        entries,
        &job,
        Duration::from_millis(state.config.bulk_delay_ms),
    )
    .await;

    Ok(Json(RankingResponse {
        outcome,
        rejected: batch.rejected,
        duplicates: batch.duplicates,
    }))
}

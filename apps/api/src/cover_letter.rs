use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::scoring_client::ScoringBackend;

#[derive(Debug, Serialize)]
pub struct CoverLetter {
    pub cover_letter: String,
}

/// Requests a cover letter for `resume_text` against a job description.
pub async fn generate_cover_letter(
    backend: &dyn ScoringBackend,
    resume_text: &str,
    description: &str,
) -> Result<CoverLetter, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Conflict(
            "no resume is loaded for this session".to_string(),
        ));
    }
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "description must not be empty".to_string(),
        ));
    }

    let response = backend.cover_letter(resume_text, description).await?;
    let letter = response
        .get("coverLetter")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty());

    match letter {
        Some(letter) => {
            info!("Generated cover letter ({} chars)", letter.len());
            Ok(CoverLetter {
                cover_letter: letter.to_string(),
            })
        }
        None => {
            let reason = response
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("response did not contain a cover letter");
            Err(AppError::Internal(anyhow::anyhow!(
                "Cover letter generation failed: {reason}"
            )))
        }
    }
}

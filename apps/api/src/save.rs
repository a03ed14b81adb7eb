//! Saving a fresh analysis back to the scoring backend as a candidate record.
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::scoring_client::{endpoints, ScoringBackend, ScoringError};
use crate::view_state::{InsightsView, PagePhase, ViewStore};

const SAVE_MODE: &str = "Manual";
const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("analysis is still loading")]
    StillLoading,

    #[error("there is no resume to save")]
    NothingToSave,

    #[error("backend rejected the record: {0}")]
    Rejected(String),

    #[error(transparent)]
    Upstream(#[from] ScoringError),
}

/// Builds the record document posted to the assemble endpoint.
///
/// Refused while the page is resolving or loading, or any slice is loading.
/// Slices that are idle or failed are written with their defaults.
pub fn build_save_document(view: &InsightsView) -> Result<Value, SaveError> {
    let slices = &view.slices;
    let page_busy = matches!(
        view.phase,
        PagePhase::Resolving { .. } | PagePhase::Loading { .. }
    );
    if page_busy || slices.any_loading() {
        return Err(SaveError::StillLoading);
    }
    if view.context.resume_text.trim().is_empty() {
        return Err(SaveError::NothingToSave);
    }

    let or_not_provided = |s: &str| {
        if s.trim().is_empty() {
            NOT_PROVIDED.to_string()
        } else {
            s.to_string()
        }
    };
    let score = slices.score.value_or_default();

    Ok(json!({
        "input_data": {
            "name": or_not_provided(&view.context.name),
            "resume_text": view.context.resume_text,
            "job_role": or_not_provided(&view.context.job_role),
        },
        "mode": SAVE_MODE,
        "getContacts": slices.contacts.value_or_default(),
        "getCustomScores": slices.custom_scores.value_or_default(),
        "getSummaryOverview": slices.summary.value_or_default(),
        "getFunctionalConstituent": slices.functional_constituent.value_or_default(),
        "getOtherComments": slices.other_comments.value_or_default(),
        "getEducation": slices.education.value_or_default(),
        "scoreResume": { "score": score.score, "items": score.items },
        "getTechnicalConstituent": slices.technical_constituent.value_or_default(),
        "getCompany": slices.employment.value_or_default(),
        "getProjects": slices.projects.value_or_default(),
    }))
}

/// Posts the current view to the backend. A `response` of `"Failed"` or a
/// missing-field complaint is reported as a rejection.
pub async fn save_view(backend: &dyn ScoringBackend, store: &ViewStore) -> Result<Value, SaveError> {
    let view = store.snapshot().await;
    let document = build_save_document(&view)?;

    let response = backend.assemble(&document).await?;
    if let Some(message) = rejection(&response) {
        warn!("{} rejected save: {}", endpoints::ASSEMBLE, message);
        return Err(SaveError::Rejected(message));
    }

    info!("Saved candidate record for '{}'", view.context.name);
    Ok(response)
}

fn rejection(response: &Value) -> Option<String> {
    let message = response.get("response")?.as_str()?;
    let rejected = message.eq_ignore_ascii_case("failed") || message.contains("cant be None");
    rejected.then(|| message.to_string())
}

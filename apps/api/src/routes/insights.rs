use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::acquisition::{resolve, AcquisitionMode, LocalResume, ResolverInput};
use crate::analysis::kinds::AnalysisInput;
use crate::analysis::orchestrator::run_fresh_analysis;
use crate::cover_letter::{generate_cover_letter, CoverLetter};
use crate::errors::AppError;
use crate::extraction::{extract_document, ExtractedDocument};
use crate::persisted::load_persisted;
use crate::save::save_view;
use crate::state::AppState;
use crate::view_state::{InsightsView, ViewStore};

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub view: InsightsView,
}

#[derive(Deserialize)]
pub struct InsightsQuery {
    pub email_id: Option<String>,
}

#[derive(Deserialize)]
pub struct LookupRequest {
    pub email_id: String,
}

#[derive(Deserialize)]
pub struct CoverLetterRequest {
    pub description: String,
}

async fn session(state: &AppState, id: Uuid) -> Result<Arc<ViewStore>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))
}

/// POST /api/v1/sessions
/// Opens a session in direct-access mode with an empty view.
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let (session_id, store) = state.sessions.create().await;
    store.begin(&resolve(ResolverInput::default())).await;
    info!("Created session {session_id}");

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            view: store.snapshot().await,
        }),
    )
}

/// GET /api/v1/sessions/:id/insights?email_id=
/// With an `email_id` the persisted record is loaded; without one the current
/// view is returned unchanged.
pub async fn handle_get_insights(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<InsightsView>, AppError> {
    let store = session(&state, id).await?;
    let mode = resolve(ResolverInput {
        route_identifier: query.email_id,
        ..Default::default()
    });

    match mode {
        AcquisitionMode::PersistedLookup { identifier } => Ok(Json(
            load_persisted(state.scoring.as_ref(), &store, &identifier).await?,
        )),
        _ => Ok(Json(store.snapshot().await)),
    }
}

/// POST /api/v1/sessions/:id/lookup
pub async fn handle_lookup(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<InsightsView>, AppError> {
    let store = session(&state, id).await?;
    let mode = resolve(ResolverInput {
        identifier_field: req.email_id,
        ..Default::default()
    });

    match mode {
        AcquisitionMode::PersistedLookup { identifier } => Ok(Json(
            load_persisted(state.scoring.as_ref(), &store, &identifier).await?,
        )),
        _ => Err(AppError::Validation(
            "email_id must not be empty".to_string(),
        )),
    }
}

/// POST /api/v1/sessions/:id/upload (multipart: file, job_role, name?)
/// Extracts the file and starts a fresh analysis in the background. The
/// response is the view as it stands once loading has begun: every slice
/// loading, or restored from the input cache.
///
/// Extraction runs before the view is touched. A file that cannot be read
/// (422) leaves the previous candidate and its phase exactly as they were.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<InsightsView>), AppError> {
    let store = session(&state, id).await?;

    let mut file: Option<(String, bytes::Bytes)> = None;
    let mut job_role = String::new();
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
                file = Some((file_name, data));
            }
            "job_role" => job_role = read_text(field).await?,
            "name" => name = Some(read_text(field).await?).filter(|n| !n.trim().is_empty()),
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    if job_role.trim().is_empty() {
        return Err(AppError::Validation("job_role is required".to_string()));
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::Validation(format!(
            "{file_name} exceeds the {} byte upload limit",
            state.config.max_upload_bytes
        )));
    }

    let doc = extract_blocking(file_name, data).await?;
    let mode = resolve(ResolverInput {
        local_text: Some(LocalResume {
            text: doc.text,
            job_role,
            name,
        }),
        ..Default::default()
    });

    let AcquisitionMode::FreshAnalysis { text, job_role, .. } = &mode else {
        return Err(AppError::Validation(format!(
            "no text could be extracted from {}",
            doc.file_name
        )));
    };
    let input = AnalysisInput {
        resume_text: text.clone(),
        job_role: job_role.clone(),
    };

    let epoch = store.begin(&mode).await;
    info!(
        "Session {id}: analysing {} ({} pages) under epoch {epoch}",
        doc.file_name, doc.page_count
    );
    let view = store.snapshot().await;
    tokio::spawn(run_fresh_analysis(
        state.scoring.clone(),
        store.clone(),
        epoch,
        input,
    ));

    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// DELETE /api/v1/sessions/:id/insights
/// Starts over: the view returns to its empty direct-access state.
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InsightsView>, AppError> {
    let store = session(&state, id).await?;
    store.begin(&AcquisitionMode::DirectAccess).await;
    Ok(Json(store.snapshot().await))
}

/// DELETE /api/v1/sessions/:id
/// Drops the session and everything it holds.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::NotFound(format!("session {id} not found")));
    }
    info!("Deleted session {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/save
pub async fn handle_save(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let store = session(&state, id).await?;
    let response = save_view(state.scoring.as_ref(), &store).await?;
    Ok(Json(json!({ "saved": true, "response": response })))
}

/// POST /api/v1/sessions/:id/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetter>, AppError> {
    let store = session(&state, id).await?;
    let resume_text = store.snapshot().await.context.resume_text;
    let letter =
        generate_cover_letter(state.scoring.as_ref(), &resume_text, &req.description).await?;
    Ok(Json(letter))
}

pub(crate) async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form field: {e}")))
}

/// Runs extraction off the async runtime; PDF parsing is CPU-bound.
pub(crate) async fn extract_blocking(
    file_name: String,
    data: bytes::Bytes,
) -> Result<ExtractedDocument, AppError> {
    let doc = tokio::task::spawn_blocking(move || extract_document(&file_name, &data))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(doc)
}

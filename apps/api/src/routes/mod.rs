pub mod health;
pub mod insights;
pub mod ranking;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Largest ranking batch accepted in one request body.
const MAX_BATCH_FILES: usize = 25;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_mul(MAX_BATCH_FILES);

    Router::new()
        .route("/health", get(health::health_handler))
        // Insights sessions
        .route("/api/v1/sessions", post(insights::handle_create_session))
        .route("/api/v1/sessions/:id", delete(insights::handle_delete_session))
        .route(
            "/api/v1/sessions/:id/insights",
            get(insights::handle_get_insights).delete(insights::handle_clear),
        )
        .route("/api/v1/sessions/:id/lookup", post(insights::handle_lookup))
        .route("/api/v1/sessions/:id/upload", post(insights::handle_upload))
        .route("/api/v1/sessions/:id/save", post(insights::handle_save))
        .route(
            "/api/v1/sessions/:id/cover-letter",
            post(insights::handle_cover_letter),
        )
        // Bulk ranking
        .route("/api/v1/ranking", post(ranking::handle_rank))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analysis::kinds::{AnalysisInput, AnalysisKind};
    use crate::config::Config;
    use crate::scoring_client::{BulkItemRequest, ScoringBackend, ScoringError};
    use crate::view_state::SessionRegistry;

    /// Knows exactly one persisted candidate: `known@x.com`.
    struct StubBackend;

    #[async_trait]
    impl ScoringBackend for StubBackend {
        async fn analyze(&self, _k: AnalysisKind, _i: &AnalysisInput) -> Result<Value, ScoringError> {
            Ok(json!({}))
        }
        async fn lookup_candidate(&self, email_id: &str) -> Result<Option<Value>, ScoringError> {
            if email_id == "known@x.com" {
                Ok(Some(json!({
                    "name": "Known Person",
                    "job_role": "Analyst",
                    "resume_raw_text": "Known resume",
                    "score_resume": "{\"score\": \"66%\", \"items\": []}"
                })))
            } else {
                Ok(Some(json!({})))
            }
        }
        async fn submit_bulk_item(&self, _i: &BulkItemRequest) -> Result<Value, ScoringError> {
            Ok(json!({}))
        }
        async fn assemble(&self, _d: &Value) -> Result<Value, ScoringError> {
            Ok(json!({"response": "Candidate-1"}))
        }
        async fn cover_letter(&self, _r: &str, _d: &str) -> Result<Value, ScoringError> {
            Ok(json!({"coverLetter": "Dear Hiring Manager,"}))
        }
    }

    fn app() -> Router {
        build_router(AppState {
            scoring: Arc::new(StubBackend),
            sessions: Arc::new(SessionRegistry::new()),
            config: Config::default(),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let parts: Vec<(&str, Option<&str>, &[u8])> = parts
            .iter()
            .map(|(name, file_name, content)| (*name, *file_name, content.as_bytes()))
            .collect();
        multipart_bytes(uri, &parts)
    }

    fn multipart_bytes(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let boundary = "insights-test-boundary";
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    /// Creates a session through the router and returns its id.
    async fn create_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/sessions", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["session_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_new_session_starts_in_direct_access() {
        let response = app()
            .oneshot(post_json("/api/v1/sessions", json!({})))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["view"]["phase"]["status"], "loaded");
        assert_eq!(body["view"]["phase"]["mode"], "direct_access");
        assert_eq!(body["view"]["slices"]["score"]["status"], "idle");
    }

    #[tokio::test]
    async fn test_route_identifier_loads_persisted_record() {
        let app = app();
        let id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/insights?email_id=known@x.com"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["context"]["name"], "Known Person");
        assert_eq!(body["slices"]["score"]["value"]["score"], 66.0);
    }

    #[tokio::test]
    async fn test_unknown_candidate_is_404_and_view_stays_empty() {
        let app = app();
        let id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/sessions/{id}/lookup"),
                json!({"email_id": "ghost@x.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/insights"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let view = body_json(response).await;
        assert_eq!(view["phase"]["status"], "failed");
        assert_eq!(view["phase"]["reason"], "candidate not found");
        assert_eq!(view["context"]["name"], "");
    }

    #[tokio::test]
    async fn test_blank_lookup_is_rejected() {
        let app = app();
        let id = create_session(&app).await;
        let response = app
            .oneshot(post_json(
                &format!("/api/v1/sessions/{id}/lookup"),
                json!({"email_id": "   "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let response = app()
            .oneshot(post_json(
                &format!("/api/v1/sessions/{}/save", uuid::Uuid::new_v4()),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_without_resume_is_conflict() {
        let app = app();
        let id = create_session(&app).await;
        let response = app
            .oneshot(post_json(&format!("/api/v1/sessions/{id}/save"), json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_upload_of_unsupported_type_is_422() {
        let app = app();
        let id = create_session(&app).await;
        let request = multipart(
            &format!("/api/v1/sessions/{id}/upload"),
            &[
                ("job_role", None, "Data Engineer"),
                ("file", Some("resume.txt"), "plain text resume"),
            ],
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    fn resume_docx() -> Vec<u8> {
        use docx_rs::{Docx, Paragraph, Run};
        let mut cursor = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Jane Roe")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Data Engineer")))
            .build()
            .pack(&mut cursor)
            .unwrap();
        cursor.into_inner()
    }

    #[tokio::test]
    async fn test_upload_answers_with_every_slice_loading() {
        let app = app();
        let id = create_session(&app).await;
        let docx = resume_docx();
        let request = multipart_bytes(
            &format!("/api/v1/sessions/{id}/upload"),
            &[
                ("job_role", None, b"Data Engineer".as_slice()),
                ("file", Some("resume.docx"), docx.as_slice()),
            ],
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let view = body_json(response).await;
        assert_eq!(view["phase"]["status"], "loading");
        assert_eq!(view["phase"]["mode"], "fresh_analysis");
        assert_eq!(view["slices"]["score"]["status"], "loading");
        assert_eq!(view["slices"]["recruiters_overview"]["status"], "loading");
        assert_eq!(view["context"]["job_role"], "Data Engineer");
    }

    #[tokio::test]
    async fn test_deleted_session_is_gone() {
        let app = app();
        let id = create_session(&app).await;
        let delete = |id: &str| {
            Request::delete(format!("/api/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(delete(&id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.clone().oneshot(delete(&id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/insights"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreadable_upload_keeps_previous_candidate() {
        let app = app();
        let id = create_session(&app).await;
        app.clone()
            .oneshot(post_json(
                &format!("/api/v1/sessions/{id}/lookup"),
                json!({"email_id": "known@x.com"}),
            ))
            .await
            .unwrap();

        let request = multipart(
            &format!("/api/v1/sessions/{id}/upload"),
            &[
                ("job_role", None, "Data Engineer"),
                ("file", Some("resume.docx"), "not a zip archive"),
            ],
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/insights"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let view = body_json(response).await;
        assert_eq!(view["context"]["name"], "Known Person");
        assert_eq!(view["phase"]["status"], "loaded");
        assert_eq!(view["phase"]["mode"], "persisted_lookup");
    }

    #[tokio::test]
    async fn test_upload_requires_job_role() {
        let app = app();
        let id = create_session(&app).await;
        let request = multipart(
            &format!("/api/v1/sessions/{id}/upload"),
            &[("file", Some("resume.pdf"), "%PDF-1.4")],
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ranking_with_only_rejected_files_is_400() {
        let request = multipart(
            "/api/v1/ranking",
            &[
                ("job_role", None, "Analyst"),
                ("files", Some("notes.txt"), "hello"),
            ],
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cover_letter_for_loaded_candidate() {
        let app = app();
        let id = create_session(&app).await;
        app.clone()
            .oneshot(post_json(
                &format!("/api/v1/sessions/{id}/lookup"),
                json!({"email_id": "known@x.com"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json(
                &format!("/api/v1/sessions/{id}/cover-letter"),
                json!({"description": "Analyst at a bank"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["cover_letter"],
            "Dear Hiring Manager,"
        );
    }
}

use std::sync::Arc;

use crate::config::Config;
use crate::scoring_client::ScoringBackend;
use crate::view_state::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Scoring backend. `ScoringClient` in production, in-process fakes in tests.
    pub scoring: Arc<dyn ScoringBackend>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Config,
}

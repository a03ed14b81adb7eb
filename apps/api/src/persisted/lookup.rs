use tracing::{info, warn};

use crate::acquisition::{AcquisitionMode, ModeKind};
use crate::errors::AppError;
use crate::persisted::mapper::{map_record, LookupError};
use crate::scoring_client::ScoringBackend;
use crate::view_state::{InsightsView, PagePhase, ViewStore};

/// Loads a persisted candidate into the session view.
///
/// The view is reset (and the previous candidate's context cleared) before the
/// request goes out. A missing candidate leaves the view at its defaults with
/// a failed phase. If a newer acquisition began while the request was in
/// flight, nothing is applied and the caller gets a conflict; the returned
/// view is always the one this lookup produced.
pub async fn load_persisted(
    backend: &dyn ScoringBackend,
    store: &ViewStore,
    identifier: &str,
) -> Result<InsightsView, AppError> {
    let epoch = store
        .begin(&AcquisitionMode::PersistedLookup {
            identifier: identifier.to_string(),
        })
        .await;

    let response = match backend.lookup_candidate(identifier).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Candidate lookup for {} failed: {}", identifier, e);
            if !fail(store, epoch, "scoring backend unavailable").await {
                return Err(superseded(identifier));
            }
            return Err(AppError::Upstream(e));
        }
    };

    match map_record(response.as_ref()) {
        Ok(mapped) => {
            let loaded = store
                .apply_with(epoch, |view| {
                    view.context = mapped.context;
                    view.slices = mapped.slices;
                    view.phase = PagePhase::Loaded {
                        mode: ModeKind::PersistedLookup,
                    };
                    view.clone()
                })
                .await;
            match loaded {
                Some(view) => {
                    info!("Loaded persisted candidate {}", identifier);
                    Ok(view)
                }
                None => Err(superseded(identifier)),
            }
        }
        Err(LookupError::NotFound) => {
            info!("No persisted candidate for {}", identifier);
            if !fail(store, epoch, "candidate not found").await {
                return Err(superseded(identifier));
            }
            Err(LookupError::NotFound.into())
        }
    }
}

/// Marks the lookup failed. Returns false if a newer acquisition owns the view.
async fn fail(store: &ViewStore, epoch: u64, reason: &str) -> bool {
    store
        .apply(epoch, |view| {
            view.phase = PagePhase::Failed {
                mode: ModeKind::PersistedLookup,
                reason: reason.to_string(),
            };
        })
        .await
}

fn superseded(identifier: &str) -> AppError {
    info!("Lookup for {} was superseded by a newer request", identifier);
    AppError::Conflict("lookup superseded".to_string())
}

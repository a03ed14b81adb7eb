use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::acquisition::ModeKind;
use crate::analysis::kinds::{AnalysisInput, AnalysisKind};
use crate::scoring_client::{ScoringBackend, ScoringError};
use crate::view_state::{PagePhase, ViewStore};

/// How a fresh analysis run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshAnalysisOutcome {
    /// Results for identical input were restored from the session cache.
    Restored,
    Completed { failed: usize },
    /// A newer acquisition started before this one finished.
    Superseded,
}

/// Cache key for one analysis input: SHA-256 over the text length, the text
/// and the job role. The length prefix keeps `("a_", "b")` and `("a", "_b")` apart.
pub fn input_cache_key(resume_text: &str, job_role: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((resume_text.len() as u64).to_le_bytes());
    hasher.update(resume_text.as_bytes());
    hasher.update(b"_");
    hasher.update(job_role.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Runs every analysis kind concurrently and settles each slice as its
/// request completes.
///
/// Expects `ViewStore::begin` to have marked every slice `Loading`, or to have
/// restored the slices from the input cache, under `epoch`. A failing kind
/// only fails its own slice; nothing is cancelled. Writes are tagged with
/// `epoch` and dropped once a newer acquisition has begun.
pub async fn run_fresh_analysis(
    backend: Arc<dyn ScoringBackend>,
    store: Arc<ViewStore>,
    epoch: u64,
    input: AnalysisInput,
) -> FreshAnalysisOutcome {
    let cache_key = input_cache_key(&input.resume_text, &input.job_role);

    let Some(restored) = store
        .apply_with(epoch, |view| !view.slices.any_loading())
        .await
    else {
        return FreshAnalysisOutcome::Superseded;
    };
    if restored {
        info!("Restored cached analysis for input {}", &cache_key[..12]);
        return FreshAnalysisOutcome::Restored;
    }

    info!(
        "Dispatching {} analysis requests (epoch {}, {} chars, role '{}')",
        AnalysisKind::ALL.len(),
        epoch,
        input.resume_text.len(),
        input.job_role
    );

    let input = Arc::new(input);
    let mut join_set = JoinSet::new();
    for kind in AnalysisKind::ALL {
        let backend = backend.clone();
        let input = input.clone();
        join_set.spawn(async move {
            let result = backend.analyze(kind, &input).await;
            (kind, result)
        });
    }

    let mut pending: HashSet<AnalysisKind> = AnalysisKind::ALL.into_iter().collect();
    let mut failed = 0usize;
    let mut superseded = false;

    while let Some(joined) = join_set.join_next().await {
        let (kind, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Analysis task aborted: {e}");
                continue;
            }
        };
        pending.remove(&kind);

        let outcome: Result<&Value, String> = match &result {
            Ok(body) => Ok(body),
            Err(e) => {
                failed += 1;
                warn!("{:?} analysis failed: {}", kind, e);
                Err(slice_error_message(e))
            }
        };
        let applied = store
            .apply(epoch, |view| view.slices.settle(kind, outcome))
            .await;
        if !applied {
            superseded = true;
        }
        debug!("{:?} settled (epoch {})", kind, epoch);
    }

    // A panicked task never reports its kind; fail whatever is left so no slice stays loading.
    failed += pending.len();
    let finished = store
        .apply(epoch, |view| {
            for kind in pending.drain() {
                view.slices
                    .settle(kind, Err("analysis task aborted".to_string()));
            }
            view.phase = PagePhase::Loaded {
                mode: ModeKind::FreshAnalysis,
            };
        })
        .await;

    if superseded || !finished {
        info!("Analysis for epoch {} was superseded", epoch);
        return FreshAnalysisOutcome::Superseded;
    }

    if failed == 0 {
        let snapshot = store.snapshot().await;
        if snapshot.epoch == epoch {
            store.store_cached(cache_key, snapshot.slices).await;
        }
    }

    info!(
        "Analysis for epoch {} finished: {} of {} kinds failed",
        epoch,
        failed,
        AnalysisKind::ALL.len()
    );
    FreshAnalysisOutcome::Completed { failed }
}

fn slice_error_message(error: &ScoringError) -> String {
    match error {
        ScoringError::Http(e) if e.is_timeout() => "request timed out".to_string(),
        ScoringError::Http(_) => "network error".to_string(),
        ScoringError::Api { status, .. } => format!("scoring backend returned {status}"),
        ScoringError::Parse(_) => "malformed response".to_string(),
    }
}

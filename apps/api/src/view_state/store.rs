use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::acquisition::AcquisitionMode;
use crate::analysis::kinds::AnalysisKind;
use crate::analysis::orchestrator::input_cache_key;
use crate::view_state::page::{CandidateContext, InsightSlices, InsightsView, PagePhase};

const DEFAULT_CACHE_CAPACITY: usize = 8;
const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

/// Finished fresh-analysis results keyed by input hash, oldest evicted first.
#[derive(Debug)]
struct InputCache {
    capacity: usize,
    entries: HashMap<String, InsightSlices>,
    order: VecDeque<String>,
}

impl InputCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn insert(&mut self, key: String, slices: InsightSlices) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), slices).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

/// Owner of one session's view-state.
///
/// Every mode change goes through `begin`, which bumps the epoch. Writers
/// carry the epoch they started under; `apply` drops writes from an older
/// epoch so a late response can never overwrite newer state.
#[derive(Debug)]
pub struct ViewStore {
    view: RwLock<InsightsView>,
    /// Survives resets; bounded by the capacity given at construction.
    cache: Mutex<InputCache>,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ViewStore {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            view: RwLock::new(InsightsView::default()),
            cache: Mutex::new(InputCache::new(capacity)),
        }
    }

    /// Starts a new acquisition and returns its epoch.
    ///
    /// The reset and the first state of the new mode are written under one
    /// lock, so no reader sees a loading page without loading slices. A fresh
    /// analysis either restores cached slices (phase `Loaded`) or marks all
    /// of them `Loading`.
    pub async fn begin(&self, mode: &AcquisitionMode) -> u64 {
        let kind = mode.kind();
        let restored = match mode {
            AcquisitionMode::FreshAnalysis { text, job_role, .. } => {
                self.cached(&input_cache_key(text, job_role)).await
            }
            _ => None,
        };

        let mut view = self.view.write().await;
        view.phase = PagePhase::Resolving { mode: kind };
        view.epoch += 1;
        view.reset_for(mode);

        view.phase = match mode {
            AcquisitionMode::DirectAccess => PagePhase::Loaded { mode: kind },
            AcquisitionMode::PersistedLookup { .. } => PagePhase::Loading { mode: kind },
            AcquisitionMode::FreshAnalysis {
                text,
                job_role,
                name,
            } => {
                view.context = CandidateContext {
                    name: name.clone().unwrap_or_default(),
                    job_role: job_role.clone(),
                    resume_text: text.clone(),
                };
                match restored {
                    Some(slices) => {
                        view.slices = slices;
                        PagePhase::Loaded { mode: kind }
                    }
                    None => {
                        for analysis in AnalysisKind::ALL {
                            view.slices.set_loading(analysis);
                        }
                        PagePhase::Loading { mode: kind }
                    }
                }
            }
        };

        debug!("View epoch {} started in {:?}", view.epoch, kind);
        view.epoch
    }

    /// Applies `f` only if `epoch` is still current. Returns whether it was applied.
    pub async fn apply<F>(&self, epoch: u64, f: F) -> bool
    where
        F: FnOnce(&mut InsightsView),
    {
        self.apply_with(epoch, f).await.is_some()
    }

    /// Like `apply`, but hands back what `f` returns. `None` means `epoch`
    /// was already superseded and `f` never ran.
    pub async fn apply_with<F, R>(&self, epoch: u64, f: F) -> Option<R>
    where
        F: FnOnce(&mut InsightsView) -> R,
    {
        let mut view = self.view.write().await;
        if view.epoch != epoch {
            debug!(
                "Discarding stale update for epoch {} (current {})",
                epoch, view.epoch
            );
            return None;
        }
        Some(f(&mut *view))
    }

    pub async fn snapshot(&self) -> InsightsView {
        self.view.read().await.clone()
    }

    #[cfg(test)]
    pub async fn current_epoch(&self) -> u64 {
        self.view.read().await.epoch
    }

    pub async fn cached(&self, key: &str) -> Option<InsightSlices> {
        self.cache.lock().await.entries.get(key).cloned()
    }

    pub async fn store_cached(&self, key: String, slices: InsightSlices) {
        self.cache.lock().await.insert(key, slices);
    }
}

#[derive(Debug)]
struct Session {
    store: Arc<ViewStore>,
    /// Milliseconds since the registry's clock started.
    last_seen_ms: AtomicU64,
}

/// All live sessions, keyed by id. Sessions idle for longer than the
/// configured limit are dropped by `evict_idle`.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_limit: Duration,
    cache_capacity: usize,
    clock: Instant,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_IDLE, DEFAULT_CACHE_CAPACITY)
    }
}

impl SessionRegistry {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_limit: Duration, cache_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_limit,
            cache_capacity,
            clock: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.clock.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub async fn create(&self) -> (Uuid, Arc<ViewStore>) {
        let id = Uuid::new_v4();
        let store = Arc::new(ViewStore::with_cache_capacity(self.cache_capacity));
        let session = Session {
            store: store.clone(),
            last_seen_ms: AtomicU64::new(self.now_ms()),
        };
        self.sessions.write().await.insert(id, session);
        (id, store)
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<ViewStore>> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id)?;
        session.last_seen_ms.store(self.now_ms(), Ordering::Relaxed);
        Some(session.store.clone())
    }

    /// Drops a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drops every session unused for longer than the idle limit. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = self.now_ms();
        let limit = u64::try_from(self.idle_limit.as_millis()).unwrap_or(u64::MAX);

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let idle = now.saturating_sub(session.last_seen_ms.load(Ordering::Relaxed));
            let keep = idle <= limit;
            if !keep {
                debug!("Evicting session {id} after {idle}ms idle");
            }
            keep
        });
        before - sessions.len()
    }

    /// Sweeps idle sessions every `every` until the runtime shuts down.
    pub async fn run_idle_sweeper(self: Arc<Self>, every: Duration) {
        let mut interval = tokio::time::interval(every);
        info!("Session sweeper started ({}s interval)", every.as_secs());

        loop {
            interval.tick().await;
            let evicted = self.evict_idle().await;
            if evicted > 0 {
                info!("Evicted {} idle session(s)", evicted);
            }
        }
    }
}

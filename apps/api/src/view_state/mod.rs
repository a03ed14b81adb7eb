//! Per-session page view-state: slice states, the page phase, and the
//! epoch-guarded store that serializes writes from both acquisition paths.

pub mod page;
pub mod slice;
pub mod store;

pub use page::{CandidateContext, InsightSlices, InsightsView, PagePhase};
pub use slice::SliceState;
pub use store::{SessionRegistry, ViewStore};

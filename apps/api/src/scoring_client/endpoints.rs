// Paths on the scoring backend. Per-kind analysis paths live on
// `AnalysisKind::endpoint`; everything else is listed here.

pub const BULK_IMPORT: &str = "/processBulkImport";
pub const CANDIDATE_LOOKUP: &str = "/getCandidate";
pub const ASSEMBLE: &str = "/assembleData";
pub const COVER_LETTER: &str = "/generateCoverLetter";

/// `request_type` tag sent with every ad-hoc ranking submission.
pub const ADHOC_REQUEST_TYPE: &str = "adhoc";

//! Fresh analysis: the twelve analysis kinds, their normalized slices, the
//! concurrent orchestrator for a single resume, and sequential bulk ranking.

pub mod bulk;
pub mod coerce;
pub mod kinds;
pub mod orchestrator;
pub mod slices;

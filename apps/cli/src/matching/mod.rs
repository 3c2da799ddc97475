//! Matching — scores unscored jobs against the candidate profile.
//!
//! Three stages: a zero-cost regex pre-filter on titles, a batched Claude
//! scorer with strict per-item validation, and a single-job fallback used
//! only when a batch response is structurally malformed. A job is persisted
//! with a score only if its individual result passed validation; anything
//! ambiguous stays NULL and is retried on the next run.

pub mod pipeline;
pub mod prefilter;
pub mod prompts;
pub mod scorer;

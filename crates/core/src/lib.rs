// crates/core/src/lib.rs
//! Core data model for the litsearch job system.
//!
//! Pure value objects only — persistence, execution, and scheduling live
//! in `litsearch-jobs`. Everything here serializes with `serde` to the
//! on-disk metadata representation.

mod job;

pub use job::{Job, JobConfig, JobStatus, ResultRecord};

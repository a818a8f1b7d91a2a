// crates/core/src/job.rs
//! Job, JobConfig, and the job status state machine.
//!
//! A [`Job`] describes one submitted literature-search run. It is
//! immutable by convention outside the executing worker and the
//! cancellation path; the status transition relation is encoded in
//! [`JobStatus::can_transition_to`] and every writer is expected to
//! respect it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single search result as produced by the search collaborator.
///
/// The job system treats results as opaque ordered records (title,
/// author, url, abstract, provider tag, ...) and persists them verbatim.
pub type ResultRecord = serde_json::Value;

/// Parameters for one search job. Immutable after job creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Result offset to start fetching from.
    #[serde(default)]
    pub start: u32,
    /// Upper bound on fetched results.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Results fetched per batch. Never 0 after [`JobConfig::normalized`].
    #[serde(default = "default_step")]
    pub step: u32,
    /// Only include publications from this year onwards.
    #[serde(default = "default_since_year")]
    pub since_year: i32,
    /// Whether the engine should also fetch linked PDFs.
    #[serde(default)]
    pub download_pdfs: bool,
    /// Restrict the search to these sites; empty means no restriction.
    #[serde(default)]
    pub sites: Vec<String>,
}

fn default_max_results() -> u32 {
    10
}

fn default_step() -> u32 {
    10
}

fn default_since_year() -> i32 {
    2020
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            start: 0,
            max_results: default_max_results(),
            step: default_step(),
            since_year: default_since_year(),
            download_pdfs: false,
            sites: Vec::new(),
        }
    }
}

impl JobConfig {
    /// Return a copy safe for batch arithmetic: a zero `step` is clamped
    /// to 1 so batch-count derivation can never divide by zero.
    pub fn normalized(mut self) -> Self {
        self.step = self.step.max(1);
        self
    }

    /// Number of batches a full run needs. Zero when `max_results`
    /// does not exceed `start`.
    pub fn batch_count(&self) -> u32 {
        let span = self.max_results.saturating_sub(self.start);
        span.div_ceil(self.step.max(1))
    }
}

/// Lifecycle state of a job.
///
/// Transition relation: `Pending → Running → {Completed, Failed,
/// Cancelled}`, plus `Pending → Cancelled` for cancellation before
/// pickup. The three terminal states are absorbing.
///
/// The lowercase string serialization is the persisted wire mapping —
/// renaming a variant here is a storage format change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether this status permits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Running) => true,
            (Self::Pending, Self::Cancelled) => true,
            (Self::Running, Self::Completed | Self::Failed | Self::Cancelled) => true,
            _ => false,
        }
    }

    /// The persisted string form (same mapping serde uses).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted, trackable unit of asynchronous search work.
///
/// Equality is by `id` only; two loads of the same job compare equal
/// even if one is staler than the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub query: String,
    pub status: JobStatus,
    pub config: JobConfig,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Fraction of the run finished, in `[0.0, 1.0]`. Defined as 0.0
    /// before the job starts.
    #[serde(default)]
    pub progress: f64,
    /// Result count reported so far (final count once terminal).
    #[serde(default)]
    pub total_results: u64,
    /// Human-readable failure message, set only on `Failed`.
    #[serde(default)]
    pub error: Option<String>,
}

impl Job {
    /// Create a new job in `Pending` with a fresh timestamp.
    pub fn new(id: Uuid, query: impl Into<String>, config: JobConfig) -> Self {
        Self {
            id,
            query: query.into(),
            status: JobStatus::Pending,
            config: config.normalized(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            progress: 0.0,
            total_results: 0,
            error: None,
        }
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Job {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_string_mapping_is_stable() {
        assert_eq!(JobStatus::Pending.as_str(), "pending");
        assert_eq!(JobStatus::Running.as_str(), "running");
        assert_eq!(JobStatus::Completed.as_str(), "completed");
        assert_eq!(JobStatus::Failed.as_str(), "failed");
        assert_eq!(JobStatus::Cancelled.as_str(), "cancelled");

        // serde must agree with as_str — both are the wire mapping.
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn terminal_states_are_absorbing() {
        let all = [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ];
        for terminal in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for next in all {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn valid_transitions() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Cancelled));

        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Pending));
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Running));
    }

    #[test]
    fn config_defaults_match_legacy_values() {
        let config = JobConfig::default();
        assert_eq!(config.start, 0);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.step, 10);
        assert_eq!(config.since_year, 2020);
        assert!(!config.download_pdfs);
        assert!(config.sites.is_empty());
    }

    #[test]
    fn batch_count_handles_degenerate_ranges() {
        // max_results <= start must not blow up or wrap.
        let config = JobConfig {
            start: 20,
            max_results: 10,
            ..Default::default()
        };
        assert_eq!(config.batch_count(), 0);

        let config = JobConfig {
            start: 10,
            max_results: 10,
            ..Default::default()
        };
        assert_eq!(config.batch_count(), 0);

        // step 0 is clamped, not a division by zero.
        let config = JobConfig {
            start: 0,
            max_results: 5,
            step: 0,
            ..Default::default()
        };
        assert_eq!(config.batch_count(), 5);
        assert_eq!(config.normalized().step, 1);
    }

    #[test]
    fn batch_count_rounds_up() {
        let config = JobConfig {
            start: 0,
            max_results: 25,
            step: 10,
            ..Default::default()
        };
        assert_eq!(config.batch_count(), 3);
    }

    #[test]
    fn job_equality_is_by_id() {
        let a = Job::new(Uuid::new_v4(), "federated learning", JobConfig::default());
        let mut b = a.clone();
        b.status = JobStatus::Running;
        b.progress = 0.7;
        assert_eq!(a, b);

        let c = Job::new(Uuid::new_v4(), "federated learning", JobConfig::default());
        assert_ne!(a, c);
    }

    #[test]
    fn job_metadata_round_trips() {
        let mut job = Job::new(Uuid::new_v4(), "self sovereign identity", JobConfig::default());
        job.status = JobStatus::Failed;
        job.started_at = Some(Utc::now());
        job.completed_at = Some(Utc::now());
        job.progress = 0.4;
        job.total_results = 12;
        job.error = Some("provider timed out".to_string());

        let json = serde_json::to_string_pretty(&job).unwrap();
        let back: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, job.id);
        assert_eq!(back.query, job.query);
        assert_eq!(back.status, job.status);
        assert_eq!(back.config, job.config);
        assert_eq!(back.created_at, job.created_at);
        assert_eq!(back.started_at, job.started_at);
        assert_eq!(back.completed_at, job.completed_at);
        assert_eq!(back.progress, job.progress);
        assert_eq!(back.total_results, job.total_results);
        assert_eq!(back.error, job.error);
    }

    #[test]
    fn job_metadata_tolerates_missing_optional_fields() {
        // Metadata written before a job ever ran only has the required
        // fields; loading must fill the rest with defaults.
        let json = format!(
            r#"{{"id":"{}","query":"q","status":"pending","config":{{}},"created_at":"2026-01-02T03:04:05Z"}}"#,
            Uuid::new_v4()
        );
        let job: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0.0);
        assert_eq!(job.total_results, 0);
        assert!(job.started_at.is_none());
        assert!(job.error.is_none());
        assert_eq!(job.config, JobConfig::default());
    }
}

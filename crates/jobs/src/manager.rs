// crates/jobs/src/manager.rs
//! The façade other subsystems talk to.
//!
//! Everything here is a thin composition of [`JobStore`],
//! [`WorkerPool`], and [`CancelRegistry`]: submission persists and
//! enqueues, reads go straight through the store, cancellation writes
//! the terminal state the running worker will observe cooperatively.
//! No call on this type ever blocks on job execution.
//!
//! Absent-job convention: reads return `None` (or an empty collection);
//! `cancel` returns `Ok(false)`. Nothing here panics on unknown ids.

use std::sync::Arc;

use litsearch_core::{Job, JobConfig, JobStatus, ResultRecord};
use uuid::Uuid;

use crate::cancel::CancelRegistry;
use crate::error::{StoreError, SubmitError};
use crate::pool::WorkerPool;
use crate::store::JobStore;

pub struct JobManager {
    store: Arc<JobStore>,
    pool: WorkerPool,
    cancels: CancelRegistry,
}

impl JobManager {
    /// Compose a manager from its parts. The pool must have been built
    /// over the same store and cancel registry.
    pub fn new(store: Arc<JobStore>, pool: WorkerPool, cancels: CancelRegistry) -> Self {
        Self {
            store,
            pool,
            cancels,
        }
    }

    /// Submit a new search job: persist it as `Pending`, enqueue it,
    /// return its id. Execution happens asynchronously; poll with
    /// [`JobManager::get`] / [`JobManager::status`].
    ///
    /// After [`JobManager::shutdown`] the job is still persisted but
    /// cannot be enqueued, which is reported as an error.
    pub fn submit(&self, query: impl Into<String>, config: JobConfig) -> Result<Uuid, SubmitError> {
        let job = Job::new(Uuid::new_v4(), query, config);
        self.store.save(&job)?;
        if !self.pool.submit(job.id) {
            tracing::warn!(job_id = %job.id, "pool rejected submission, job stays pending");
            return Err(SubmitError::PoolShutDown { id: job.id });
        }
        tracing::info!(job_id = %job.id, query = %job.query, "job submitted");
        Ok(job.id)
    }

    /// Current snapshot of a job, possibly stale by up to one progress
    /// interval.
    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.store.load(id)
    }

    pub fn status(&self, id: Uuid) -> Option<JobStatus> {
        self.get(id).map(|job| job.status)
    }

    pub fn progress(&self, id: Uuid) -> Option<f64> {
        self.get(id).map(|job| job.progress)
    }

    /// Persisted results; empty until the job completed.
    pub fn results(&self, id: Uuid) -> Vec<ResultRecord> {
        self.store.results(id)
    }

    /// Full persisted log text for a job; empty if it never logged.
    pub fn read_logs(&self, id: Uuid) -> String {
        self.store.read_log(id)
    }

    /// Request cancellation. Returns `Ok(false)` if the job is unknown
    /// or already terminal; otherwise writes `Cancelled` and returns
    /// `Ok(true)`. Advisory: a running worker observes the request at
    /// its next stop-check, so cancellation is not instantaneous.
    pub fn cancel(&self, id: Uuid) -> Result<bool, StoreError> {
        let Some(mut job) = self.store.load(id) else {
            return Ok(false);
        };
        if !job.status.can_transition_to(JobStatus::Cancelled) {
            return Ok(false);
        }
        job.status = JobStatus::Cancelled;
        self.store.save(&job)?;
        self.cancels.request(id);
        tracing::info!(job_id = %id, "job cancellation requested");
        Ok(true)
    }

    /// All known jobs, newest first, optionally filtered by status.
    pub fn list(&self, status: Option<JobStatus>) -> Vec<Job> {
        let jobs = self.store.list();
        match status {
            Some(status) => jobs.into_iter().filter(|j| j.status == status).collect(),
            None => jobs,
        }
    }

    /// Drain the pool: in-flight jobs finish or observe cancellation,
    /// queued-but-unstarted jobs stay `Pending` in the store.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

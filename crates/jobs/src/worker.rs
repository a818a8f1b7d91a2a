// crates/jobs/src/worker.rs
//! Executes exactly one job to a terminal state.
//!
//! The worker is the only writer of `Running`, `Completed`, and
//! `Failed`; `Cancelled` is written by whoever requested cancellation
//! and is never overwritten here — the worker re-checks the stored
//! status before every write and backs off once a terminal state is in
//! place (last-writer-respects-terminal).

use std::cell::RefCell;
use std::sync::Arc;

use chrono::Utc;
use litsearch_core::{Job, JobStatus};
use uuid::Uuid;

use crate::cancel::CancelRegistry;
use crate::engine::SearchEngine;
use crate::error::StoreError;
use crate::logger::JobLogger;
use crate::store::JobStore;

/// Runs a single job end-to-end on the calling thread.
pub struct SearchWorker {
    job_id: Uuid,
    store: Arc<JobStore>,
    engine: Arc<dyn SearchEngine>,
    cancels: CancelRegistry,
}

impl SearchWorker {
    pub fn new(
        job_id: Uuid,
        store: Arc<JobStore>,
        engine: Arc<dyn SearchEngine>,
        cancels: CancelRegistry,
    ) -> Self {
        Self {
            job_id,
            store,
            engine,
            cancels,
        }
    }

    /// Drive the job to a terminal state. Blocking; never panics on
    /// job-level failures — those end up in the job's `error` field.
    pub fn run(&self) {
        // The logger is opened first and released by RAII on every exit
        // path, including the missing-job early return below.
        let logger = match JobLogger::open(self.job_id, &self.store.logs_dir(self.job_id)) {
            Ok(logger) => logger,
            Err(e) => {
                tracing::error!(job_id = %self.job_id, "cannot open job log: {e}");
                return;
            }
        };

        let Some(mut job) = self.store.load(self.job_id) else {
            logger.error(&format!("job not found: {}", self.job_id));
            return;
        };

        if !job.status.can_transition_to(JobStatus::Running) {
            // Cancelled before pickup, or a stale duplicate dequeue.
            logger.info(&format!(
                "job is already {}, nothing to execute",
                job.status
            ));
            return;
        }

        logger.info(&format!("worker started for job {}", self.job_id));
        job.status = JobStatus::Running;
        job.started_at = Some(Utc::now());
        if let Err(e) = self.store.save(&job) {
            let msg = format!("failed to persist running state: {e}");
            logger.error(&msg);
            self.finalize(&logger, &mut job, JobStatus::Failed, Some(msg));
            return;
        }

        let query = job.query.clone();
        let config = job.config.clone();
        let job = RefCell::new(job);
        // A storage failure inside the progress callback cannot unwind
        // the engine, so it is latched here, trips the stop-check, and
        // maps to Failed once the engine returns.
        let save_error: RefCell<Option<StoreError>> = RefCell::new(None);

        let should_stop = || {
            if save_error.borrow().is_some() {
                return true;
            }
            if self.cancels.is_cancelled(self.job_id) {
                return true;
            }
            // Authoritative check: cancellation may have been written by
            // another process directly into the store.
            matches!(self.store.load(self.job_id), Some(j) if j.status.is_terminal())
        };

        let mut on_progress = |fraction: f64, count: u64| {
            if save_error.borrow().is_some() {
                return;
            }
            if let Some(current) = self.store.load(self.job_id) {
                if current.status.is_terminal() {
                    return;
                }
            }
            let mut job = job.borrow_mut();
            // Progress is clamped and monotonic within one execution no
            // matter what the engine reports.
            job.progress = fraction.clamp(0.0, 1.0).max(job.progress);
            job.total_results = job.total_results.max(count);
            if let Err(e) = self.store.save(&job) {
                *save_error.borrow_mut() = Some(e);
            }
        };

        let result = self
            .engine
            .search(&query, &config, &mut on_progress, &should_stop, &logger);

        let save_error = save_error.into_inner();
        let mut job = job.into_inner();

        if self.observed_cancellation() {
            // The requester already wrote Cancelled; no terminal write
            // and no results artifact from this run.
            logger.info("job execution stopped due to cancellation");
            return;
        }

        if let Some(e) = save_error {
            let msg = format!("storage error during progress update: {e}");
            logger.error(&msg);
            self.finalize(&logger, &mut job, JobStatus::Failed, Some(msg));
            return;
        }

        match result {
            Ok(results) => {
                if let Err(e) = self.store.save_results(self.job_id, &results) {
                    let msg = format!("failed to persist results: {e}");
                    logger.error(&msg);
                    self.finalize(&logger, &mut job, JobStatus::Failed, Some(msg));
                    return;
                }
                job.total_results = results.len() as u64;
                job.progress = 1.0;
                self.finalize(&logger, &mut job, JobStatus::Completed, None);
                logger.info(&format!(
                    "job completed successfully with {} results",
                    results.len()
                ));
            }
            Err(e) => {
                // `{:#}` keeps the whole error chain in one line.
                let msg = format!("{e:#}");
                logger.error(&format!("job failed: {msg}"));
                self.finalize(&logger, &mut job, JobStatus::Failed, Some(msg));
            }
        }
    }

    /// Whether cancellation was requested for this job, in memory or in
    /// the store.
    fn observed_cancellation(&self) -> bool {
        if self.cancels.is_cancelled(self.job_id) {
            return true;
        }
        matches!(
            self.store.load(self.job_id),
            Some(j) if j.status == JobStatus::Cancelled
        )
    }

    /// Write a terminal state, unless someone else already did.
    fn finalize(
        &self,
        logger: &JobLogger,
        job: &mut Job,
        status: JobStatus,
        error: Option<String>,
    ) {
        if let Some(current) = self.store.load(self.job_id) {
            if current.status.is_terminal() {
                logger.info(&format!(
                    "job already {}, not overwriting with {}",
                    current.status, status
                ));
                return;
            }
        }
        job.status = status;
        job.completed_at = Some(Utc::now());
        if error.is_some() {
            job.error = error;
        }
        if let Err(e) = self.store.save(job) {
            logger.error(&format!("failed to persist terminal state {status}: {e}"));
        }
    }
}

/// Best-effort Failed marker for a job whose worker died without
/// finishing (e.g. a panicking engine). Leaves terminal states alone.
pub(crate) fn mark_failed(store: &JobStore, id: Uuid, message: &str) {
    let Some(mut job) = store.load(id) else {
        return;
    };
    if job.status.is_terminal() {
        return;
    }
    job.status = JobStatus::Failed;
    job.completed_at = Some(Utc::now());
    job.error = Some(message.to_string());
    if let Err(e) = store.save(&job) {
        tracing::error!(job_id = %id, "failed to mark crashed job as failed: {e}");
    }
}

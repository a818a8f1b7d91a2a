// crates/jobs/src/pool.rs
//! Fixed-size worker pool: a bounded concurrency gate plus a dispatch
//! queue.
//!
//! `N` long-lived executor tasks share one FIFO queue of job ids. Each
//! executor runs at most one job at a time, and a job id is dequeued
//! exactly once, so a given job never has two concurrent executions.
//! The queue is deliberately unbounded: `submit` never applies
//! backpressure, trading memory growth under overload for a
//! non-blocking submission path.
//!
//! The job body itself is blocking (network-bound scraping), so each
//! execution is pushed onto the blocking thread pool — effectively one
//! OS thread per concurrently running job.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cancel::CancelRegistry;
use crate::engine::SearchEngine;
use crate::store::JobStore;
use crate::worker::{self, SearchWorker};

/// Dispatches queued job ids to a fixed number of executors.
pub struct WorkerPool {
    tx: mpsc::UnboundedSender<Uuid>,
    shutdown: CancellationToken,
    executors: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawn a pool of `size` executors. Must be called from within a
    /// tokio runtime; construct one pool at process start and inject it
    /// into the [`crate::JobManager`].
    pub fn new(
        size: usize,
        store: Arc<JobStore>,
        engine: Arc<dyn SearchEngine>,
        cancels: CancelRegistry,
    ) -> Self {
        let size = size.max(1);
        let (tx, rx) = mpsc::unbounded_channel();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let shutdown = CancellationToken::new();

        let executors = (0..size)
            .map(|slot| {
                tokio::spawn(executor_loop(
                    slot,
                    Arc::clone(&rx),
                    Arc::clone(&store),
                    Arc::clone(&engine),
                    cancels.clone(),
                    shutdown.clone(),
                ))
            })
            .collect();

        tracing::info!(size, "worker pool started");
        Self {
            tx,
            shutdown,
            executors: std::sync::Mutex::new(executors),
        }
    }

    /// Enqueue a job id for execution. Never blocks; returns whether
    /// the id was accepted (false only after shutdown).
    pub fn submit(&self, id: Uuid) -> bool {
        if self.shutdown.is_cancelled() {
            tracing::warn!(job_id = %id, "pool is shut down, rejecting submission");
            return false;
        }
        self.tx.send(id).is_ok()
    }

    /// Stop dequeuing, let in-flight jobs finish (or observe their
    /// cooperative cancellation), and join every executor.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handles: Vec<JoinHandle<()>> = {
            let mut executors = match self.executors.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            executors.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("executor task failed to join: {e}");
            }
        }
        tracing::info!("worker pool stopped");
    }
}

async fn executor_loop(
    slot: usize,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Uuid>>>,
    store: Arc<JobStore>,
    engine: Arc<dyn SearchEngine>,
    cancels: CancelRegistry,
    shutdown: CancellationToken,
) {
    loop {
        let id = tokio::select! {
            _ = shutdown.cancelled() => break,
            id = async { rx.lock().await.recv().await } => match id {
                Some(id) => id,
                None => break, // all senders gone
            },
        };

        tracing::debug!(slot, job_id = %id, "executor picked up job");
        let worker = SearchWorker::new(id, Arc::clone(&store), Arc::clone(&engine), cancels.clone());
        let run = tokio::task::spawn_blocking(move || worker.run()).await;

        // One job's panic must not take the executor down with it.
        if let Err(e) = run {
            tracing::error!(slot, job_id = %id, "job execution panicked: {e}");
            worker::mark_failed(&store, id, "worker thread panicked");
        }
        cancels.clear(id);
    }
    tracing::debug!(slot, "executor stopped");
}

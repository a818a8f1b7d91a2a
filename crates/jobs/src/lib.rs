// crates/jobs/src/lib.rs
//! Job orchestration for litsearch: durable job storage, a bounded
//! worker pool, cooperative cancellation, and the [`JobManager`] façade
//! other subsystems talk to.
//!
//! Control flow: `JobManager::submit` persists a `Pending` job and
//! enqueues its id on the [`WorkerPool`]. An idle executor dequeues the
//! id and drives a [`SearchWorker`] to a terminal state on the blocking
//! thread pool, persisting progress through the [`JobStore`] as it goes.
//! Callers poll the manager at any time; reads never block on execution.

mod cancel;
mod engine;
mod error;
mod logger;
mod manager;
mod pool;
mod settings;
mod store;
mod worker;

pub use cancel::CancelRegistry;
pub use engine::SearchEngine;
pub use error::{StoreError, SubmitError};
pub use logger::JobLogger;
pub use manager::JobManager;
pub use pool::WorkerPool;
pub use settings::Settings;
pub use store::JobStore;
pub use worker::SearchWorker;

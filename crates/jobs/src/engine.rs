// crates/jobs/src/engine.rs
//! Contract for the external search collaborator.

use litsearch_core::{JobConfig, ResultRecord};

use crate::logger::JobLogger;

/// The search collaborator consumed by [`crate::SearchWorker`].
///
/// Implementations do the actual per-site fetching and scraping, which
/// is blocking network I/O — each invocation runs on its own worker
/// thread and may take minutes.
///
/// Contract:
/// - `on_progress(fraction, result_count)` must be called at least once
///   per logical batch of work; `fraction` is the share of the run
///   finished so far.
/// - `should_stop()` must be checked between batches and the search
///   abandoned promptly when it returns `true`. The partial results of
///   an abandoned run are discarded by the worker.
/// - Any unrecoverable error is returned as an `Err`; the worker maps
///   it into the job's `Failed` state.
pub trait SearchEngine: Send + Sync {
    fn search(
        &self,
        query: &str,
        config: &JobConfig,
        on_progress: &mut dyn FnMut(f64, u64),
        should_stop: &dyn Fn() -> bool,
        logger: &JobLogger,
    ) -> anyhow::Result<Vec<ResultRecord>>;
}

// crates/jobs/src/settings.rs
//! Runtime settings for the job subsystem.
//!
//! Single source of truth for the data directory and pool sizing —
//! eliminates ad-hoc `dirs::data_dir().join(...)` scattered across
//! callers.

use std::path::PathBuf;

/// Environment override for the data directory.
pub const DATA_DIR_ENV: &str = "LITSEARCH_DATA_DIR";
/// Environment override for the worker pool size.
pub const WORKERS_ENV: &str = "LITSEARCH_WORKERS";

/// Default number of concurrent job executors.
pub const DEFAULT_WORKERS: usize = 4;

/// Resolved runtime settings for the job subsystem.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root data directory; job artifacts live under `<data_dir>/jobs`.
    pub data_dir: PathBuf,
    /// Worker pool size.
    pub workers: usize,
}

impl Settings {
    /// Resolve settings from the environment, falling back to the
    /// platform data directory (`~/.local/share/litsearch` on Linux).
    pub fn from_env() -> Self {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("litsearch")))
            .unwrap_or_else(|| PathBuf::from(".data"));

        let workers = std::env::var(WORKERS_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_WORKERS);

        Self { data_dir, workers }
    }

    /// Directory holding one subdirectory per job id.
    pub fn jobs_dir(&self) -> PathBuf {
        self.data_dir.join("jobs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_dir_is_under_data_dir() {
        let settings = Settings {
            data_dir: PathBuf::from("/tmp/litsearch-test"),
            workers: 2,
        };
        assert_eq!(settings.jobs_dir(), PathBuf::from("/tmp/litsearch-test/jobs"));
    }

    #[test]
    fn from_env_yields_positive_worker_count() {
        // Whatever the environment says, the pool size is never zero.
        let settings = Settings::from_env();
        assert!(settings.workers > 0);
    }
}

// crates/jobs/src/store.rs
//! Durable per-job persistence.
//!
//! Layout is one directory per job id under the jobs root:
//!
//! ```text
//! <root>/<job-id>/metadata.json   — all Job fields except results
//! <root>/<job-id>/results.json    — ordered result records, written once
//! <root>/<job-id>/logs/job.log    — append-only per-job log
//! ```
//!
//! Metadata is rewritten many times during execution, so writes go
//! through a temp-file-then-rename so concurrent readers never observe
//! a torn artifact. Write failures propagate to the caller; read
//! failures (missing or corrupt artifacts) are soft and surface as
//! "absent".

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use litsearch_core::{Job, ResultRecord};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::StoreError;

const METADATA_FILE: &str = "metadata.json";
const RESULTS_FILE: &str = "results.json";
const LOGS_DIR: &str = "logs";
const LOG_FILE: &str = "job.log";

/// File-backed store for job metadata and results.
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn metadata_path(&self, id: Uuid) -> PathBuf {
        self.job_dir(id).join(METADATA_FILE)
    }

    fn results_path(&self, id: Uuid) -> PathBuf {
        self.job_dir(id).join(RESULTS_FILE)
    }

    /// Directory the per-job logger writes into.
    pub fn logs_dir(&self, id: Uuid) -> PathBuf {
        self.job_dir(id).join(LOGS_DIR)
    }

    /// Path of the append-only per-job log file.
    pub fn log_path(&self, id: Uuid) -> PathBuf {
        self.logs_dir(id).join(LOG_FILE)
    }

    /// Persist job metadata. Idempotent overwrite; called repeatedly by
    /// the executing worker during a run.
    pub fn save(&self, job: &Job) -> Result<(), StoreError> {
        let dir = self.job_dir(job.id);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let path = self.metadata_path(job.id);
        let json =
            serde_json::to_vec_pretty(job).map_err(|e| StoreError::serialize(&path, e))?;
        write_atomic(&path, &json)
    }

    /// Load job metadata. A corrupt or unreadable artifact is a soft
    /// failure: it is logged and read as absent.
    pub fn load(&self, id: Uuid) -> Option<Job> {
        let path = self.metadata_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(job_id = %id, path = %path.display(), "failed to read job metadata: {e}");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(job) => Some(job),
            Err(e) => {
                tracing::warn!(job_id = %id, path = %path.display(), "corrupt job metadata: {e}");
                None
            }
        }
    }

    /// Persist the full result sequence. Written once, at completion;
    /// kept separate from metadata because result sets can be large.
    pub fn save_results(&self, id: Uuid, results: &[ResultRecord]) -> Result<(), StoreError> {
        let dir = self.job_dir(id);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let path = self.results_path(id);
        let json =
            serde_json::to_vec_pretty(results).map_err(|e| StoreError::serialize(&path, e))?;
        write_atomic(&path, &json)
    }

    /// Load results for a job; empty if the artifact is absent or
    /// unreadable.
    pub fn results(&self, id: Uuid) -> Vec<ResultRecord> {
        let path = self.results_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(job_id = %id, path = %path.display(), "failed to read job results: {e}");
                return Vec::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(job_id = %id, path = %path.display(), "corrupt job results: {e}");
            Vec::new()
        })
    }

    /// Whether a results artifact exists for this job.
    pub fn has_results(&self, id: Uuid) -> bool {
        self.results_path(id).exists()
    }

    /// Enumerate all known jobs, newest first. Entries that are not
    /// job directories or hold corrupt metadata are skipped.
    pub fn list(&self) -> Vec<Job> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(root = %self.root.display(), "failed to enumerate jobs: {e}");
                return Vec::new();
            }
        };

        let mut jobs: Vec<Job> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str().and_then(|s| Uuid::parse_str(s).ok()))
            .filter_map(|id| self.load(id))
            .collect();

        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    /// Full text of the per-job log; empty if nothing was logged.
    pub fn read_log(&self, id: Uuid) -> String {
        fs::read_to_string(self.log_path(id)).unwrap_or_default()
    }
}

/// Write `bytes` to `path` through a sibling temp file plus rename, so
/// a crash mid-write or a concurrent reader can never see half a file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| StoreError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

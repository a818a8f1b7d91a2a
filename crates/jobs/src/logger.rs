// crates/jobs/src/logger.rs
//! Append-only per-job log file.
//!
//! One line per event, `YYYY-MM-DD HH:MM:SS [LEVEL] message`, flushed
//! per write so the file can be tailed while the job runs. Events are
//! mirrored to `tracing` for process-wide observability. Dropping the
//! logger releases the file handle, so every exit path of a worker run
//! cleans up for free.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;

use crate::error::StoreError;

/// Logger scoped to a single job, writing to `<logs_dir>/job.log`.
pub struct JobLogger {
    job_id: Uuid,
    path: PathBuf,
    file: Mutex<BufWriter<File>>,
}

impl JobLogger {
    /// Open (append) the log file for a job, creating the directory if
    /// needed.
    pub fn open(job_id: Uuid, logs_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(logs_dir).map_err(|e| StoreError::io(logs_dir, e))?;
        let path = logs_dir.join("job.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(Self {
            job_id,
            path,
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn info(&self, message: &str) {
        tracing::info!(job_id = %self.job_id, "{message}");
        self.write_line("INFO", message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(job_id = %self.job_id, "{message}");
        self.write_line("WARNING", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(job_id = %self.job_id, "{message}");
        self.write_line("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(job_id = %self.job_id, "{message}");
        self.write_line("DEBUG", message);
    }

    fn write_line(&self, level: &str, message: &str) {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        if writeln!(file, "{timestamp} [{level}] {message}")
            .and_then(|()| file.flush())
            .is_err()
        {
            // A broken log sink must never take the job down with it.
            tracing::warn!(job_id = %self.job_id, path = %self.path.display(), "failed to append job log line");
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_appended_with_level_tags() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let logger = JobLogger::open(id, dir.path()).unwrap();

        logger.info("worker started");
        logger.warn("provider slow");
        logger.error("provider gave up");
        drop(logger);

        let text = std::fs::read_to_string(dir.path().join("job.log")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[INFO] worker started"));
        assert!(lines[1].contains("[WARNING] provider slow"));
        assert!(lines[2].contains("[ERROR] provider gave up"));
    }

    #[test]
    fn reopen_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();

        JobLogger::open(id, dir.path()).unwrap().info("first run");
        JobLogger::open(id, dir.path()).unwrap().info("second run");

        let text = std::fs::read_to_string(dir.path().join("job.log")).unwrap();
        assert!(text.contains("first run"));
        assert!(text.contains("second run"));
    }
}

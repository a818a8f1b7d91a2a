// crates/jobs/src/cancel.rs
//! In-process cancellation flags, one per in-flight job.
//!
//! Cancellation is durable in the store (the canceller writes the
//! `Cancelled` status), but when the manager and workers share a
//! process the worker's stop-check consults this registry first — a
//! flag read is much cheaper than re-reading `metadata.json` between
//! every batch. The stored status remains the authoritative,
//! cross-process signal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

/// Shared, clonable registry of per-job cancellation flags.
#[derive(Clone, Default)]
pub struct CancelRegistry {
    flags: Arc<RwLock<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a job as cancellation-requested.
    pub fn request(&self, id: Uuid) {
        let Ok(mut flags) = self.flags.write() else {
            return;
        };
        flags
            .entry(id)
            .or_insert_with(|| Arc::new(AtomicBool::new(false)))
            .store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested in this process.
    pub fn is_cancelled(&self, id: Uuid) -> bool {
        self.flags
            .read()
            .ok()
            .and_then(|flags| flags.get(&id).map(|f| f.load(Ordering::Relaxed)))
            .unwrap_or(false)
    }

    /// Drop the flag for a finished job so the map doesn't grow with
    /// every job ever run.
    pub fn clear(&self, id: Uuid) {
        if let Ok(mut flags) = self.flags.write() {
            flags.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_then_check_then_clear() {
        let registry = CancelRegistry::new();
        let id = Uuid::new_v4();

        assert!(!registry.is_cancelled(id));
        registry.request(id);
        assert!(registry.is_cancelled(id));

        // Clones observe the same flags.
        assert!(registry.clone().is_cancelled(id));

        registry.clear(id);
        assert!(!registry.is_cancelled(id));
    }

    #[test]
    fn flags_are_independent_per_job() {
        let registry = CancelRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.request(a);
        assert!(registry.is_cancelled(a));
        assert!(!registry.is_cancelled(b));
    }
}

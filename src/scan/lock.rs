//! Per-owner scan locks.
//!
//! One active scan per owner: two concurrent scans would double-write the
//! ledger and race on application mutation. Acquisition is fail-fast — the
//! caller surfaces `ScanAlreadyInProgress` instead of queueing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Registry of owners with a scan in flight.
#[derive(Debug, Clone, Default)]
pub struct ScanLocks {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl ScanLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock for `owner`. Returns `None` when a scan is
    /// already running; the guard releases on drop.
    pub fn try_acquire(&self, owner: &str) -> Option<ScanGuard> {
        let mut held = self.inner.lock().unwrap();
        if !held.insert(owner.to_string()) {
            return None;
        }
        Some(ScanGuard {
            owner: owner.to_string(),
            locks: Arc::clone(&self.inner),
        })
    }
}

/// RAII guard for one owner's scan.
#[derive(Debug)]
pub struct ScanGuard {
    owner: String,
    locks: Arc<Mutex<HashSet<String>>>,
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.locks.lock().unwrap().remove(&self.owner);
    }
}

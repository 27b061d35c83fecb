//! Per-path mutual exclusion.
//!
//! Two writers of the same secret must not interleave their
//! read-merge-write. Writers of different paths proceed in parallel.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Set of paths currently held by a writer.
#[derive(Debug, Default)]
pub struct PathLocks {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

/// Held lock on one path; released on drop.
#[derive(Debug)]
pub struct PathGuard<'a> {
    locks: &'a PathLocks,
    path: String,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `path` is free, then take it.
    pub fn acquire(&self, path: &str) -> PathGuard<'_> {
        let mut held = self.held();
        while held.contains(path) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(|e| e.into_inner());
        }
        held.insert(path.to_string());
        PathGuard {
            locks: self,
            path: path.to_string(),
        }
    }

    fn held(&self) -> MutexGuard<'_, HashSet<String>> {
        self.held.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.locks.held().remove(&self.path);
        self.locks.released.notify_all();
    }
}

//! Change events handed to the synchronization collaborator.

use chrono::{DateTime, Utc};

/// What happened to a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Write,
    Delete,
    Reencrypt,
}

/// A path changed in a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Mount prefix of the store; empty for the root store.
    pub store: String,
    /// Path relative to the store root.
    pub path: String,
    pub kind: ChangeKind,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(store: impl Into<String>, path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            store: store.into(),
            path: path.into(),
            kind,
            at: Utc::now(),
        }
    }
}

/// Result of a re-encryption pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Number of secrets re-encrypted
    pub secrets: usize,
    /// Number of recipients in the current set
    pub recipients: usize,
}

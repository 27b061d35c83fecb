//! Error types.
//!
//! One top-level [`Error`] wraps a focused enum per concern so callers can
//! match on the kind they care about (`Error::Secret(SecretError::AlreadyExists(_))`)
//! while `?` converts everything upward.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mount(#[from] MountError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Recipient(#[from] RecipientError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("not initialized: run `bunker init` first")]
    NotInitialized,

    #[error("already initialized: {0} exists")]
    AlreadyInitialized(PathBuf),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Mount table errors.
#[derive(Error, Debug)]
pub enum MountError {
    #[error("mount point already in use: {0}")]
    AlreadyMounted(String),

    #[error("no store mounted at: {0}")]
    NotMounted(String),

    #[error("invalid secret path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

/// Secret content errors.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("not overwriting your current secret: {0} (use --force to overwrite)")]
    AlreadyExists(String),

    #[error("key '{key}' matches {count} entries")]
    AmbiguousKey { key: String, count: usize },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("{0} cannot contain a line break")]
    LineBreak(&'static str),

    #[error("body line would read back as an attribute")]
    AttributeLikeLine,

    #[error("{0} is not valid UTF-8 text; rewrite it whole instead of setting a key")]
    NotText(String),
}

/// Encryption backend errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("no recipients to encrypt for")]
    NoRecipients,

    #[error("unknown recipient: {0}")]
    UnknownRecipient(String),

    #[error("no private key available to decrypt")]
    NoPrivateKey,

    #[error("ciphertext is corrupt: {0}")]
    Corrupt(String),

    #[error("secret was not encrypted for any local key")]
    WrongRecipient,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("refusing to use the plaintext backend without allow_plaintext = true")]
    PlaintextRefused,

    #[error("unknown cipher: {0}. Supported: age, gpg, plain")]
    UnknownBackend(String),
}

/// Recipient management errors.
#[derive(Error, Debug)]
pub enum RecipientError {
    #[error("unknown identity: {0}")]
    UnknownIdentity(String),

    #[error("recipient already present: {0}")]
    AlreadyPresent(String),

    #[error("recipient not present: {0}")]
    NotPresent(String),

    #[error("refusing to remove the last recipient: {0}")]
    LastRecipient(String),

    #[error("key {0} has no name or email")]
    IdentityMetadataMissing(String),
}

/// Interactive selection errors.
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("selection aborted: {0}")]
    Aborted(String),
}

/// Store persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("bad recipients manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Short remediation hint for the CLI, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::Config(ConfigError::NotInitialized) => Some("run: bunker init"),
            Error::Secret(SecretError::AlreadyExists(_)) => Some("pass --force to overwrite"),
            Error::Cipher(CipherError::NoPrivateKey) => {
                Some("check that a matching private key is available locally")
            }
            Error::Cipher(CipherError::PlaintextRefused) => {
                Some("set allow_plaintext = true under [session] for test stores only")
            }
            _ => None,
        }
    }
}

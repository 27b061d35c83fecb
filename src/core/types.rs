//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A key ID or fingerprint as reported by a cipher backend
/// (e.g. `age1...`, a GPG fingerprint, `0xDEADBEEF`).
pub type KeyId = String;

/// An attribute key inside a secret (e.g. `user`, `url`).
pub type AttributeKey = String;

/// A mount point prefix in `a/b` form. The empty string is the root store.
pub type MountPrefix = String;

/// Encrypted blob bytes as written to disk.
pub type Ciphertext = Vec<u8>;

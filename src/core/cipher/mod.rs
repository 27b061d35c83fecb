//! Cryptographic backends.
//!
//! Every store is bound to one backend at configuration time. The backend is
//! never inferred from blob content.
//!
//! ## Backends
//!
//! - **age**: Default. x25519 public-key encryption with ASCII armor.
//! - **gpg**: GnuPG via the `gpg` CLI and the user's keyring.
//! - **plain**: No encryption. Test and development stores only; refused
//!   unless `allow_plaintext` is set.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Cipher` trait
//! 2. Add the implementation in a new file
//! 3. Add a variant to `CipherBackend`

use crate::core::domain::KeyInfo;
use crate::core::types::{Ciphertext, KeyId};
use crate::error::Result;

mod age;
mod backend;
mod gpg;
mod plain;

pub use age::{local_user, parse_recipient, Age};
pub use backend::CipherBackend;
pub use gpg::Gpg;
pub use plain::Plain;

/// Cryptographic backend trait.
///
/// Recipients and key IDs are backend-specific strings:
/// - age: public keys (age1...)
/// - GPG: key fingerprints
/// - plain: fixed fake IDs
pub trait Cipher: Send + Sync {
    /// Backend name for diagnostics and config.
    fn name(&self) -> &'static str;

    /// File extension of blobs written by this backend, without the dot.
    fn ext(&self) -> &'static str;

    /// Name of the recipients manifest at the store root.
    fn ids_file(&self) -> &'static str;

    /// Encrypt plaintext for every recipient.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::NoRecipients` if `recipients` is empty and
    /// `CipherError::UnknownRecipient` if one cannot be resolved.
    fn encrypt(&self, plaintext: &[u8], recipients: &[KeyId]) -> Result<Ciphertext>;

    /// Decrypt with whatever private keys the backend holds.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::NoPrivateKey`, `CipherError::Corrupt` or
    /// `CipherError::WrongRecipient`.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// IDs of locally available private keys, in a stable order.
    fn list_private_key_ids(&self) -> Result<Vec<KeyId>>;

    /// IDs of known public keys, in a stable order.
    fn list_public_key_ids(&self) -> Result<Vec<KeyId>>;

    /// Name/email metadata for a key, if the backend knows any.
    fn key_info(&self, id: &str) -> Result<Option<KeyInfo>>;

    /// Whether `id` can be resolved to a public key.
    fn resolves(&self, id: &str) -> Result<bool> {
        Ok(self.list_public_key_ids()?.iter().any(|k| k == id))
    }
}

//! Cipher backend selection and dispatch.
//!
//! Each store names its backend in config; `CipherBackend` is the closed set
//! of choices and forwards the `Cipher` capability set to the variant.

use std::path::Path;

use tracing::debug;

use super::{Age, Cipher, Gpg, Plain};
use crate::core::domain::KeyInfo;
use crate::core::types::{Ciphertext, KeyId};
use crate::error::{CipherError, Result};

/// Cipher backend for a store.
pub enum CipherBackend {
    /// age encryption (default)
    Age(Age),
    /// GPG encryption via the gpg CLI
    Gpg(Gpg),
    /// No encryption, test and development only
    Plain(Plain),
}

impl std::fmt::Debug for CipherBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CipherBackend({})", self.name())
    }
}

impl CipherBackend {
    /// Create a backend from its config name.
    ///
    /// # Arguments
    ///
    /// * `name` - `age`, `gpg` or `plain`
    /// * `age_dir` - Directory holding age identities and keyring
    /// * `allow_plaintext` - Development flag gating the `plain` backend
    ///
    /// # Errors
    ///
    /// Returns `CipherError::PlaintextRefused` for `plain` without the flag
    /// and `CipherError::UnknownBackend` for anything else unrecognized.
    pub fn from_name(name: &str, age_dir: &Path, allow_plaintext: bool) -> Result<Self> {
        match name {
            "age" => {
                debug!("creating age cipher backend");
                Ok(Self::Age(Age::load(age_dir)?))
            }
            "gpg" => {
                debug!("creating gpg cipher backend");
                Ok(Self::Gpg(Gpg::new()?))
            }
            "plain" if allow_plaintext => {
                debug!("creating plain cipher backend");
                Ok(Self::Plain(Plain::new()))
            }
            "plain" => Err(CipherError::PlaintextRefused.into()),
            other => Err(CipherError::UnknownBackend(other.to_string()).into()),
        }
    }

    fn inner(&self) -> &dyn Cipher {
        match self {
            Self::Age(c) => c,
            Self::Gpg(c) => c,
            Self::Plain(c) => c,
        }
    }
}

impl Cipher for CipherBackend {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn ext(&self) -> &'static str {
        self.inner().ext()
    }

    fn ids_file(&self) -> &'static str {
        self.inner().ids_file()
    }

    fn encrypt(&self, plaintext: &[u8], recipients: &[KeyId]) -> Result<Ciphertext> {
        self.inner().encrypt(plaintext, recipients)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.inner().decrypt(ciphertext)
    }

    fn list_private_key_ids(&self) -> Result<Vec<KeyId>> {
        self.inner().list_private_key_ids()
    }

    fn list_public_key_ids(&self) -> Result<Vec<KeyId>> {
        self.inner().list_public_key_ids()
    }

    fn key_info(&self, id: &str) -> Result<Option<KeyInfo>> {
        self.inner().key_info(id)
    }

    fn resolves(&self, id: &str) -> Result<bool> {
        self.inner().resolves(id)
    }
}

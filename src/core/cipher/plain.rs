//! Plaintext backend for tests and development.
//!
//! Stores content unencrypted. Only selectable when the config sets
//! `allow_plaintext = true`; see `CipherBackend::from_name`.

use tracing::trace;

use super::Cipher;
use crate::core::domain::KeyInfo;
use crate::core::types::{Ciphertext, KeyId};
use crate::error::{CipherError, Result};

/// The one private key the plain backend pretends to hold.
pub const PLAIN_PRIVATE_KEY: &str = "0xDEADBEEF";

/// Public keys the plain backend knows about.
pub const PLAIN_PUBLIC_KEYS: &[&str] = &[PLAIN_PRIVATE_KEY, "0xFEEDBEEF"];

/// No-op cipher with a fixed fake keyring.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Plain {
    pub fn new() -> Self {
        Self
    }
}

impl Cipher for Plain {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn ext(&self) -> &'static str {
        "txt"
    }

    fn ids_file(&self) -> &'static str {
        ".plain-ids"
    }

    fn encrypt(&self, plaintext: &[u8], recipients: &[KeyId]) -> Result<Ciphertext> {
        trace!(recipients = recipients.len(), "plain encrypt");
        if recipients.is_empty() {
            return Err(CipherError::NoRecipients.into());
        }
        if let Some(unknown) = recipients
            .iter()
            .find(|r| !PLAIN_PUBLIC_KEYS.contains(&r.as_str()))
        {
            return Err(CipherError::UnknownRecipient(unknown.clone()).into());
        }
        Ok(plaintext.to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        Ok(ciphertext.to_vec())
    }

    fn list_private_key_ids(&self) -> Result<Vec<KeyId>> {
        Ok(vec![PLAIN_PRIVATE_KEY.to_string()])
    }

    fn list_public_key_ids(&self) -> Result<Vec<KeyId>> {
        Ok(PLAIN_PUBLIC_KEYS.iter().map(|k| k.to_string()).collect())
    }

    fn key_info(&self, id: &str) -> Result<Option<KeyInfo>> {
        Ok(match id {
            PLAIN_PRIVATE_KEY => Some(KeyInfo::new("Dead Beef", "dead.beef@example.com")),
            "0xFEEDBEEF" => Some(KeyInfo::new("Feed Beef", "feed.beef@example.com")),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_identity_transform() {
        let plain = Plain::new();
        let ct = plain
            .encrypt(b"moar", &[PLAIN_PRIVATE_KEY.to_string()])
            .unwrap();
        assert_eq!(ct, b"moar");
        assert_eq!(plain.decrypt(&ct).unwrap(), b"moar");
    }

    #[test]
    fn test_rejects_empty_and_unknown_recipients() {
        let plain = Plain::new();
        assert!(matches!(
            plain.encrypt(b"x", &[]),
            Err(Error::Cipher(CipherError::NoRecipients))
        ));
        assert!(matches!(
            plain.encrypt(b"x", &["0xCAFE".to_string()]),
            Err(Error::Cipher(CipherError::UnknownRecipient(_)))
        ));
    }

    #[test]
    fn test_keyring() {
        let plain = Plain::new();
        assert_eq!(plain.list_private_key_ids().unwrap(), vec!["0xDEADBEEF"]);
        assert!(plain.resolves("0xFEEDBEEF").unwrap());
        assert!(!plain.resolves("0xCAFE").unwrap());
        assert!(plain.key_info("0xDEADBEEF").unwrap().unwrap().is_complete());
    }
}

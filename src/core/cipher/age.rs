//! Age encryption backend implementation.
//!
//! Provides encryption/decryption using the age format with x25519 keys
//! and ASCII armor encoding. Private identities live in an identities file
//! (one `AGE-SECRET-KEY-...` per line); optional display metadata for
//! recipients lives in `keyring.toml` next to it.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use ::age::x25519;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::Cipher;
use crate::core::constants::{AGE_IDENTITIES_FILE, AGE_KEYRING_FILE};
use crate::core::domain::KeyInfo;
use crate::core::types::{Ciphertext, KeyId};
use crate::error::{CipherError, Error, Result, StoreError};

/// Age-based cryptographic backend using x25519 keys
pub struct Age {
    identities: Vec<x25519::Identity>,
    keyring: BTreeMap<KeyId, KeyInfo>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyringFile {
    #[serde(default)]
    keys: BTreeMap<KeyId, KeyringEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyringEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

impl Age {
    /// Backend holding the given identities and no keyring metadata.
    pub fn new(identities: Vec<x25519::Identity>) -> Self {
        Self {
            identities,
            keyring: BTreeMap::new(),
        }
    }

    /// Attach display metadata for a recipient.
    pub fn with_key_info(mut self, id: impl Into<KeyId>, info: KeyInfo) -> Self {
        self.keyring.insert(id.into(), info);
        self
    }

    /// Load identities and keyring from `dir`. Missing files yield an empty
    /// backend that can still encrypt.
    pub fn load(dir: &Path) -> Result<Self> {
        let identities_path = dir.join(AGE_IDENTITIES_FILE);
        debug!(path = %identities_path.display(), "loading age identities");

        let identities = if identities_path.exists() {
            warn_if_insecure(&identities_path);
            let contents = fs::read_to_string(&identities_path).map_err(|source| {
                StoreError::Read {
                    path: identities_path.clone(),
                    source,
                }
            })?;
            parse_identities(&identities_path, &contents)?
        } else {
            Vec::new()
        };

        let keyring_path = dir.join(AGE_KEYRING_FILE);
        let keyring = if keyring_path.exists() {
            let contents = fs::read_to_string(&keyring_path).map_err(|source| {
                StoreError::Read {
                    path: keyring_path.clone(),
                    source,
                }
            })?;
            let file: KeyringFile =
                toml::from_str(&contents).map_err(|e| StoreError::Manifest {
                    path: keyring_path.clone(),
                    reason: e.to_string(),
                })?;
            file.keys
                .into_iter()
                .map(|(id, e)| (id, KeyInfo::new(e.name, e.email)))
                .collect()
        } else {
            BTreeMap::new()
        };

        debug!(
            identities = identities.len(),
            keyring = keyring.len(),
            "age backend loaded"
        );

        Ok(Self {
            identities,
            keyring,
        })
    }

    /// Generate a new identity, append it to the identities file in `dir`
    /// (mode 0600 on Unix) and record its metadata in the keyring.
    ///
    /// # Returns
    ///
    /// The new public key (starts with "age1...").
    pub fn generate(dir: &Path, info: KeyInfo) -> Result<KeyId> {
        debug!(path = %dir.display(), "generating new age identity");

        let identity = x25519::Identity::generate();
        let public_key = identity.to_public().to_string();

        fs::create_dir_all(dir).map_err(|source| write_err(dir, source))?;

        let identities_path = dir.join(AGE_IDENTITIES_FILE);
        let mut contents = if identities_path.exists() {
            fs::read_to_string(&identities_path).map_err(|source| StoreError::Read {
                path: identities_path.clone(),
                source,
            })?
        } else {
            String::new()
        };

        use ::age::secrecy::ExposeSecret;
        let secret_str = identity.to_string();
        contents.push_str(&format!("# public key: {}\n", public_key));
        contents.push_str(secret_str.expose_secret());
        contents.push('\n');
        fs::write(&identities_path, contents).map_err(|source| write_err(&identities_path, source))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&identities_path, fs::Permissions::from_mode(0o600))
                .map_err(|source| write_err(&identities_path, source))?;
        }

        let keyring_path = dir.join(AGE_KEYRING_FILE);
        let mut keyring: KeyringFile = if keyring_path.exists() {
            let existing = fs::read_to_string(&keyring_path).map_err(|source| StoreError::Read {
                path: keyring_path.clone(),
                source,
            })?;
            toml::from_str(&existing).map_err(|e| StoreError::Manifest {
                path: keyring_path.clone(),
                reason: e.to_string(),
            })?
        } else {
            KeyringFile::default()
        };
        keyring.keys.insert(
            public_key.clone(),
            KeyringEntry {
                name: info.name,
                email: info.email,
            },
        );
        let serialized = toml::to_string_pretty(&keyring).map_err(|e| StoreError::Manifest {
            path: keyring_path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&keyring_path, serialized).map_err(|source| write_err(&keyring_path, source))?;

        debug!(path = %identities_path.display(), "age identity saved");
        Ok(public_key)
    }
}

impl Cipher for Age {
    fn name(&self) -> &'static str {
        "age"
    }

    fn ext(&self) -> &'static str {
        "age"
    }

    fn ids_file(&self) -> &'static str {
        ".age-recipients"
    }

    fn encrypt(&self, plaintext: &[u8], recipients: &[KeyId]) -> Result<Ciphertext> {
        trace!(
            recipients = recipients.len(),
            plaintext_len = plaintext.len(),
            "encrypting"
        );

        if recipients.is_empty() {
            return Err(CipherError::NoRecipients.into());
        }
        let recipients = recipients
            .iter()
            .map(|r| parse_recipient(r))
            .collect::<Result<Vec<_>>>()?;

        let encryptor =
            ::age::Encryptor::with_recipients(recipients.iter().map(|r| r as &dyn ::age::Recipient))
                .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        let mut encrypted = Vec::new();
        let mut writer = encryptor
            .wrap_output(::age::armor::ArmoredWriter::wrap_output(
                &mut encrypted,
                ::age::armor::Format::AsciiArmor,
            )?)
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        writer.write_all(plaintext)?;
        let armored = writer
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
        armored
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(format!("armor: {}", e)))?;

        trace!(ciphertext_len = encrypted.len(), "encrypted");
        Ok(encrypted)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting");

        if self.identities.is_empty() {
            return Err(CipherError::NoPrivateKey.into());
        }

        let reader = ::age::armor::ArmoredReader::new(ciphertext);
        let decryptor =
            ::age::Decryptor::new(reader).map_err(|e| CipherError::Corrupt(format!("{}", e)))?;

        if decryptor.is_scrypt() {
            return Err(CipherError::DecryptionFailed(
                "passphrase-encrypted files are not supported".to_string(),
            )
            .into());
        }

        let mut reader = decryptor
            .decrypt(self.identities.iter().map(|i| i as &dyn ::age::Identity))
            .map_err(|e| match e {
                ::age::DecryptError::NoMatchingKeys => CipherError::WrongRecipient,
                other => CipherError::DecryptionFailed(format!("{}", other)),
            })?;

        let mut decrypted = Vec::new();
        reader
            .read_to_end(&mut decrypted)
            .map_err(|e| CipherError::Corrupt(format!("{}", e)))?;

        trace!(plaintext_len = decrypted.len(), "decrypted");
        Ok(decrypted)
    }

    fn list_private_key_ids(&self) -> Result<Vec<KeyId>> {
        Ok(self
            .identities
            .iter()
            .map(|i| i.to_public().to_string())
            .collect())
    }

    fn list_public_key_ids(&self) -> Result<Vec<KeyId>> {
        let mut ids = self.list_private_key_ids()?;
        for id in self.keyring.keys() {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        Ok(ids)
    }

    /// Keyring metadata, or the local user for an owned key without any.
    fn key_info(&self, id: &str) -> Result<Option<KeyInfo>> {
        if let Some(info) = self.keyring.get(id) {
            return Ok(Some(info.clone()));
        }
        let owned = self.identities.iter().any(|i| i.to_public().to_string() == id);
        Ok(owned.then(local_user))
    }

    /// Any well-formed age recipient can be encrypted to.
    fn resolves(&self, id: &str) -> Result<bool> {
        Ok(parse_recipient(id).is_ok())
    }
}

/// Parse a public key string into an age recipient
///
/// # Errors
///
/// Returns `CipherError::UnknownRecipient` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.parse::<x25519::Recipient>()
        .map_err(|_| CipherError::UnknownRecipient(key.to_string()).into())
}

/// Display metadata for the user running bunker.
pub fn local_user() -> KeyInfo {
    let username = whoami::username();
    let host = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());
    KeyInfo::new(whoami::realname(), format!("{}@{}", username, host))
}

fn parse_identities(path: &Path, contents: &str) -> Result<Vec<x25519::Identity>> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| {
            l.parse::<x25519::Identity>().map_err(|e: &str| {
                Error::from(StoreError::Manifest {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            })
        })
        .collect()
}

fn warn_if_insecure(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mode = metadata.permissions().mode() & 0o777;
            if mode != 0o600 {
                warn!(
                    path = %path.display(),
                    mode = %format!("{:o}", mode),
                    "insecure key file permissions"
                );
            }
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

fn write_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Write {
        path: PathBuf::from(path),
        source,
    }
}

//! One encrypted secret tree.
//!
//! A store is a directory of blobs, one per secret, named `<path>.<ext>`
//! where the extension comes from the store's cipher. The recipients
//! manifest at the root lists the key IDs every blob is encrypted for.
//!
//! ```text
//! <root>/
//!   .age-recipients
//!   web/github.age
//!   web/gitlab.age
//! ```

mod fs;
mod lock;
mod manifest;

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, instrument};
use zeroize::Zeroizing;

use crate::core::cipher::Cipher;
use crate::core::domain::{SecretPath, SyncResult};
use crate::core::types::{KeyId, MountPrefix};
use crate::error::{MountError, Result, SecretError};

pub use lock::{PathGuard, PathLocks};

/// A secret tree plus the cipher and recipients used for it.
pub struct Store {
    prefix: MountPrefix,
    root: PathBuf,
    cipher: Box<dyn Cipher>,
    recipients: RwLock<Vec<KeyId>>,
    locks: PathLocks,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("prefix", &self.prefix)
            .field("root", &self.root)
            .field("cipher", &self.cipher.name())
            .field("recipients", &*self.read_recipients())
            .finish()
    }
}

impl Store {
    /// Open the store at `root`, mounted at `prefix` (empty for the root store).
    ///
    /// A missing directory or manifest is not an error; the store simply has
    /// no secrets and no recipients yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Manifest` if the recipients manifest is malformed.
    pub fn open(
        prefix: impl Into<MountPrefix>,
        root: impl Into<PathBuf>,
        cipher: impl Cipher + 'static,
    ) -> Result<Self> {
        let root = root.into();
        let cipher: Box<dyn Cipher> = Box::new(cipher);
        let ids = manifest::load(&root.join(cipher.ids_file()))?;
        let prefix = prefix.into();

        debug!(
            prefix = %prefix,
            root = %root.display(),
            cipher = cipher.name(),
            recipients = ids.len(),
            "opened store"
        );

        Ok(Self {
            prefix,
            root,
            cipher,
            recipients: RwLock::new(ids),
            locks: PathLocks::new(),
        })
    }

    /// Mount prefix of this store; empty for the root store.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cipher(&self) -> &dyn Cipher {
        self.cipher.as_ref()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(self.cipher.ids_file())
    }

    /// Snapshot of the current recipient set.
    pub fn recipients(&self) -> Vec<KeyId> {
        self.read_recipients().clone()
    }

    /// Change the recipient set under the store's write lock and persist it.
    ///
    /// `change` works on a copy; nothing is kept if it or the save fails.
    pub fn update_recipients<F>(&self, change: F) -> Result<Vec<KeyId>>
    where
        F: FnOnce(&mut Vec<KeyId>) -> Result<()>,
    {
        let mut guard = self.write_recipients();
        let mut next = guard.clone();
        change(&mut next)?;
        manifest::save(&self.manifest_path(), &next)?;
        *guard = next.clone();
        Ok(next)
    }

    /// On-disk location of the blob for `rel`.
    ///
    /// # Errors
    ///
    /// Returns `MountError::InvalidPath` for the empty path.
    pub fn blob_path(&self, rel: &SecretPath) -> Result<PathBuf> {
        let segments = rel.segments();
        let Some((last, dirs)) = segments.split_last() else {
            return Err(MountError::InvalidPath {
                path: rel.to_string(),
                reason: "a secret needs a name".to_string(),
            }
            .into());
        };
        let mut path = self.root.clone();
        for dir in dirs {
            path.push(dir);
        }
        path.push(format!("{}.{}", last, self.cipher.ext()));
        Ok(path)
    }

    /// Whether a blob exists for `rel`.
    pub fn exists(&self, rel: &SecretPath) -> bool {
        self.blob_path(rel).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Take the per-path write lock for `rel`.
    pub fn lock(&self, rel: &SecretPath) -> PathGuard<'_> {
        self.locks.acquire(&rel.as_string())
    }

    /// Read and decrypt the blob for `rel`.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::NotFound` if there is no blob, or the cipher's
    /// error if decryption fails.
    #[instrument(skip(self), fields(store = %self.prefix))]
    pub fn read(&self, rel: &SecretPath) -> Result<Zeroizing<Vec<u8>>> {
        let path = self.blob_path(rel)?;
        if !path.is_file() {
            return Err(SecretError::NotFound(rel.as_string()).into());
        }
        let ciphertext = fs::read(&path)?;
        Ok(Zeroizing::new(self.cipher.decrypt(&ciphertext)?))
    }

    /// Encrypt `plaintext` for `recipients` and atomically replace the blob.
    #[instrument(skip(self, plaintext, recipients), fields(store = %self.prefix))]
    pub fn write(&self, rel: &SecretPath, plaintext: &[u8], recipients: &[KeyId]) -> Result<()> {
        let path = self.blob_path(rel)?;
        let ciphertext = self.cipher.encrypt(plaintext, recipients)?;
        fs::write_atomic(&path, &ciphertext)?;
        debug!(path = %rel, bytes = ciphertext.len(), "wrote blob");
        Ok(())
    }

    /// Delete the blob for `rel` and prune directories left empty.
    pub fn remove(&self, rel: &SecretPath) -> Result<()> {
        let path = self.blob_path(rel)?;
        if !path.is_file() {
            return Err(SecretError::NotFound(rel.as_string()).into());
        }
        fs::remove_and_prune(&self.root, &path)
    }

    /// Every secret in this store, sorted.
    pub fn list(&self) -> Result<Vec<SecretPath>> {
        fs::walk(&self.root, self.cipher.ext())?
            .into_iter()
            .map(|rel| SecretPath::parse(&rel).map_err(Into::into))
            .collect()
    }

    /// Re-encrypt every secret for the current recipient set.
    ///
    /// Run after the set changes so removed recipients lose access to
    /// future versions and added ones gain it.
    #[instrument(skip(self), fields(store = %self.prefix))]
    pub fn reencrypt(&self) -> Result<SyncResult> {
        let recipients = self.recipients();
        let secrets = self.list()?;

        for rel in &secrets {
            let _guard = self.lock(rel);
            let plaintext = self.read(rel)?;
            self.write(rel, &plaintext, &recipients)?;
        }

        info!(
            secrets = secrets.len(),
            recipients = recipients.len(),
            "re-encrypted store"
        );

        Ok(SyncResult {
            secrets: secrets.len(),
            recipients: recipients.len(),
        })
    }

    fn read_recipients(&self) -> RwLockReadGuard<'_, Vec<KeyId>> {
        self.recipients.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_recipients(&self) -> RwLockWriteGuard<'_, Vec<KeyId>> {
        self.recipients.write().unwrap_or_else(|e| e.into_inner())
    }
}

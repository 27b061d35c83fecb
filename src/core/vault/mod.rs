//! The primary interface for bunker operations.
//!
//! A `Vault` owns the configuration, the mount table of stores and the
//! injected collaborators (prompt, notifier). Secret operations live in
//! `secrets.rs`, recipient operations in `team.rs`.

mod secrets;
mod team;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::cipher::{local_user, Age, Cipher, CipherBackend};
use crate::core::config::{Config, StoreConfig};
use crate::core::domain::{ChangeEvent, ChangeKind, SecretPath, SyncResult};
use crate::core::mount::{MountPointer, MountTable, Resolved};
use crate::core::prompt::{Defaults, Prompt, Terminal};
use crate::core::recipients;
use crate::core::session::Session;
use crate::core::store::Store;
use crate::core::sync::{NoopNotifier, Notifier};
use crate::error::{ConfigError, MountError, Result};

pub use secrets::{Existence, InsertOptions, InsertOutcome, ShowOptions, Shown};

/// The primary interface for bunker operations.
pub struct Vault {
    config: Config,
    config_path: PathBuf,
    session: Session,
    mounts: MountTable<Store>,
    prompt: Box<dyn Prompt>,
    notifier: Box<dyn Notifier>,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("config_path", &self.config_path)
            .field("session", &self.session)
            .field("mounts", &self.mounts)
            .finish()
    }
}

impl Vault {
    /// Open the vault described by the config file at `config_path`.
    ///
    /// The prompt defaults to the terminal for interactive sessions and to
    /// [`Defaults`] otherwise; the notifier defaults to [`NoopNotifier`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if there is no config file, or
    /// any error from opening a store.
    pub fn open(config_path: &Path, session: Session) -> Result<Self> {
        let config = Config::load(config_path)?;
        Self::from_config(config, config_path, session)
    }

    /// Create a new vault: write `config` to `config_path` and give the root
    /// store its first recipient.
    ///
    /// For age stores without a local identity, one is generated first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AlreadyInitialized` if the config file exists.
    pub fn create(config_path: &Path, config: Config, session: Session) -> Result<Self> {
        if config_path.exists() {
            return Err(ConfigError::AlreadyInitialized(config_path.to_path_buf()).into());
        }
        config.validate()?;

        if config.root.cipher == "age" {
            let age_dir = config.age_dir(config_path);
            if Age::load(&age_dir)?.list_private_key_ids()?.is_empty() {
                let public = Age::generate(&age_dir, local_user())?;
                info!(key = %public, "generated age identity");
            }
        }

        let vault = Self::from_config(config, config_path, session)?;
        vault.seed_recipients(vault.mounts.root())?;
        vault.config.save(config_path)?;

        info!(path = %config_path.display(), "vault initialized");
        Ok(vault)
    }

    /// Open the vault for an already loaded `config`. Config writes (mount,
    /// unmount) go to `config_path`.
    pub fn from_config(config: Config, config_path: &Path, session: Session) -> Result<Self> {
        let root = open_store(&config, config_path, "", &config.root)?;
        let mut mounts = MountTable::new(root);
        for (prefix, store_config) in &config.mounts {
            let store = open_store(&config, config_path, prefix, store_config)?;
            mounts.mount(prefix, store)?;
        }

        let prompt: Box<dyn Prompt> = if session.interactive {
            Box::new(Terminal)
        } else {
            Box::new(Defaults)
        };

        debug!(mounts = config.mounts.len(), "vault opened");

        Ok(Self {
            config,
            config_path: config_path.to_path_buf(),
            session,
            mounts,
            prompt,
            notifier: Box::new(NoopNotifier),
        })
    }

    /// Replace the prompt used for questions.
    pub fn with_prompt(mut self, prompt: impl Prompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Replace the notifier that receives change events.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn prompt(&self) -> &dyn Prompt {
        self.prompt.as_ref()
    }

    /// The root store.
    pub fn root(&self) -> &Store {
        self.mounts.root()
    }

    /// The store mounted exactly at `prefix`; `""` is the root store.
    pub fn store(&self, prefix: &str) -> Result<&Store> {
        self.mounts
            .get(prefix)
            .ok_or_else(|| MountError::NotMounted(prefix.to_string()).into())
    }

    /// Route a path to its store.
    pub fn resolve(&self, path: &SecretPath) -> Resolved<'_, Store> {
        self.mounts.resolve(path)
    }

    /// Mount a new store at `prefix` and persist it to the config.
    ///
    /// A store without recipients gets the caller's private key as its
    /// first one.
    pub fn mount(&mut self, prefix: &str, store_config: StoreConfig) -> Result<()> {
        let prefix = SecretPath::parse(prefix)?.as_string();
        if self.mounts.get(&prefix).is_some() {
            return Err(MountError::AlreadyMounted(prefix).into());
        }

        let mut next = self.config.clone();
        next.mounts.insert(prefix.clone(), store_config.clone());
        next.validate()?;

        let store = open_store(&next, &self.config_path, &prefix, &store_config)?;
        if store.recipients().is_empty() {
            self.seed_recipients(&store)?;
        }
        self.mounts.mount(&prefix, store)?;

        next.save(&self.config_path)?;
        self.config = next;
        Ok(())
    }

    /// Unmount the store at `prefix` and drop it from the config. Its files
    /// are left alone.
    pub fn unmount(&mut self, prefix: &str) -> Result<()> {
        let prefix = SecretPath::parse(prefix)?.as_string();
        self.mounts.unmount(&prefix)?;
        self.config.mounts.remove(&prefix);
        self.config.save(&self.config_path)
    }

    /// Mounted prefixes, root excluded, sorted.
    pub fn mount_points(&self) -> Vec<String> {
        self.mounts.mount_points()
    }

    /// Ask which store to use; `""` for root.
    pub fn ask_for_store(&self) -> String {
        crate::core::mount::ask_for_store(&self.session, &self.mounts, self.prompt.as_ref())
    }

    /// Re-encrypt every store for its current recipients.
    pub fn reencrypt(&self) -> Result<Vec<(String, SyncResult)>> {
        let mut results = Vec::new();
        for (prefix, store) in self.mounts.stores() {
            let result = store.reencrypt()?;
            for path in store.list()? {
                self.notify(prefix, &path, ChangeKind::Reencrypt);
            }
            results.push((prefix.to_string(), result));
        }
        Ok(results)
    }

    fn seed_recipients(&self, store: &Store) -> Result<()> {
        let key = recipients::ask_for_private_key(
            &self.session,
            store.cipher(),
            self.prompt.as_ref(),
            "the new store",
        )?;
        recipients::add_recipient(store, &key)
    }

    fn notify(&self, store: &str, path: &SecretPath, kind: ChangeKind) {
        self.notifier
            .changed(&ChangeEvent::new(store, path.as_string(), kind));
    }
}

impl MountPointer for Vault {
    fn mount_points(&self) -> Vec<String> {
        self.mounts.mount_points()
    }
}

fn open_store(
    config: &Config,
    config_path: &Path,
    prefix: &str,
    store_config: &StoreConfig,
) -> Result<Store> {
    let cipher = CipherBackend::from_name(
        &store_config.cipher,
        &config.age_dir(config_path),
        config.session.allow_plaintext,
    )?;
    Store::open(prefix, &store_config.path, cipher)
}

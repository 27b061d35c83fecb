//! Configuration file management.
//!
//! Handles reading, writing, and validating `config.toml`:
//!
//! ```toml
//! [bunker]
//! version = "0.1.0"
//!
//! [session]
//! interactive = true
//! always_yes = false
//! strict_keys = false
//! allow_plaintext = false
//!
//! [root]
//! path = "/home/alice/.local/share/bunker/root"
//! cipher = "age"
//!
//! [mounts."work"]
//! path = "/home/alice/work-secrets"
//! cipher = "gpg"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::domain::SecretPath;
use crate::core::types::MountPrefix;
use crate::error::{ConfigError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Metadata about the configuration
    pub bunker: Meta,
    /// Session defaults, overridable from the command line
    #[serde(default)]
    pub session: SessionConfig,
    /// age key material location
    #[serde(default)]
    pub age: AgeConfig,
    /// The root store, mounted at the empty prefix
    pub root: StoreConfig,
    /// Additional stores keyed by mount prefix
    #[serde(default)]
    pub mounts: BTreeMap<MountPrefix, StoreConfig>,
}

/// Metadata section of the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Configuration version
    pub version: String,
}

/// Defaults for the interactive session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_true")]
    pub interactive: bool,
    #[serde(default)]
    pub always_yes: bool,
    /// Fail lookups of duplicated attribute keys instead of taking the first.
    #[serde(default)]
    pub strict_keys: bool,
    /// Permit the unencrypted `plain` backend. Tests and development only.
    #[serde(default)]
    pub allow_plaintext: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interactive: true,
            always_yes: false,
            strict_keys: false,
            allow_plaintext: false,
        }
    }
}

/// Where age identities and keyring live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// One store: a directory and the cipher its blobs are encrypted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    #[serde(default = "default_cipher")]
    pub cipher: String,
}

fn default_true() -> bool {
    true
}

fn default_cipher() -> String {
    "age".to_string()
}

impl Config {
    /// Create a configuration with only a root store.
    pub fn new(root: StoreConfig) -> Self {
        Self {
            bunker: Meta {
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            session: SessionConfig::default(),
            age: AgeConfig::default(),
            root,
            mounts: BTreeMap::new(),
        }
    }

    /// Path of the configuration file: `$BUNKER_CONFIG`, or
    /// `<config dir>/bunker/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(constants::CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dir = dirs::config_dir().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_dir",
            reason: "unable to determine config directory".to_string(),
        })?;
        Ok(dir.join(constants::APP_DIR).join(constants::CONFIG_FILE))
    }

    /// Default location of the root store.
    pub fn default_root_path() -> Result<PathBuf> {
        let dir = dirs::data_dir().ok_or_else(|| ConfigError::InvalidValue {
            field: "data_dir",
            reason: "unable to determine data directory".to_string(),
        })?;
        Ok(dir.join(constants::APP_DIR).join("root"))
    }

    /// Directory holding age identities: `[age] dir`, or a sibling `age/`
    /// directory of the config file.
    pub fn age_dir(&self, config_path: &Path) -> PathBuf {
        match &self.age.dir {
            Some(dir) => dir.clone(),
            None => config_path
                .parent()
                .map(|p| p.join("age"))
                .unwrap_or_else(|| PathBuf::from("age")),
        }
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if the file doesn't exist,
    /// or `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotInitialized.into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        debug!(mounts = config.mounts.len(), "config loaded");

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate the configuration structure and contents
    ///
    /// Checks:
    /// - Version field looks like semver
    /// - Mount prefixes are valid, non-root secret paths in normal form
    /// - Cipher names are known
    /// - `plain` is only used with `allow_plaintext`
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        if self.bunker.version.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "version",
                reason: "missing".to_string(),
            }
            .into());
        }
        if self.bunker.version.split('.').count() < 2 {
            return Err(ConfigError::InvalidValue {
                field: "version",
                reason: format!("not a valid semver: {}", self.bunker.version),
            }
            .into());
        }

        self.validate_store("root", &self.root)?;

        for (prefix, store) in &self.mounts {
            let parsed = SecretPath::parse(prefix).map_err(|e| ConfigError::InvalidValue {
                field: "mounts",
                reason: e.to_string(),
            })?;
            if parsed.is_root() || parsed.key().is_some() || parsed.as_string() != *prefix {
                return Err(ConfigError::InvalidValue {
                    field: "mounts",
                    reason: format!("mount prefix must be a plain path like 'a/b': '{}'", prefix),
                }
                .into());
            }
            self.validate_store("mounts", store)?;
        }

        Ok(())
    }

    fn validate_store(&self, field: &'static str, store: &StoreConfig) -> Result<()> {
        match store.cipher.as_str() {
            "age" | "gpg" => Ok(()),
            "plain" if self.session.allow_plaintext => Ok(()),
            "plain" => Err(ConfigError::InvalidValue {
                field,
                reason: "cipher 'plain' requires allow_plaintext = true".to_string(),
            }
            .into()),
            other => Err(ConfigError::InvalidValue {
                field,
                reason: format!("unknown cipher '{}'", other),
            }
            .into()),
        }
    }
}

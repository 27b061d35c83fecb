//! Constants used throughout bunker.
//!
//! Centralizes magic strings and configuration values.

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "BUNKER_CONFIG";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BUNKER_LOG";

/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Application directory name under the platform config/data dirs.
pub const APP_DIR: &str = "bunker";

/// age identities file name inside the age directory.
pub const AGE_IDENTITIES_FILE: &str = "identities";

/// age keyring (recipient metadata) file name inside the age directory.
pub const AGE_KEYRING_FILE: &str = "keyring.toml";

/// Separator between a secret path and a sub-key (`web/github#user`).
pub const SUBKEY_SEPARATOR: char = '#';

/// Line that switches the codec into YAML coercion mode.
pub const YAML_MARKER: &str = "---";

/// Label shown for the root store in store selection prompts.
pub const ROOT_STORE_LABEL: &str = "<root>";

/// Prefix for in-flight temp files; never listed as secrets.
pub const TEMP_PREFIX: &str = ".tmp-";

/// Warning attached to writes of empty content.
pub const EMPTY_PASSWORD_WARNING: &str = "Password is empty or all whitespace";

//! Init command.
//!
//! Writes the config file and gives the root store its first recipient.
//! For age, a local identity is generated when none exists.

use std::path::PathBuf;

use tracing::info;

use crate::cli::{config_path, output, session, GlobalArgs};
use crate::core::config::{Config, StoreConfig};
use crate::core::vault::Vault;
use crate::error::Result;

/// Initialize bunker.
pub fn execute(
    global: &GlobalArgs,
    cipher: &str,
    path: Option<PathBuf>,
    allow_plaintext: bool,
) -> Result<()> {
    let config_path = config_path(global)?;
    let root = match path {
        Some(p) => p,
        None => Config::default_root_path()?,
    };

    let mut config = Config::new(StoreConfig {
        path: root.clone(),
        cipher: cipher.to_string(),
    });
    config.session.allow_plaintext = allow_plaintext;

    info!(cipher, root = %root.display(), "initializing");
    let session = session(global, &config);
    let vault = Vault::create(&config_path, config, session)?;

    output::success(&format!(
        "initialized {} store at {}",
        cipher,
        output::path(&root.display().to_string())
    ));
    for recipient in vault.root().recipients() {
        output::kv("recipient:", recipient);
    }
    output::kv("config:", config_path.display());
    Ok(())
}

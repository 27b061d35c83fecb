//! Mount commands.

use std::path::PathBuf;

use crate::cli::{open_vault, output, GlobalArgs};
use crate::core::config::StoreConfig;
use crate::core::constants::ROOT_STORE_LABEL;
use crate::error::Result;

/// Mount a store directory at `prefix`.
///
/// The cipher defaults to the root store's.
pub fn add(global: &GlobalArgs, prefix: &str, path: PathBuf, cipher: Option<String>) -> Result<()> {
    let mut vault = open_vault(global)?;
    let cipher = cipher.unwrap_or_else(|| vault.config().root.cipher.clone());

    vault.mount(
        prefix,
        StoreConfig {
            path: path.clone(),
            cipher,
        },
    )?;
    output::success(&format!(
        "mounted {} at {}",
        output::path(&path.display().to_string()),
        output::key(prefix)
    ));
    Ok(())
}

/// Unmount the store at `prefix`.
pub fn rm(global: &GlobalArgs, prefix: &str) -> Result<()> {
    let mut vault = open_vault(global)?;
    vault.unmount(prefix)?;
    output::success(&format!("unmounted {}", output::key(prefix)));
    Ok(())
}

/// List mount points with their store directories.
pub fn list(global: &GlobalArgs) -> Result<()> {
    let vault = open_vault(global)?;
    let config = vault.config();

    output::section("Stores");
    output::kv(
        ROOT_STORE_LABEL,
        format!("{} ({})", config.root.path.display(), config.root.cipher),
    );
    for (prefix, store) in &config.mounts {
        output::kv(prefix, format!("{} ({})", store.path.display(), store.cipher));
    }
    Ok(())
}

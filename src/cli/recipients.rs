//! Recipient commands, re-encryption, and whoami.
//!
//! Commands that take `--store` ask which store to use when it is
//! omitted; non-interactive sessions get the root store.

use crate::cli::{open_vault, output, GlobalArgs};
use crate::core::constants::ROOT_STORE_LABEL;
use crate::core::vault::Vault;
use crate::error::Result;

fn store_prefix(vault: &Vault, store: Option<String>) -> String {
    store.unwrap_or_else(|| vault.ask_for_store())
}

fn store_label(prefix: &str) -> &str {
    if prefix.is_empty() {
        ROOT_STORE_LABEL
    } else {
        prefix
    }
}

/// List recipients of a store.
pub fn list(global: &GlobalArgs, store: Option<String>, json: bool) -> Result<()> {
    let vault = open_vault(global)?;
    let prefix = store_prefix(&vault, store);
    let cipher = vault.store(&prefix)?.cipher();
    let recipients = vault.recipients(&prefix)?;

    if json {
        let mut entries = Vec::with_capacity(recipients.len());
        for r in &recipients {
            let info = cipher.key_info(r.id())?.unwrap_or_default();
            entries.push(serde_json::json!({
                "id": r.id(),
                "name": info.name,
                "email": info.email,
                "has_private_key": r.has_private_key(),
            }));
        }
        let result = serde_json::json!({
            "store": prefix,
            "recipients": entries,
            "count": recipients.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::section(&format!(
        "{} recipients of {}",
        recipients.len(),
        store_label(&prefix)
    ));
    for r in &recipients {
        let mut line = r.id().to_string();
        if let Some(info) = cipher.key_info(r.id())? {
            line.push_str(&format!(" - {} <{}>", info.name, info.email));
        }
        if r.has_private_key() {
            line.push_str(" (local)");
        }
        output::list_item(&line);
    }
    Ok(())
}

/// Add a recipient to a store.
pub fn add(global: &GlobalArgs, id: &str, store: Option<String>) -> Result<()> {
    let vault = open_vault(global)?;
    let prefix = store_prefix(&vault, store);
    vault.add_recipient(&prefix, id)?;
    output::success(&format!(
        "added {} to {}",
        output::key(id),
        store_label(&prefix)
    ));
    output::hint("run: bunker reencrypt to share existing secrets");
    Ok(())
}

/// Remove a recipient from a store.
pub fn rm(global: &GlobalArgs, id: &str, store: Option<String>) -> Result<()> {
    let vault = open_vault(global)?;
    let prefix = store_prefix(&vault, store);
    vault.remove_recipient(&prefix, id)?;
    output::success(&format!(
        "removed {} from {}",
        output::key(id),
        store_label(&prefix)
    ));
    output::hint("run: bunker reencrypt to revoke access to existing secrets");
    Ok(())
}

/// Re-encrypt every store for its current recipients.
pub fn reencrypt(global: &GlobalArgs) -> Result<()> {
    let vault = open_vault(global)?;
    for (prefix, result) in vault.reencrypt()? {
        output::success(&format!(
            "{}: {} secrets for {} recipients",
            store_label(&prefix),
            result.secrets,
            result.recipients
        ));
    }
    Ok(())
}

/// Show the private key and identity acting for the user.
pub fn whoami(global: &GlobalArgs) -> Result<()> {
    let vault = open_vault(global)?;
    let key = vault.private_key("whoami")?;
    output::kv("key:", &key);
    match vault.identity(&key) {
        Ok((name, email)) => {
            output::kv("name:", name);
            output::kv("email:", email);
        }
        Err(e) => output::dimmed(&e.to_string()),
    }
    Ok(())
}

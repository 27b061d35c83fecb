//! Secret commands: insert, show, rm, ls.

use std::io::{self, IsTerminal, Read};

use dialoguer::Password;
use tracing::debug;
use zeroize::Zeroizing;

use crate::cli::{open_vault, output, GlobalArgs};
use crate::core::vault::{InsertOptions, ShowOptions};
use crate::error::Result;

/// Insert a secret or one of its keys.
///
/// `key` may carry an inline value as `key:value`. Otherwise the content
/// is read whole from a piped stdin, or asked for with hidden input.
pub fn insert(global: &GlobalArgs, path: &str, key: Option<String>, force: bool) -> Result<()> {
    let vault = open_vault(global)?;

    let (sub_key, inline) = match key {
        Some(k) => match k.split_once(':') {
            Some((k, v)) => (Some(k.to_string()), Some(v.to_string())),
            None => (Some(k), None),
        },
        None => (None, None),
    };

    let content = match inline {
        Some(value) => Zeroizing::new(value.into_bytes()),
        None => read_content(path, sub_key.as_deref())?,
    };
    debug!(path, bytes = content.len(), "read secret content");

    let outcome = vault.insert(path, &content, InsertOptions { force, sub_key })?;
    if let Some(warning) = outcome.warning {
        output::warn(&format!("Warning: {}", warning));
    }
    output::success(&format!("inserted {}", output::path(path)));
    Ok(())
}

fn read_content(path: &str, key: Option<&str>) -> Result<Zeroizing<Vec<u8>>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(Vec::new());
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    let label = match key {
        Some(k) => format!("Value for {} of {}", output::key(k), output::path(path)),
        None => format!("Password for {}", output::path(path)),
    };
    let value = Zeroizing::new(
        Password::new()
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()?,
    );
    Ok(Zeroizing::new(value.as_bytes().to_vec()))
}

/// Print a secret or one of its keys.
pub fn show(global: &GlobalArgs, path: &str, key: Option<String>, no_parse: bool) -> Result<()> {
    let vault = open_vault(global)?;
    let shown = vault.show(
        path,
        ShowOptions {
            sub_key: key,
            no_parse,
        },
    )?;
    output::data(&shown.to_bytes())?;
    Ok(())
}

/// Remove a secret.
pub fn rm(global: &GlobalArgs, path: &str) -> Result<()> {
    let vault = open_vault(global)?;
    vault.remove(path)?;
    output::success(&format!("removed {}", output::path(path)));
    Ok(())
}

/// List every secret across all stores.
pub fn list(global: &GlobalArgs, json: bool) -> Result<()> {
    let vault = open_vault(global)?;
    let paths: Vec<String> = vault.list()?.iter().map(|p| p.as_string()).collect();

    if json {
        let result = serde_json::json!({
            "secrets": paths,
            "count": paths.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if paths.is_empty() {
        output::dimmed("no secrets stored");
    } else {
        for path in paths {
            println!("{}", path);
        }
    }
    Ok(())
}

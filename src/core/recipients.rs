//! Recipient management and private key selection.
//!
//! A store's recipient set decides who can decrypt secrets written from now
//! on. Changing it does not touch existing blobs; run a re-encryption for
//! that.

use tracing::{debug, info};

use crate::core::cipher::Cipher;
use crate::core::domain::Recipient;
use crate::core::prompt::{Choice, Prompt};
use crate::core::session::Session;
use crate::core::store::Store;
use crate::core::types::KeyId;
use crate::error::{CipherError, RecipientError, Result, SelectionError};

/// The store's recipients, in manifest order, flagged with whether the
/// matching private key is held locally.
pub fn list_recipients(store: &Store) -> Result<Vec<Recipient>> {
    let private = store.cipher().list_private_key_ids()?;
    Ok(store
        .recipients()
        .into_iter()
        .map(|id| {
            let local = private.contains(&id);
            Recipient::new(id, local)
        })
        .collect())
}

/// Append `id` to the store's recipient set.
///
/// # Errors
///
/// `RecipientError::UnknownIdentity` if the cipher cannot resolve `id`,
/// `RecipientError::AlreadyPresent` if it is already in the set.
pub fn add_recipient(store: &Store, id: &str) -> Result<()> {
    ensure_resolves(store.cipher(), id)?;

    store.update_recipients(|ids| {
        if ids.iter().any(|k| k == id) {
            return Err(RecipientError::AlreadyPresent(id.to_string()).into());
        }
        ids.push(id.to_string());
        Ok(())
    })?;

    info!(store = %store.prefix(), recipient = id, "added recipient");
    Ok(())
}

/// Remove `id` from the store's recipient set.
///
/// # Errors
///
/// `RecipientError::UnknownIdentity` if the cipher cannot resolve `id`,
/// `RecipientError::NotPresent` if it is not in the set, and
/// `RecipientError::LastRecipient` if it is the only one left.
pub fn remove_recipient(store: &Store, id: &str) -> Result<()> {
    ensure_resolves(store.cipher(), id)?;

    store.update_recipients(|ids| {
        let Some(pos) = ids.iter().position(|k| k == id) else {
            return Err(RecipientError::NotPresent(id.to_string()).into());
        };
        if ids.len() == 1 {
            return Err(RecipientError::LastRecipient(id.to_string()).into());
        }
        ids.remove(pos);
        Ok(())
    })?;

    info!(store = %store.prefix(), recipient = id, "removed recipient");
    Ok(())
}

fn ensure_resolves(cipher: &dyn Cipher, id: &str) -> Result<()> {
    if cipher.resolves(id)? {
        Ok(())
    } else {
        Err(RecipientError::UnknownIdentity(id.to_string()).into())
    }
}

/// Pick the private key that acts as the caller's identity for `label`.
///
/// One key is returned without asking. With several, `--yes` takes the
/// first in the backend's order and an interactive session prompts.
///
/// # Errors
///
/// `CipherError::NoPrivateKey` if there are no keys.
/// `SelectionError::Aborted` if the prompt is cancelled or answered out of
/// range, or if several keys exist and nobody can be asked.
pub fn ask_for_private_key(
    session: &Session,
    cipher: &dyn Cipher,
    prompt: &dyn Prompt,
    label: &str,
) -> Result<KeyId> {
    let mut keys = cipher.list_private_key_ids()?;
    debug!(backend = cipher.name(), keys = keys.len(), label, "selecting private key");

    match keys.len() {
        0 => return Err(CipherError::NoPrivateKey.into()),
        1 => return Ok(keys.remove(0)),
        _ => {}
    }

    if session.always_yes {
        let key = keys.remove(0);
        info!(label, key = %key, "using first private key");
        return Ok(key);
    }
    if !session.interactive {
        return Err(SelectionError::Aborted(format!(
            "{} private keys available for {} and no way to ask",
            keys.len(),
            label
        ))
        .into());
    }

    let options = keys
        .iter()
        .map(|id| describe(cipher, id))
        .collect::<Result<Vec<_>>>()?;

    match prompt.choose_one(&format!("Please select a private key for {}", label), &options)? {
        Choice::Index(i) if i < keys.len() => {
            let key = keys.swap_remove(i);
            info!(label, key = %key, "selected private key");
            Ok(key)
        }
        Choice::Index(i) => {
            Err(SelectionError::Aborted(format!("no key at index {} for {}", i, label)).into())
        }
        Choice::Abort => Err(SelectionError::Aborted(label.to_string()).into()),
    }
}

/// Name and email for commit authorship, from the chosen private key.
///
/// # Errors
///
/// Anything `ask_for_private_key` returns, or
/// `RecipientError::IdentityMetadataMissing` when the key has no usable
/// name and email.
pub fn ask_for_git_config_user(
    session: &Session,
    cipher: &dyn Cipher,
    prompt: &dyn Prompt,
) -> Result<(String, String)> {
    let key = ask_for_private_key(session, cipher, prompt, "git")?;
    identity(cipher, &key)
}

/// Name and email recorded for `key`.
pub fn identity(cipher: &dyn Cipher, key: &str) -> Result<(String, String)> {
    match cipher.key_info(key)? {
        Some(info) if info.is_complete() => Ok((info.name, info.email)),
        _ => Err(RecipientError::IdentityMetadataMissing(key.to_string()).into()),
    }
}

fn describe(cipher: &dyn Cipher, id: &str) -> Result<String> {
    Ok(match cipher.key_info(id)? {
        Some(info) if info.is_complete() => format!("{} - {} <{}>", id, info.name, info.email),
        _ => id.to_string(),
    })
}

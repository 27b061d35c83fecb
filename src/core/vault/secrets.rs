//! Secret operations.
//!
//! Insert with overwrite protection, show in parsed or raw form, remove
//! and list across every mounted store.

use tracing::{info, warn};
use zeroize::Zeroizing;

use super::Vault;
use crate::core::constants::EMPTY_PASSWORD_WARNING;
use crate::core::domain::{secret, ChangeKind, Secret, SecretPath};
use crate::core::types::AttributeKey;
use crate::error::{MountError, Result, SecretError};

/// Options for [`Vault::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Replace existing content instead of failing.
    pub force: bool,
    /// Write a single attribute instead of the whole secret. Overrides a
    /// `#key` suffix on the path.
    pub sub_key: Option<AttributeKey>,
}

/// Result of a successful insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Non-fatal notice for the caller to surface.
    pub warning: Option<&'static str>,
    /// What was found at the path before the write.
    pub existed: Existence,
}

/// What an insert finds at its target before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    /// No secret at the path.
    None,
    /// A secret exists; for sub-key inserts, without that key.
    Whole,
    /// A secret exists and already has the targeted key.
    PartialKeyOnly,
}

impl Existence {
    fn conflicts(self, targets_sub_key: bool) -> bool {
        match self {
            Existence::None => false,
            Existence::Whole => !targets_sub_key,
            Existence::PartialKeyOnly => true,
        }
    }
}

/// Options for [`Vault::show`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowOptions {
    /// Return a single attribute. Overrides a `#key` suffix on the path.
    pub sub_key: Option<AttributeKey>,
    /// Skip interpretation: exact bytes, literal values.
    pub no_parse: bool,
}

/// What [`Vault::show`] returns.
pub enum Shown {
    /// The stored bytes, unchanged.
    Raw(Zeroizing<Vec<u8>>),
    /// The decoded secret; render it for the parsed text.
    Parsed(Secret),
    /// One attribute value.
    Value(Zeroizing<String>),
}

impl std::fmt::Debug for Shown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shown::Raw(raw) => write!(f, "Raw({} bytes)", raw.len()),
            Shown::Parsed(secret) => write!(f, "Parsed({:?})", secret),
            Shown::Value(_) => write!(f, "Value(<redacted>)"),
        }
    }
}

impl Shown {
    /// Bytes to print.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(match self {
            Shown::Raw(raw) => raw.to_vec(),
            Shown::Parsed(secret) => secret.render().into_bytes(),
            Shown::Value(value) => value.as_bytes().to_vec(),
        })
    }
}

impl Vault {
    /// Write `content` at `path`.
    ///
    /// Without a sub-key the content becomes the whole secret, stored
    /// byte for byte. With one, the first line of content becomes that
    /// attribute's value and the rest of the secret is preserved.
    ///
    /// The path lock is held from the existence check to the write, and
    /// the recipient set is captured once before either.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::AlreadyExists` when the write would replace
    /// content without `force` and the user did not confirm it.
    pub fn insert(&self, path: &str, content: &[u8], opts: InsertOptions) -> Result<InsertOutcome> {
        let path = SecretPath::parse(path)?;
        let key = target_key(&path, opts.sub_key)?;
        if let Some(k) = &key {
            secret::validate_key(k)?;
        }

        let resolved = self.resolve(&path);
        let store = resolved.store;
        let rel = resolved.rel.without_key();
        let recipients = store.recipients();

        let guard = store.lock(&rel);

        let existing = if store.exists(&rel) {
            let raw = store.read(&rel)?;
            // a merge rewrites the whole blob from the parsed view
            if key.is_some() && std::str::from_utf8(&raw).is_err() {
                return Err(SecretError::NotText(path.to_string()).into());
            }
            Some(Secret::parse(&raw))
        } else {
            None
        };
        let existed = match (&existing, &key) {
            (None, _) => Existence::None,
            (Some(s), Some(k)) if s.contains_key(k) => Existence::PartialKeyOnly,
            (Some(_), _) => Existence::Whole,
        };

        if existed.conflicts(key.is_some()) && !opts.force && !self.confirm_overwrite(&path)? {
            return Err(SecretError::AlreadyExists(path.to_string()).into());
        }

        let (plaintext, empty) = match &key {
            None => {
                let empty = String::from_utf8_lossy(content).trim().is_empty();
                (Zeroizing::new(content.to_vec()), empty)
            }
            Some(k) => {
                let value = single_line(k, content)?;
                let empty = value.trim().is_empty();
                let mut merged = existing.unwrap_or_default();
                merged.set(k, value.as_str())?;
                (Zeroizing::new(merged.serialize()), empty)
            }
        };

        store.write(&rel, &plaintext, &recipients)?;
        drop(guard);

        info!(
            store = %resolved.prefix,
            path = %rel,
            key = key.as_deref().unwrap_or(""),
            existed = ?existed,
            "secret written"
        );
        self.notify(resolved.prefix, &rel, ChangeKind::Write);

        let warning = if empty {
            warn!(path = %path, "{}", EMPTY_PASSWORD_WARNING);
            Some(EMPTY_PASSWORD_WARNING)
        } else {
            None
        };
        Ok(InsertOutcome { warning, existed })
    }

    /// Read the secret at `path`.
    ///
    /// Whole secrets come back as [`Shown::Raw`] with `no_parse` and as
    /// [`Shown::Parsed`] otherwise. A sub-key yields [`Shown::Value`],
    /// coerced unless `no_parse` is set.
    ///
    /// # Errors
    ///
    /// `SecretError::NotFound`, `SecretError::KeyNotFound`,
    /// `SecretError::AmbiguousKey` in strict sessions, or a cipher error.
    pub fn show(&self, path: &str, opts: ShowOptions) -> Result<Shown> {
        let path = SecretPath::parse(path)?;
        let key = target_key(&path, opts.sub_key)?;

        let resolved = self.resolve(&path);
        let raw = resolved.store.read(&resolved.rel.without_key())?;

        let Some(key) = key else {
            return Ok(if opts.no_parse {
                Shown::Raw(raw)
            } else {
                Shown::Parsed(Secret::parse(&raw))
            });
        };

        let secret = Secret::parse(&raw);
        let lookup = self.session.lookup();
        let value = if opts.no_parse {
            secret.get_literal(&key, lookup)?.to_string()
        } else {
            secret.get(&key, lookup)?
        };
        Ok(Shown::Value(Zeroizing::new(value)))
    }

    /// Delete the secret at `path`.
    pub fn remove(&self, path: &str) -> Result<()> {
        let path = SecretPath::parse(path)?;
        if path.key().is_some() {
            return Err(MountError::InvalidPath {
                path: path.to_string(),
                reason: "remove takes a secret, not a key".to_string(),
            }
            .into());
        }

        let resolved = self.resolve(&path);
        {
            let _guard = resolved.store.lock(&resolved.rel);
            resolved.store.remove(&resolved.rel)?;
        }

        info!(store = %resolved.prefix, path = %resolved.rel, "secret removed");
        self.notify(resolved.prefix, &resolved.rel, ChangeKind::Delete);
        Ok(())
    }

    /// Every secret in every store, with mount prefixes applied, sorted.
    pub fn list(&self) -> Result<Vec<SecretPath>> {
        let mut all = Vec::new();
        for (prefix, store) in self.mounts.stores() {
            let prefix = SecretPath::parse(prefix)?;
            all.extend(store.list()?.into_iter().map(|rel| rel.prepend(&prefix)));
        }
        all.sort();
        all.dedup();
        Ok(all)
    }

    fn confirm_overwrite(&self, path: &SecretPath) -> Result<bool> {
        if !self.session.can_prompt() {
            return Ok(false);
        }
        self.prompt
            .confirm(&format!("An entry already exists at {}. Overwrite it?", path))
    }
}

/// Sub-key from the options, else from the path's `#key` suffix.
fn target_key(path: &SecretPath, explicit: Option<String>) -> Result<Option<String>> {
    match (explicit, path.key()) {
        (Some(a), Some(b)) if a != b => Err(MountError::InvalidPath {
            path: path.to_string(),
            reason: format!("conflicting keys '{}' and '{}'", b, a),
        }
        .into()),
        (Some(a), _) => Ok(Some(a)),
        (None, b) => Ok(b.map(str::to_string)),
    }
}

/// Attribute values are one line; a single trailing newline is dropped.
fn single_line(key: &str, content: &[u8]) -> Result<Zeroizing<String>> {
    let text = String::from_utf8_lossy(content);
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(&text);
    if text.contains('\n') {
        return Err(SecretError::InvalidKey {
            key: key.to_string(),
            reason: "a key's value must be a single line".to_string(),
        }
        .into());
    }
    Ok(Zeroizing::new(text.to_string()))
}

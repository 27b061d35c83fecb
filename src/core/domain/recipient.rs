//! Recipient representation.
//!
//! A recipient is an identity a store encrypts to. Recipients come from a
//! cipher backend's key enumeration; bunker never mints them.

use std::fmt;

use crate::core::types::KeyId;

/// An identity that can decrypt a store's secrets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Recipient {
    id: KeyId,
    has_private_key: bool,
}

impl Recipient {
    /// Create a recipient.
    ///
    /// # Arguments
    ///
    /// * `id` - Key ID or fingerprint as reported by the backend
    /// * `has_private_key` - Whether the matching private key is held locally
    pub fn new(id: impl Into<KeyId>, has_private_key: bool) -> Self {
        Self {
            id: id.into(),
            has_private_key,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this process can decrypt as this recipient.
    pub fn has_private_key(&self) -> bool {
        self.has_private_key
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Display metadata attached to a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInfo {
    pub name: String,
    pub email: String,
}

impl KeyInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Split a `Name <email>` user id. Either half may be missing.
    pub fn from_user_id(uid: &str) -> Self {
        match (uid.find('<'), uid.rfind('>')) {
            (Some(start), Some(end)) if start < end => Self {
                name: uid[..start].trim().to_string(),
                email: uid[start + 1..end].trim().to_string(),
            },
            _ if uid.contains('@') => Self {
                name: String::new(),
                email: uid.trim().to_string(),
            },
            _ => Self {
                name: uid.trim().to_string(),
                email: String::new(),
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty()
    }
}

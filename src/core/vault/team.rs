//! Recipient operations.
//!
//! Manage who can decrypt a store's secrets and which local key acts for
//! the user. Stores are addressed by mount prefix; `""` is the root store.

use super::Vault;
use crate::core::domain::Recipient;
use crate::core::recipients;
use crate::core::types::KeyId;
use crate::error::Result;

impl Vault {
    /// Recipients of the store at `prefix`.
    pub fn recipients(&self, prefix: &str) -> Result<Vec<Recipient>> {
        recipients::list_recipients(self.store(prefix)?)
    }

    /// Add a recipient to the store at `prefix`.
    ///
    /// Existing secrets stay encrypted for the old set until
    /// [`Vault::reencrypt`] runs.
    ///
    /// # Errors
    ///
    /// Returns `RecipientError::UnknownIdentity` if the store's cipher cannot
    /// resolve `id`, `RecipientError::AlreadyPresent` if it is already there.
    pub fn add_recipient(&self, prefix: &str, id: &str) -> Result<()> {
        recipients::add_recipient(self.store(prefix)?, id)
    }

    /// Remove a recipient from the store at `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `RecipientError::NotPresent` if `id` is not a recipient and
    /// `RecipientError::LastRecipient` if it is the only one.
    pub fn remove_recipient(&self, prefix: &str, id: &str) -> Result<()> {
        recipients::remove_recipient(self.store(prefix)?, id)
    }

    /// The private key acting for the user on `label`, chosen from the
    /// root store's cipher.
    pub fn private_key(&self, label: &str) -> Result<KeyId> {
        recipients::ask_for_private_key(
            &self.session,
            self.root().cipher(),
            self.prompt.as_ref(),
            label,
        )
    }

    /// Name and email recorded for a key already chosen with
    /// [`Vault::private_key`].
    pub fn identity(&self, key: &str) -> Result<(String, String)> {
        recipients::identity(self.root().cipher(), key)
    }

    /// Name and email of the user's identity, for commit authorship.
    pub fn git_config_user(&self) -> Result<(String, String)> {
        recipients::ask_for_git_config_user(&self.session, self.root().cipher(), self.prompt.as_ref())
    }
}

//! GPG cipher backend.
//!
//! Encrypts secrets using GnuPG via the `gpg` CLI.
//!
//! ## Requirements
//!
//! - `gpg` (or `gpg2`) must be on `PATH`
//! - Recipient public keys must be in the keyring
//! - A private key must be available for decryption
//!
//! Key IDs are full fingerprints as printed by `gpg --with-colons`.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tracing::{debug, trace};

use super::Cipher;
use crate::core::domain::KeyInfo;
use crate::core::types::{Ciphertext, KeyId};
use crate::error::{CipherError, Result};

/// GPG cipher backend using the gpg CLI
#[derive(Debug, Clone)]
pub struct Gpg {
    binary: PathBuf,
}

/// One key from `--with-colons` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColonKey {
    pub fingerprint: String,
    pub uid: Option<String>,
}

impl Gpg {
    /// Locate the gpg binary.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if neither `gpg` nor `gpg2`
    /// is installed.
    pub fn new() -> Result<Self> {
        let binary = which::which("gpg")
            .or_else(|_| which::which("gpg2"))
            .map_err(|_| {
                CipherError::EncryptionFailed(
                    "gpg CLI not found. Install GnuPG from https://gnupg.org/download/".to_string(),
                )
            })?;
        debug!(binary = %binary.display(), "using gpg");
        Ok(Self { binary })
    }

    fn run(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<Output> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--batch", "--yes"]).args(args);

        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| CipherError::EncryptionFailed(format!("failed to spawn gpg: {}", e)))?;

        // stdin is fed from its own thread so a full stdout pipe cannot
        // stall the write
        let feed = stdin.zip(child.stdin.take());
        std::thread::scope(|s| -> Result<Output> {
            let writer = feed.map(|(input, mut pipe)| s.spawn(move || pipe.write_all(input)));
            let output = child.wait_with_output()?;
            if let Some(writer) = writer {
                let written = writer.join().map_err(|_| {
                    CipherError::EncryptionFailed("gpg stdin writer panicked".to_string())
                })?;
                // a failing gpg closes its stdin early; report its status instead
                if output.status.success() {
                    written?;
                }
            }
            Ok(output)
        })
    }

    fn list_keys(&self, secret: bool) -> Result<Vec<ColonKey>> {
        let flag = if secret {
            "--list-secret-keys"
        } else {
            "--list-public-keys"
        };
        let output = self.run(&["--with-colons", "--fixed-list-mode", flag], None)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CipherError::DecryptionFailed(format!("gpg {} failed: {}", flag, stderr)).into());
        }
        Ok(parse_colons(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Cipher for Gpg {
    fn name(&self) -> &'static str {
        "gpg"
    }

    fn ext(&self) -> &'static str {
        "gpg"
    }

    fn ids_file(&self) -> &'static str {
        ".gpg-id"
    }

    fn encrypt(&self, plaintext: &[u8], recipients: &[KeyId]) -> Result<Ciphertext> {
        trace!(
            recipients = recipients.len(),
            plaintext_len = plaintext.len(),
            "encrypting with GPG"
        );

        if recipients.is_empty() {
            return Err(CipherError::NoRecipients.into());
        }

        let mut args = vec!["--encrypt", "--armor", "--trust-model", "always"];
        for recipient in recipients {
            args.push("--recipient");
            args.push(recipient.as_str());
        }

        let output = self.run(&args, Some(plaintext))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if let Some(id) = recipients.iter().find(|r| {
                stderr
                    .lines()
                    .any(|l| l.contains(r.as_str()) && l.contains("No public key"))
            }) {
                return Err(CipherError::UnknownRecipient(id.clone()).into());
            }
            return Err(CipherError::EncryptionFailed(format!("gpg encrypt failed: {}", stderr)).into());
        }

        trace!(ciphertext_len = output.stdout.len(), "encrypted with GPG");
        Ok(output.stdout)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting with GPG");

        let output = self.run(&["--decrypt", "--quiet"], Some(ciphertext))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_decrypt_failure(&stderr).into());
        }

        trace!(plaintext_len = output.stdout.len(), "decrypted with GPG");
        Ok(output.stdout)
    }

    fn list_private_key_ids(&self) -> Result<Vec<KeyId>> {
        Ok(self
            .list_keys(true)?
            .into_iter()
            .map(|k| k.fingerprint)
            .collect())
    }

    fn list_public_key_ids(&self) -> Result<Vec<KeyId>> {
        Ok(self
            .list_keys(false)?
            .into_iter()
            .map(|k| k.fingerprint)
            .collect())
    }

    fn key_info(&self, id: &str) -> Result<Option<KeyInfo>> {
        Ok(self
            .list_keys(false)?
            .into_iter()
            .find(|k| k.fingerprint.eq_ignore_ascii_case(id))
            .and_then(|k| k.uid)
            .map(|uid| KeyInfo::from_user_id(&uid)))
    }
}

/// Map gpg's stderr on a failed decrypt to an error kind.
fn classify_decrypt_failure(stderr: &str) -> CipherError {
    if stderr.contains("No secret key") {
        CipherError::NoPrivateKey
    } else if stderr.contains("no valid OpenPGP data found")
        || stderr.contains("invalid packet")
        || stderr.contains("invalid armor")
    {
        CipherError::Corrupt(stderr.trim().to_string())
    } else {
        CipherError::DecryptionFailed(stderr.trim().to_string())
    }
}

/// Parse `gpg --with-colons` key listings. Takes the primary key's
/// fingerprint (first `fpr` after `pub`/`sec`) and its first `uid`.
pub(crate) fn parse_colons(output: &str) -> Vec<ColonKey> {
    let mut keys: Vec<ColonKey> = Vec::new();
    let mut in_primary = false;

    for line in output.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        match fields.first().copied() {
            Some("pub") | Some("sec") => {
                in_primary = true;
                keys.push(ColonKey {
                    fingerprint: String::new(),
                    uid: None,
                });
            }
            Some("sub") | Some("ssb") => in_primary = false,
            Some("fpr") if in_primary => {
                if let (Some(key), Some(fpr)) = (keys.last_mut(), fields.get(9)) {
                    if key.fingerprint.is_empty() {
                        key.fingerprint = fpr.to_string();
                    }
                }
            }
            Some("uid") => {
                if let (Some(key), Some(uid)) = (keys.last_mut(), fields.get(9)) {
                    if key.uid.is_none() && !uid.is_empty() {
                        key.uid = Some(uid.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    keys.retain(|k| !k.fingerprint.is_empty());
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_streams_large_input() {
        let Ok(gpg) = Gpg::new() else {
            return;
        };
        let payload = vec![b'x'; 1 << 20];
        let output = gpg.run(&["--enarmor"], Some(&payload)).unwrap();
        if output.status.success() {
            assert!(output.stdout.len() > payload.len());
        }
    }

    const LISTING: &str = "\
tru::1:1700000000:0:3:1:5
sec:u:255:22:AAAABBBBCCCCDDDD:1700000000:::u:::scESC:::+:::ed25519:::0:
fpr:::::::::1111222233334444555566667777AAAABBBBCCCCDDDD:
grp:::::::::0123456789ABCDEF0123456789ABCDEF01234567:
uid:u::::1700000000::HASH::Alice Doe <alice@example.com>::::::::::0:
ssb:u:255:18:EEEEFFFF00001111:1700000000::::::e:::+:::cv25519::
fpr:::::::::9999888877776666555544443333EEEEFFFF00001111:
sec:u:255:22:1234123412341234:1700000000:::u:::scESC:::+:::ed25519:::0:
fpr:::::::::ABCDABCDABCDABCDABCDABCD1234123412341234:
uid:u::::1700000000::HASH::bob@example.com::::::::::0:
";

    #[test]
    fn test_parse_colons_fingerprints() {
        let keys = parse_colons(LISTING);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].fingerprint, "1111222233334444555566667777AAAABBBBCCCCDDDD");
        assert_eq!(keys[1].fingerprint, "ABCDABCDABCDABCDABCDABCD1234123412341234");
    }

    #[test]
    fn test_parse_colons_uids() {
        let keys = parse_colons(LISTING);
        assert_eq!(keys[0].uid.as_deref(), Some("Alice Doe <alice@example.com>"));
        assert_eq!(keys[1].uid.as_deref(), Some("bob@example.com"));
    }

    #[test]
    fn test_parse_colons_empty() {
        assert!(parse_colons("").is_empty());
    }

    #[test]
    fn test_classify_decrypt_failure() {
        assert!(matches!(
            classify_decrypt_failure("gpg: decryption failed: No secret key"),
            CipherError::NoPrivateKey
        ));
        assert!(matches!(
            classify_decrypt_failure("gpg: no valid OpenPGP data found."),
            CipherError::Corrupt(_)
        ));
        assert!(matches!(
            classify_decrypt_failure("gpg: something else"),
            CipherError::DecryptionFailed(_)
        ));
    }
}

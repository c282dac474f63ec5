use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use subtrack_core::Subscription;

use crate::cipher::{decrypt_text, seal};
use crate::error::VaultError;
use crate::payload::parse_subscriptions;

/// Default location of the encrypted inventory, relative to the working directory.
pub const DEFAULT_PAYLOAD_PATH: &str = "data/subscriptions.json.enc";

/// Where subscription records come from.
pub trait SubscriptionSource {
    fn load(&self) -> Result<Vec<Subscription>, VaultError>;
}

/// Passphrase-encrypted JSON inventory in a single file.
pub struct EncryptedFileStore {
    path: PathBuf,
    passphrase: String,
}

impl fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.path)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

impl EncryptedFileStore {
    pub fn new(path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Result<Self, VaultError> {
        let passphrase = passphrase.into();
        if passphrase.is_empty() {
            return Err(VaultError::MissingConfiguration("MASTER_KEY"));
        }
        Ok(Self {
            path: path.into(),
            passphrase,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encrypt `subs` and replace the file, creating parent directories.
    pub fn save(&self, subs: &[Subscription]) -> Result<(), VaultError> {
        let json = serde_json::to_string(subs)
            .map_err(|e| VaultError::MalformedPayload(e.to_string()))?;
        let sealed = seal(&json, &self.passphrase)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| VaultError::Io {
                op: "create",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, sealed).map_err(|source| VaultError::Io {
            op: "write",
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), count = subs.len(), "sealed subscription store");
        Ok(())
    }
}

impl SubscriptionSource for EncryptedFileStore {
    fn load(&self) -> Result<Vec<Subscription>, VaultError> {
        let stored = match fs::read_to_string(&self.path) {
            Ok(stored) => stored,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(VaultError::PayloadAbsent(self.path.clone()));
            }
            Err(source) => {
                return Err(VaultError::Io {
                    op: "read",
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let text = decrypt_text(&stored, &self.passphrase)?;
        let subs = parse_subscriptions(&text)?;

        tracing::debug!(path = %self.path.display(), count = subs.len(), "decrypted subscription store");
        Ok(subs)
    }
}

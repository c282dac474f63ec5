use std::path::PathBuf;
use thiserror::Error;

/// Why the store could not yield a subscription list
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("missing configuration: {0} is not set")]
    MissingConfiguration(&'static str),

    /// No store on disk. Callers treat this as "nothing to check".
    #[error("no encrypted payload at {}", .0.display())]
    PayloadAbsent(PathBuf),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VaultError {
    /// Fatal errors abort the run before any notification is sent.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, VaultError::PayloadAbsent(_))
    }
}

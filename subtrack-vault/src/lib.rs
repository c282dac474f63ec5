//! subtrack-vault: encrypted subscription store (OpenSSL/CryptoJS salted AES) and payload parsing.

pub mod cipher;
pub mod error;
pub mod payload;
pub mod store;

pub use cipher::{decrypt_text, seal};
pub use error::VaultError;
pub use payload::parse_subscriptions;
pub use store::{EncryptedFileStore, SubscriptionSource, DEFAULT_PAYLOAD_PATH};

//! Decrypted plaintext -> typed subscription list.

use subtrack_core::Subscription;

use crate::error::VaultError;

/// Parse a JSON array of subscription records.
pub fn parse_subscriptions(text: &str) -> Result<Vec<Subscription>, VaultError> {
    let text = text.trim_start_matches('\u{feff}');
    let subs: Vec<Subscription> =
        serde_json::from_str(text).map_err(|e| VaultError::MalformedPayload(e.to_string()))?;

    if let Some(pos) = subs.iter().position(|s| s.name.trim().is_empty()) {
        return Err(VaultError::MalformedPayload(format!(
            "subscription #{} has an empty name",
            pos + 1
        )));
    }

    Ok(subs)
}

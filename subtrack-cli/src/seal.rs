use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use subtrack_vault::{parse_subscriptions, EncryptedFileStore};

use crate::config::{Settings, VaultConfig};

/// Validate a plaintext JSON inventory and write it to the encrypted store.
pub fn run(
    settings: &Settings,
    env: &dyn Fn(&str) -> Option<String>,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let cfg = VaultConfig::resolve(settings, env)?;

    let text = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let subs = parse_subscriptions(&text).with_context(|| format!("parsing {}", input.display()))?;

    let path = output.unwrap_or(cfg.payload_path);
    let store = EncryptedFileStore::new(&path, cfg.master_key)?;
    store.save(&subs)?;

    println!("Sealed {} subscriptions into {}", subs.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MASTER_KEY;
    use subtrack_vault::SubscriptionSource;

    #[test]
    fn test_seal_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("subs.json");
        fs::write(
            &input,
            r#"[{"name":"Netflix","price":15.49,"currency":"USD","date":"2024-01-15","period":"month"}]"#,
        )
        .unwrap();
        let out = dir.path().join("data").join("subscriptions.json.enc");

        let env = |k: &str| (k == MASTER_KEY).then(|| "pw".to_string());
        let written = run(&Settings::default(), &env, &input, Some(out.clone())).unwrap();
        assert_eq!(written, out);

        let subs = EncryptedFileStore::new(&out, "pw").unwrap().load().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "Netflix");
    }

    #[test]
    fn test_invalid_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("subs.json");
        fs::write(&input, r#"{"not":"a list"}"#).unwrap();
        let out = dir.path().join("subscriptions.json.enc");

        let env = |k: &str| (k == MASTER_KEY).then(|| "pw".to_string());
        assert!(run(&Settings::default(), &env, &input, Some(out.clone())).is_err());
        assert!(!out.exists());
    }
}

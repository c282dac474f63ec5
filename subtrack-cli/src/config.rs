use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use subtrack_core::{parse_timezone, InvalidTimezone};
use subtrack_notify::{BarkConfig, DEFAULT_GROUP, DEFAULT_SERVER};
use subtrack_vault::DEFAULT_PAYLOAD_PATH;
use thiserror::Error;

pub const MASTER_KEY: &str = "MASTER_KEY";
pub const BARK_KEY: &str = "BARK_KEY";
pub const BARK_SERVER: &str = "BARK_SERVER";
pub const BARK_URL: &str = "BARK_URL";
pub const PAYLOAD_ENV: &str = "SUBTRACK_PAYLOAD";
pub const TIMEZONE_ENV: &str = "SUBTRACK_TZ";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required configuration missing: {0} is not set")]
    Missing(&'static str),
    #[error(transparent)]
    Timezone(#[from] InvalidTimezone),
    #[error("BARK_URL must look like https://host/<device key>, got {0}")]
    InvalidBarkUrl(String),
}

/// Non-secret settings, optionally loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub payload_path: PathBuf,
    pub timezone: String,
    pub bark: BarkSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BarkSection {
    pub server: String,
    /// Empty string disables grouping
    pub group: String,
    pub icons: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            payload_path: PathBuf::from(DEFAULT_PAYLOAD_PATH),
            timezone: "UTC".to_string(),
            bark: BarkSection::default(),
        }
    }
}

impl Default for BarkSection {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            group: DEFAULT_GROUP.to_string(),
            icons: true,
        }
    }
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(p) = path else {
        return Ok(Settings::default());
    };
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// Environment lookup with blank values treated as unset.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// What the store needs: the passphrase and where to find it.
#[derive(Clone)]
pub struct VaultConfig {
    pub master_key: String,
    pub payload_path: PathBuf,
    pub timezone: Tz,
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("master_key", &"<redacted>")
            .field("payload_path", &self.payload_path)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl VaultConfig {
    pub fn resolve(settings: &Settings, env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let master_key = env(MASTER_KEY).ok_or(ConfigError::Missing(MASTER_KEY))?;
        let payload_path = env(PAYLOAD_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| settings.payload_path.clone());
        let timezone = parse_timezone(&env(TIMEZONE_ENV).unwrap_or_else(|| settings.timezone.clone()))?;

        Ok(Self {
            master_key,
            payload_path,
            timezone,
        })
    }
}

/// Everything a scheduled check needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub vault: VaultConfig,
    pub bark: BarkConfig,
}

impl RuntimeConfig {
    pub fn resolve(settings: &Settings, env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vault = VaultConfig::resolve(settings, env)?;
        let bark = resolve_bark(settings, env)?;
        Ok(Self { vault, bark })
    }
}

fn resolve_bark(settings: &Settings, env: &dyn Fn(&str) -> Option<String>) -> Result<BarkConfig, ConfigError> {
    let (server, device_key) = match (env(BARK_KEY), env(BARK_URL)) {
        (Some(key), _) => (
            env(BARK_SERVER).unwrap_or_else(|| settings.bark.server.clone()),
            key,
        ),
        (None, Some(url)) => split_bark_url(&url)?,
        (None, None) => return Err(ConfigError::Missing(BARK_KEY)),
    };

    let group = Some(settings.bark.group.clone()).filter(|g| !g.is_empty());
    Ok(BarkConfig {
        server,
        device_key,
        group,
        icons: settings.bark.icons,
    })
}

/// `https://api.day.app/KEY` -> (`https://api.day.app`, `KEY`)
fn split_bark_url(url: &str) -> Result<(String, String), ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((server, key)) if server.contains("://") && !server.ends_with('/') && !key.is_empty() => {
            Ok((server.to_string(), key.to_string()))
        }
        _ => Err(ConfigError::InvalidBarkUrl(url.to_string())),
    }
}

fn mask(secret: Option<String>) -> String {
    match secret {
        Some(s) => format!("set ({} chars)", s.chars().count()),
        None => "<not set>".to_string(),
    }
}

pub fn config_check(settings: &Settings, env: &dyn Fn(&str) -> Option<String>) -> Result<()> {
    println!("SubTrack config:\n");
    println!("- {MASTER_KEY}: {}", mask(env(MASTER_KEY)));
    println!("- {BARK_KEY}: {}", mask(env(BARK_KEY)));
    println!("- {BARK_URL}: {}", mask(env(BARK_URL)));

    match RuntimeConfig::resolve(settings, env) {
        Ok(cfg) => {
            println!("- payload_path: {}", cfg.vault.payload_path.display());
            println!("- timezone: {}", cfg.vault.timezone);
            println!("- bark.server: {}", cfg.bark.server);
            println!("- bark.group: {}", cfg.bark.group.as_deref().unwrap_or("<none>"));
            println!("- bark.icons: {}", cfg.bark.icons);
            println!("\nReady: `subtrack check` will run.");
        }
        Err(e) => {
            println!("\nNot ready: {e}");
            println!("Set {MASTER_KEY} and {BARK_KEY} (or {BARK_URL}) in the environment or a .env file.");
        }
    }

    Ok(())
}

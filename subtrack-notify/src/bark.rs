//! Bark push delivery: one HTTP GET per alert.
//!
//! URL shape: `{server}/{device_key}/{title}/{body}?group=..&icon=..`, with the
//! key, title and body percent-encoded as path segments.

use reqwest::Url;
use std::fmt;
use std::future::Future;
use subtrack_core::{Alert, DueWindow, Notifier, NotifyError, Subscription};

pub const DEFAULT_SERVER: &str = "https://api.day.app";
pub const DEFAULT_GROUP: &str = "SubTrack";

#[derive(Clone)]
pub struct BarkConfig {
    /// Base address, e.g. `https://api.day.app`
    pub server: String,
    pub device_key: String,
    /// Notification group; `None` leaves it to the app
    pub group: Option<String>,
    /// Derive a logo URL from the subscription name when it has no icon
    pub icons: bool,
}

impl fmt::Debug for BarkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarkConfig")
            .field("server", &self.server)
            .field("device_key", &"<redacted>")
            .field("group", &self.group)
            .field("icons", &self.icons)
            .finish()
    }
}

impl BarkConfig {
    pub fn new(server: impl Into<String>, device_key: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            device_key: device_key.into(),
            group: Some(DEFAULT_GROUP.to_string()),
            icons: true,
        }
    }
}

pub fn title(window: DueWindow) -> String {
    format!("Subscription renewal ({window})")
}

pub fn body(alert: &Alert) -> String {
    format!(
        "{} renews {}: {}",
        alert.subscription.name,
        alert.window,
        alert.subscription.amount_label()
    )
}

/// Clearbit logo guess: "Disney Plus" -> `https://logo.clearbit.com/disneyplus.com`
pub fn derived_icon(sub: &Subscription) -> String {
    let slug: String = sub
        .name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("https://logo.clearbit.com/{slug}.com")
}

#[derive(Debug, Clone)]
pub struct BarkNotifier {
    client: reqwest::Client,
    config: BarkConfig,
}

impl BarkNotifier {
    pub fn new(config: BarkConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: BarkConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &BarkConfig {
        &self.config
    }

    /// Full request URL for an alert.
    pub fn request_url(&self, alert: &Alert) -> Result<Url, NotifyError> {
        let raw = format!(
            "{}/{}/{}/{}",
            self.config.server.trim_end_matches('/'),
            urlencoding::encode(self.config.device_key.trim()),
            urlencoding::encode(&title(alert.window)),
            urlencoding::encode(&body(alert)),
        );
        let mut url =
            Url::parse(&raw).map_err(|e| NotifyError::InvalidRequest(format!("{e} (server {})", self.config.server)))?;

        let icon = alert
            .subscription
            .icon
            .clone()
            .or_else(|| self.config.icons.then(|| derived_icon(&alert.subscription)));

        {
            let mut query = url.query_pairs_mut();
            if let Some(group) = self.config.group.as_deref().filter(|g| !g.is_empty()) {
                query.append_pair("group", group);
            }
            if let Some(icon) = icon.as_deref() {
                query.append_pair("icon", icon);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    async fn send(&self, url: Url) -> Result<(), NotifyError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

impl Notifier for BarkNotifier {
    fn notify(&self, alert: &Alert) -> impl Future<Output = Result<(), NotifyError>> + Send {
        let url = self.request_url(alert);
        async move { self.send(url?).await }
    }
}

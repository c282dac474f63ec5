use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use subtrack_core::{due_alerts, evaluate, today_in, Evaluation, Notifier};
use subtrack_notify::{bark, dispatch_all, BarkNotifier};
use subtrack_vault::{EncryptedFileStore, SubscriptionSource, VaultError};

use crate::config::{RuntimeConfig, Settings, VaultConfig};

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Log what would be sent without calling the push endpoint
    pub dry_run: bool,
    /// Evaluate as of this date instead of the current date in the configured zone
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Scheduled run: resolve config, decrypt, classify, notify.
pub async fn run(settings: &Settings, env: &dyn Fn(&str) -> Option<String>, opts: CheckOptions) -> Result<CheckSummary> {
    // Config errors surface before the store is touched.
    let cfg = RuntimeConfig::resolve(settings, env)?;
    let store = EncryptedFileStore::new(&cfg.vault.payload_path, cfg.vault.master_key.clone())?;
    let notifier = BarkNotifier::new(cfg.bark.clone());
    let today = opts
        .today
        .unwrap_or_else(|| today_in(cfg.vault.timezone, Utc::now()));

    check_subscriptions(&store, &notifier, today, cfg.vault.timezone, opts.dry_run).await
}

pub async fn check_subscriptions<S, N>(
    source: &S,
    notifier: &N,
    today: NaiveDate,
    tz: Tz,
    dry_run: bool,
) -> Result<CheckSummary>
where
    S: SubscriptionSource,
    N: Notifier,
{
    let subs = match source.load() {
        Ok(subs) => subs,
        Err(VaultError::PayloadAbsent(path)) => {
            tracing::info!(path = %path.display(), "no encrypted store, skipping check");
            return Ok(CheckSummary::default());
        }
        Err(e) => return Err(e).context("loading subscriptions"),
    };

    let evaluations = evaluate(&subs, today, tz);
    log_evaluations(&evaluations);

    let alerts = due_alerts(&evaluations);
    let mut summary = CheckSummary {
        checked: subs.len(),
        due: alerts.len(),
        ..Default::default()
    };

    if alerts.is_empty() {
        tracing::info!(checked = summary.checked, %today, "nothing due today or tomorrow");
        return Ok(summary);
    }

    if dry_run {
        for a in &alerts {
            println!("[DRY RUN] would notify: {} | {}", bark::title(a.window), bark::body(a));
        }
        return Ok(summary);
    }

    let report = dispatch_all(notifier, &alerts).await;
    summary.sent = report.sent.len();
    summary.failed = report.failed.len();

    tracing::info!(
        checked = summary.checked,
        due = summary.due,
        sent = summary.sent,
        failed = summary.failed,
        "check complete"
    );
    Ok(summary)
}

fn log_evaluations(evaluations: &[Evaluation]) {
    for e in evaluations {
        match &e.outcome {
            Ok(p) => tracing::info!(
                subscription = %e.subscription.name,
                next = %p.next_billing,
                days_left = p.days_until,
                "projected"
            ),
            Err(err) => tracing::warn!(
                subscription = %e.subscription.name,
                error = %err,
                "could not project billing date"
            ),
        }
    }
}

/// Print every subscription with its next billing date.
pub fn list(settings: &Settings, env: &dyn Fn(&str) -> Option<String>, today: Option<NaiveDate>) -> Result<()> {
    let cfg = VaultConfig::resolve(settings, env)?;
    let store = EncryptedFileStore::new(&cfg.payload_path, cfg.master_key.clone())?;

    let subs = match store.load() {
        Ok(subs) => subs,
        Err(VaultError::PayloadAbsent(path)) => {
            println!("No encrypted store at {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(e).context("loading subscriptions"),
    };

    let today = today.unwrap_or_else(|| today_in(cfg.timezone, Utc::now()));
    println!("Subscriptions as of {today} ({}):\n", cfg.timezone);

    for e in evaluate(&subs, today, cfg.timezone) {
        let s = &e.subscription;
        match e.outcome {
            Ok(p) => {
                let marker = p
                    .window
                    .map(|w| format!("  <- due {w}"))
                    .unwrap_or_default();
                println!(
                    "- {} | {} / {} | next {} ({} days){}",
                    s.name,
                    s.amount_label(),
                    s.period,
                    p.next_billing,
                    p.days_until,
                    marker
                );
            }
            Err(err) => println!("- {} | {} | {}", s.name, s.amount_label(), err),
        }
    }

    Ok(())
}

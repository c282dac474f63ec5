//! Fan out alerts to a notifier; a failed delivery never blocks the rest.

use futures_util::future::join_all;
use subtrack_core::{Alert, Notifier, NotifyError};

#[derive(Debug)]
pub struct FailedDelivery {
    pub name: String,
    pub error: NotifyError,
}

/// Outcome of one dispatch pass
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub sent: Vec<String>,
    pub failed: Vec<FailedDelivery>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.sent.len() + self.failed.len()
    }
}

/// Deliver every alert exactly once, concurrently. Order is not guaranteed.
pub async fn dispatch_all<N: Notifier>(notifier: &N, alerts: &[Alert]) -> DispatchReport {
    let results = join_all(alerts.iter().map(|alert| async move {
        let result = notifier.notify(alert).await;
        (alert, result)
    }))
    .await;

    let mut report = DispatchReport::default();
    for (alert, result) in results {
        let name = alert.subscription.name.clone();
        match result {
            Ok(()) => {
                tracing::info!(subscription = %name, window = %alert.window, "notification sent");
                report.sent.push(name);
            }
            Err(error) => {
                tracing::warn!(subscription = %name, window = %alert.window, %error, "notification failed");
                report.failed.push(FailedDelivery { name, error });
            }
        }
    }
    report
}

//! Due-today / due-tomorrow classification over a subscription list.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::billing::{next_billing_date, ProjectionError};
use crate::subscription::Subscription;
use crate::time::days_between;

/// Notification window a subscription falls into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DueWindow {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "tomorrow")]
    Tomorrow,
}

impl DueWindow {
    /// Classify a day offset; only 0 and 1 are actionable.
    pub fn from_days(days: i64) -> Option<Self> {
        match days {
            0 => Some(DueWindow::Today),
            1 => Some(DueWindow::Tomorrow),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            DueWindow::Today => "today",
            DueWindow::Tomorrow => "tomorrow",
        }
    }
}

impl fmt::Display for DueWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Result of projecting and classifying one subscription
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub subscription: Subscription,
    pub outcome: Result<Projection, ProjectionError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub next_billing: NaiveDate,
    pub days_until: i64,
    pub window: Option<DueWindow>,
}

/// A subscription that needs a notification this run
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub subscription: Subscription,
    pub next_billing: NaiveDate,
    pub window: DueWindow,
}

impl Evaluation {
    pub fn alert(&self) -> Option<Alert> {
        let projection = self.outcome.as_ref().ok()?;
        Some(Alert {
            subscription: self.subscription.clone(),
            next_billing: projection.next_billing,
            window: projection.window?,
        })
    }
}

/// Project one subscription relative to `today` in `tz`.
pub fn evaluate_one(sub: &Subscription, today: NaiveDate, tz: Tz) -> Evaluation {
    let outcome = next_billing_date(sub.date, &sub.period, today).map(|next_billing| {
        let days_until = days_between(today, next_billing, tz);
        Projection {
            next_billing,
            days_until,
            window: DueWindow::from_days(days_until),
        }
    });
    Evaluation {
        subscription: sub.clone(),
        outcome,
    }
}

/// Project every subscription, preserving input order.
pub fn evaluate(subs: &[Subscription], today: NaiveDate, tz: Tz) -> Vec<Evaluation> {
    subs.iter().map(|s| evaluate_one(s, today, tz)).collect()
}

/// Alerts for everything due today or tomorrow, one per subscription.
pub fn due_alerts(evaluations: &[Evaluation]) -> Vec<Alert> {
    evaluations.iter().filter_map(Evaluation::alert).collect()
}

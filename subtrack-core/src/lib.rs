//! subtrack-core: subscription model, billing-date projection and due classification

pub mod billing;
pub mod due;
pub mod notifier;
pub mod subscription;
pub mod time;

pub use billing::{next_billing_date, ProjectionError, MAX_ADVANCES};
pub use due::{due_alerts, evaluate, evaluate_one, Alert, DueWindow, Evaluation, Projection};
pub use notifier::{Notifier, NotifyError};
pub use subscription::{parse_anchor_date, Period, Subscription};
pub use time::{days_between, local_midnight, parse_timezone, today_in, InvalidTimezone};

//! subtrack-notify: Bark push notifier and per-alert dispatch

pub mod bark;
pub mod dispatch;

pub use bark::{BarkConfig, BarkNotifier, DEFAULT_GROUP, DEFAULT_SERVER};
pub use dispatch::{dispatch_all, DispatchReport, FailedDelivery};

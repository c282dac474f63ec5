//! Delivery seam: anything that can push an [`Alert`] somewhere.

use std::future::Future;
use thiserror::Error;

use crate::due::Alert;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("endpoint answered {status}")]
    Status { status: u16 },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Push channel for due subscriptions. Implementations deliver one alert per
/// call and report failure without panicking; callers decide whether a
/// failure matters.
pub trait Notifier {
    fn notify(&self, alert: &Alert) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

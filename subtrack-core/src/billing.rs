//! Billing-date projection: roll an anchor date forward to the next charge.

use chrono::{Months, NaiveDate};
use thiserror::Error;

use crate::subscription::Period;

/// Hard bound on period advances for a single projection (100 years of months).
pub const MAX_ADVANCES: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("anchor {anchor} is more than {MAX_ADVANCES} {period}s before {today}")]
    TooManyAdvances {
        anchor: NaiveDate,
        period: Period,
        today: NaiveDate,
    },
    #[error("advancing {anchor} by {steps} {period}s leaves the supported date range")]
    OutOfRange {
        anchor: NaiveDate,
        period: Period,
        steps: u32,
    },
}

/// Smallest date >= `today` reachable by advancing `anchor` one `period` at a time.
///
/// Each candidate is computed from the anchor (`anchor + k` months/years), so
/// end-of-month clamping never accumulates: a Jan 31 anchor yields Feb 29 and
/// then Mar 31, not Mar 29. Non-recurring periods return the anchor unchanged.
pub fn next_billing_date(
    anchor: NaiveDate,
    period: &Period,
    today: NaiveDate,
) -> Result<NaiveDate, ProjectionError> {
    let months_per_step = match period {
        Period::Month => 1,
        Period::Year => 12,
        Period::Other(_) => return Ok(anchor),
    };

    let mut candidate = anchor;
    let mut steps = 0u32;

    while candidate < today {
        if steps == MAX_ADVANCES {
            return Err(ProjectionError::TooManyAdvances {
                anchor,
                period: period.clone(),
                today,
            });
        }
        steps += 1;
        candidate = anchor
            .checked_add_months(Months::new(steps * months_per_step))
            .ok_or_else(|| ProjectionError::OutOfRange {
                anchor,
                period: period.clone(),
                steps,
            })?;
    }

    Ok(candidate)
}

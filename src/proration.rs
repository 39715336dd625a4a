//! Day-overlap proration math.
//!
//! An approved personal action enters a payroll scaled by the fraction of
//! its effective range that overlaps the payroll's worked period:
//!
//! ```text
//! overlap_days = min(action_end, period_end) - max(action_start, period_start) + 1
//! action_days  = action_end - action_start + 1
//! final_amount = amount * overlap_days / action_days, rounded to 2 decimals
//! ```
//!
//! An empty overlap yields zero units and a zero amount; the input is
//! still recorded so the action's consumption stays visible.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

/// The outcome of prorating one action against one worked period.
#[derive(Debug, Clone, PartialEq)]
pub struct Proration {
    /// Whole days of overlap between the action and the worked period.
    pub overlap_days: i64,
    /// Whole days in the action's effective range.
    pub action_days: i64,
    /// The prorated amount, rounded to 2 decimals.
    pub final_amount: Decimal,
    /// True when the action's effective start precedes the worked period.
    pub retro: bool,
    /// `YYYY-MM` of the action's effective start, when retro.
    pub original_period: Option<String>,
}

/// Prorates an action's amount by its day overlap with a worked period.
///
/// Both ranges are inclusive of both ends.
///
/// # Example
///
/// ```
/// use payroll_engine::proration::prorate;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let result = prorate(
///     Decimal::from(3000),
///     NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
/// );
/// assert_eq!(result.action_days, 32);
/// assert_eq!(result.overlap_days, 6);
/// assert_eq!(result.final_amount, Decimal::from_str("562.50").unwrap());
/// assert!(!result.retro);
/// ```
pub fn prorate(
    amount: Decimal,
    action_start: NaiveDate,
    action_end: NaiveDate,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Proration {
    let action_days = (action_end - action_start).num_days() + 1;

    let overlap_start = action_start.max(period_start);
    let overlap_end = action_end.min(period_end);
    let overlap_days = ((overlap_end - overlap_start).num_days() + 1).max(0);

    let final_amount = if overlap_days == 0 || action_days <= 0 {
        Decimal::ZERO
    } else {
        (amount * Decimal::from(overlap_days) / Decimal::from(action_days))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    let retro = action_start < period_start;
    let original_period =
        retro.then(|| format!("{:04}-{:02}", action_start.year(), action_start.month()));

    Proration {
        overlap_days,
        action_days,
        final_amount,
        retro,
        original_period,
    }
}

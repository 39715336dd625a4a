//! Payroll period model, lifecycle states and the slot-uniqueness key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::PayPeriodType;

/// The lifecycle state of a payroll period.
///
/// Periods move `Open → Processing → Verified → Applied → Posted`. A
/// period can additionally be soft-inactivated from any non-terminal
/// state; inactivation is a flag on [`PayrollPeriod`], not a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollState {
    /// Newly created; the only state in which fields may be edited.
    Open,
    /// Snapshots have been collected and results computed.
    Processing,
    /// An operator has confirmed the collected snapshots.
    Verified,
    /// The period has been applied; bound actions are consumed. Terminal.
    Applied,
    /// The period's payments have been posted downstream. Terminal.
    Posted,
}

impl PayrollState {
    /// Returns true for the immutable terminal states.
    pub fn is_terminal(self) -> bool {
        matches!(self, PayrollState::Applied | PayrollState::Posted)
    }
}

/// The identity that must be operationally unique among active payrolls:
/// at most one non-terminal, non-inactive period may exist per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    /// The company the payroll belongs to.
    pub company_id: Uuid,
    /// The worked-period start date.
    pub period_start: NaiveDate,
    /// The worked-period end date.
    pub period_end: NaiveDate,
    /// The pay-period type.
    pub period_type: PayPeriodType,
    /// The payroll currency.
    pub currency: String,
}

/// A payroll period: the unit the lifecycle state machine operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Unique identifier for the payroll period.
    pub id: Uuid,
    /// The company the payroll belongs to.
    pub company_id: Uuid,
    /// The pay-period type this payroll covers.
    pub period_type: PayPeriodType,
    /// ISO currency code for every amount in this payroll.
    pub currency: String,
    /// First day of the worked period (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the worked period (inclusive).
    pub period_end: NaiveDate,
    /// Last day on which inputs are accepted into this payroll.
    pub cutoff_date: NaiveDate,
    /// First day of the payment window.
    pub payment_window_start: NaiveDate,
    /// Last day of the payment window.
    pub payment_window_end: NaiveDate,
    /// The date payment is scheduled to go out.
    pub pay_date: NaiveDate,
    /// Current lifecycle state.
    pub state: PayrollState,
    /// Soft-inactivation flag; set instead of ever deleting a period.
    pub inactive: bool,
    /// Optimistic concurrency version, incremented on every mutation.
    pub version: u64,
    /// Set when out-of-band changes require snapshots to be re-collected
    /// before the payroll may be applied.
    pub requires_recalculation: bool,
    /// When snapshots were last collected for this payroll.
    pub last_snapshot_at: Option<DateTime<Utc>>,
}

impl PayrollPeriod {
    /// The slot identity this payroll occupies.
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            company_id: self.company_id,
            period_start: self.period_start,
            period_end: self.period_end,
            period_type: self.period_type,
            currency: self.currency.clone(),
        }
    }

    /// Returns true while this payroll occupies its slot: not inactive and
    /// not in a terminal state. Cleared the instant the payroll is applied
    /// or inactivated.
    pub fn is_active_slot(&self) -> bool {
        !self.inactive && !self.state.is_terminal()
    }

    /// Validates the date-rule guard applied on create and update.
    ///
    /// Rules: worked-period start ≤ end; cutoff within the worked period;
    /// payment window start ≤ end; scheduled pay date within the payment
    /// window and on or after the cutoff date.
    pub fn validate_dates(&self) -> EngineResult<()> {
        if self.period_start > self.period_end {
            return Err(EngineError::InvalidDates {
                message: "worked-period start must not be after its end".to_string(),
            });
        }
        if self.cutoff_date < self.period_start || self.cutoff_date > self.period_end {
            return Err(EngineError::InvalidDates {
                message: "cutoff date must fall within the worked period".to_string(),
            });
        }
        if self.payment_window_start > self.payment_window_end {
            return Err(EngineError::InvalidDates {
                message: "payment window start must not be after its end".to_string(),
            });
        }
        if self.pay_date < self.payment_window_start || self.pay_date > self.payment_window_end {
            return Err(EngineError::InvalidDates {
                message: "pay date must fall within the payment window".to_string(),
            });
        }
        if self.pay_date < self.cutoff_date {
            return Err(EngineError::InvalidDates {
                message: "pay date must be on or after the cutoff date".to_string(),
            });
        }
        Ok(())
    }
}

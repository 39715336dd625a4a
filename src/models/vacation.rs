//! Vacation account and the append-only balance ledger entry.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One vacation balance account per employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationAccount {
    /// The employee the account belongs to.
    pub employee_id: Uuid,
    /// The opening balance in days. Immutable after creation.
    pub initial_balance: Decimal,
    /// Day-of-month (1–28) on which the monthly accrual falls due,
    /// derived from the hire date.
    pub anchor_day: u32,
    /// The due date of the most recently recorded accrual.
    pub last_accrual_date: Option<NaiveDate>,
    /// Cleared when the employee leaves and accrual should stop.
    pub active: bool,
}

/// The kind of movement a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    /// The opening balance entry, written once per account.
    Initial,
    /// One day accrued for a completed month of service.
    MonthlyAccrual,
    /// Vacation days consumed through an applied payroll.
    VacationUsage,
    /// Reversal of a prior movement.
    Reversal,
    /// A manual balance adjustment.
    Adjustment,
}

/// The origin of a ledger movement, used as an idempotency key for
/// entries driven by external records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSourceType {
    /// A consumed vacation-type personal action on an applied payroll.
    PayrollAction,
    /// A manual adjustment or reversal.
    Manual,
}

/// One append-only movement on an employee's vacation balance.
///
/// Each entry stores both the delta and the resulting balance. The
/// resulting balance is always the immediately preceding entry's balance
/// plus this entry's delta; it is never derived any other way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationLedgerEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The employee whose balance moved.
    pub employee_id: Uuid,
    /// The kind of movement.
    pub kind: LedgerEntryKind,
    /// The movement in days (positive accrual, negative usage).
    pub delta_days: Decimal,
    /// The monetary provision or cost associated with the movement.
    pub amount: Decimal,
    /// The running balance in days after this entry.
    pub balance_days: Decimal,
    /// `YYYY-MM` label for accrual entries; the uniqueness key that keeps
    /// the provision run idempotent.
    pub period_label: Option<String>,
    /// The origin of the movement, when driven by an external record.
    pub source_type: Option<LedgerSourceType>,
    /// The id of the originating record.
    pub source_id: Option<Uuid>,
    /// When the entry was appended.
    pub recorded_at: DateTime<Utc>,
}

//! Immutable per-payroll snapshot records and aggregated results.
//!
//! Snapshots freeze the state of the world at collection time. They are
//! wiped and rewritten wholesale when a non-terminal payroll is
//! re-collected; they are never edited in place.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ActionType, PayPeriodType};

/// One employee's roster data frozen as of collection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSnapshot {
    /// The payroll this snapshot belongs to.
    pub payroll_id: Uuid,
    /// The employee the snapshot captures.
    pub employee_id: Uuid,
    /// Salary at collection time.
    pub salary: Decimal,
    /// Currency at collection time.
    pub currency: String,
    /// Pay-period type at collection time.
    pub pay_period_type: PayPeriodType,
    /// Work schedule label at collection time.
    pub schedule: String,
    /// Bank account at collection time.
    pub bank_account: Option<String>,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

/// Where an input snapshot came from.
///
/// Together with the source id this forms the idempotency key: at most one
/// input per (source type, source id) per payroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSourceType {
    /// A prorated personal action.
    PersonalAction,
    /// A manually entered input.
    Manual,
    /// An import from an external time source.
    TimeImport,
}

/// One consumed input attached to a payroll: a prorated personal action or
/// a manual/time-source entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// The payroll this input belongs to.
    pub payroll_id: Uuid,
    /// The kind of source this input came from.
    pub source_type: InputSourceType,
    /// The id of the source record (action id for personal actions).
    pub source_id: Uuid,
    /// The employee the input applies to.
    pub employee_id: Uuid,
    /// The action type behind this input.
    pub action_type: ActionType,
    /// Prorated unit count (overlap days for personal actions).
    pub units: Decimal,
    /// The source's original full amount.
    pub base_amount: Decimal,
    /// The prorated amount entering this payroll.
    pub final_amount: Decimal,
    /// True when the action's effective start precedes the worked period.
    pub retro: bool,
    /// The `YYYY-MM` the input should have applied to, when retro.
    pub original_period: Option<String>,
}

/// Aggregated monetary results for one employee in one payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollResultRow {
    /// The payroll this result belongs to.
    pub payroll_id: Uuid,
    /// The employee the result is for.
    pub employee_id: Uuid,
    /// Sum of non-deduction input amounts.
    pub gross: Decimal,
    /// Sum of deduction-type input amounts.
    pub deductions: Decimal,
    /// Gross minus deductions.
    pub net: Decimal,
}

/// Company-wide totals across a payroll's result rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTotals {
    /// Total gross across all employees.
    pub gross: Decimal,
    /// Total deductions across all employees.
    pub deductions: Decimal,
    /// Total net across all employees.
    pub net: Decimal,
}

/// A read-only summary of a payroll's collected state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    /// Number of employee snapshots.
    pub employees: usize,
    /// Number of input snapshots.
    pub inputs: usize,
    /// Number of personal actions currently bound to the payroll.
    pub bound_actions: usize,
    /// Monetary totals across result rows.
    pub totals: ResultTotals,
}

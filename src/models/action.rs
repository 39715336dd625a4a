//! Personal action model: one-off monetary adjustments (raises, bonuses,
//! deductions, vacation days) that flow into a payroll when collected.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of personal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A salary raise for the effective range.
    Raise,
    /// A one-off bonus.
    Bonus,
    /// A sales commission.
    Commission,
    /// Overtime pay.
    Overtime,
    /// A generic deduction from pay.
    Deduction,
    /// A loan repayment withheld from pay.
    LoanRepayment,
    /// Paid vacation days; consumption is mirrored into the vacation
    /// ledger when the payroll is applied.
    VacationDays,
}

impl ActionType {
    /// Returns true for action types that accumulate into total deductions
    /// rather than gross pay.
    pub fn is_deduction(self) -> bool {
        matches!(self, ActionType::Deduction | ActionType::LoanRepayment)
    }
}

/// The lifecycle state of a personal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    /// Created but not yet submitted for approval.
    Draft,
    /// Awaiting approval.
    PendingApproval,
    /// Approved and eligible for collection into a payroll.
    Approved,
    /// Rejected during approval; never collected.
    Rejected,
    /// Bound to an applied payroll. Immutable.
    Consumed,
    /// Invalidated by the eligibility engine or manually; never consumed.
    Invalidated,
    /// Effective end date passed without ever being collected.
    Expired,
}

impl ActionState {
    /// The single classification point for "approved-like" states that a
    /// payroll may bind and later consume. Adding a new approved-like
    /// state is a one-place change here.
    pub fn is_consumable(self) -> bool {
        matches!(self, ActionState::Approved)
    }
}

/// Why an action was invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvalidationReason {
    /// The employee was terminated before the action's effective date.
    TerminationEffective,
    /// The employee's current company differs from the action's company.
    CompanyMismatch,
    /// The employee's (or target payroll's) currency differs from the
    /// action's currency.
    CurrencyMismatch,
    /// Invalidated manually by an operator.
    Manual,
}

/// Who performed an invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// A scheduled or triggered system job.
    System,
    /// A human operator.
    User,
}

/// Audit metadata stamped onto an action when it is invalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invalidation {
    /// The reason code.
    pub reason: InvalidationReason,
    /// Whether the system or a user invalidated the action.
    pub actor_type: ActorType,
    /// The invalidating actor, when a user.
    pub actor_id: Option<Uuid>,
    /// When the invalidation happened.
    pub at: DateTime<Utc>,
    /// Structured audit payload describing the mismatch.
    pub detail: serde_json::Value,
}

/// A personal action awaiting (or past) collection into a payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalAction {
    /// Unique identifier for the action.
    pub id: Uuid,
    /// The company the action was recorded under.
    pub company_id: Uuid,
    /// The employee the action applies to.
    pub employee_id: Uuid,
    /// The kind of action.
    pub action_type: ActionType,
    /// Current lifecycle state.
    pub state: ActionState,
    /// First day the action is effective (inclusive).
    pub effective_start: NaiveDate,
    /// Last day the action is effective (inclusive).
    pub effective_end: NaiveDate,
    /// The full amount of the action in the action's currency.
    pub amount: Decimal,
    /// ISO currency code of the amount.
    pub currency: String,
    /// When the action was approved, if it has been.
    pub approved_at: Option<DateTime<Utc>>,
    /// The payroll this action is bound to, once collected.
    pub payroll_id: Option<Uuid>,
    /// Optimistic concurrency version, incremented on every transition.
    pub version: u64,
    /// Present once the action has been invalidated.
    pub invalidation: Option<Invalidation>,
}

impl PersonalAction {
    /// The number of whole days in the action's effective range.
    pub fn action_days(&self) -> i64 {
        (self.effective_end - self.effective_start).num_days() + 1
    }

    /// Returns true while the action may still be bound to a payroll:
    /// consumable state and no existing binding.
    pub fn is_bindable(&self) -> bool {
        self.state.is_consumable() && self.payroll_id.is_none()
    }
}

//! Vacation Ledger.
//!
//! An append-only balance ledger per employee. Every movement (initial
//! balance, monthly accrual, usage, reversal, adjustment) is one entry
//! carrying the delta and the resulting balance; the resulting balance is
//! always the immediately preceding entry's balance plus the delta.
//! Accruals are keyed by (employee, period label) and usage by the
//! originating payroll action, so both jobs are safe to re-run.

mod account;
mod accrual;
mod usage;

pub use account::{
    append_entry, create_initial_account, reconcile_balance, BalanceReconciliation,
};
pub use accrual::{next_anchor_date, run_daily_provision, AccrualOutcome};
pub use usage::apply_usage_from_payroll;

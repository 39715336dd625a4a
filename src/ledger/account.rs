//! Vacation account creation, the append primitive and balance
//! reconciliation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    LedgerEntryKind, LedgerSourceType, VacationAccount, VacationLedgerEntry,
};
use crate::store::StoreData;

/// Appends one entry to an employee's ledger.
///
/// The resulting balance is computed as the immediately preceding entry's
/// balance plus the new delta. This is the only place a balance is ever
/// written.
#[allow(clippy::too_many_arguments)]
pub fn append_entry(
    data: &mut StoreData,
    employee_id: Uuid,
    kind: LedgerEntryKind,
    delta_days: Decimal,
    amount: Decimal,
    period_label: Option<String>,
    source: Option<(LedgerSourceType, Uuid)>,
    now: DateTime<Utc>,
) -> VacationLedgerEntry {
    let previous_balance = data
        .last_ledger_entry(employee_id)
        .map(|e| e.balance_days)
        .unwrap_or(Decimal::ZERO);

    let entry = VacationLedgerEntry {
        id: Uuid::new_v4(),
        employee_id,
        kind,
        delta_days,
        amount,
        balance_days: previous_balance + delta_days,
        period_label,
        source_type: source.map(|(t, _)| t),
        source_id: source.map(|(_, id)| id),
        recorded_at: now,
    };
    data.ledger.push(entry.clone());
    entry
}

/// Creates an employee's vacation account and its opening entry.
///
/// The anchor day is the day-of-month of the hire date, clamped into
/// [1, 28]. The `INITIAL` entry is appended only if none exists yet for
/// the account, so calling this twice is safe.
pub fn create_initial_account(
    data: &mut StoreData,
    employee_id: Uuid,
    initial_balance: Decimal,
    now: DateTime<Utc>,
) -> EngineResult<VacationAccount> {
    let employee = data.employee(employee_id)?;
    if initial_balance < Decimal::ZERO {
        return Err(EngineError::PreconditionFailed {
            message: "initial vacation balance must not be negative".to_string(),
        });
    }
    let anchor_day = employee.accrual_anchor_day();

    let account = data
        .accounts
        .entry(employee_id)
        .or_insert_with(|| VacationAccount {
            employee_id,
            initial_balance,
            anchor_day,
            last_accrual_date: None,
            active: true,
        })
        .clone();

    let has_initial = data
        .ledger
        .iter()
        .any(|e| e.employee_id == employee_id && e.kind == LedgerEntryKind::Initial);
    if !has_initial {
        append_entry(
            data,
            employee_id,
            LedgerEntryKind::Initial,
            account.initial_balance,
            Decimal::ZERO,
            None,
            None,
            now,
        );
    }

    Ok(account)
}

/// The outcome of recomputing a ledger's running balance from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReconciliation {
    /// The balance stored on the latest entry.
    pub stored: Decimal,
    /// The balance recomputed as the sum of all deltas.
    pub recomputed: Decimal,
    /// Entries whose stored balance disagrees with the recomputation.
    pub drifted_entries: Vec<Uuid>,
}

impl BalanceReconciliation {
    /// True when the stored running balances match the recomputation
    /// entry for entry.
    pub fn consistent(&self) -> bool {
        self.stored == self.recomputed && self.drifted_entries.is_empty()
    }
}

/// Recomputes the running balance from the `INITIAL` entry onward and
/// compares it against the stored balances.
///
/// The stored running balance is the ledger's read optimization and its
/// integrity risk; this audit function is the check that keeps it honest.
pub fn reconcile_balance(
    data: &StoreData,
    employee_id: Uuid,
) -> EngineResult<BalanceReconciliation> {
    if !data.accounts.contains_key(&employee_id) {
        return Err(EngineError::AccountNotFound { employee_id });
    }

    let mut running = Decimal::ZERO;
    let mut drifted = Vec::new();
    let mut stored = Decimal::ZERO;
    for entry in data.ledger_for(employee_id) {
        running += entry.delta_days;
        if entry.balance_days != running {
            drifted.push(entry.id);
        }
        stored = entry.balance_days;
    }

    Ok(BalanceReconciliation {
        stored,
        recomputed: running,
        drifted_entries: drifted,
    })
}

//! In-memory relational store with closure-scoped transactions.
//!
//! Every engine operation runs inside a single [`Store::transaction`]
//! call. The transaction takes the writer lock, works on a copy of the
//! data and commits only on success, so a failed operation never leaves a
//! partial write behind. One writer at a time gives the
//! serializable-or-better isolation the lifecycle guards assume.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, EmployeeSnapshot, InputSnapshot, InputSourceType, LedgerEntryKind,
    PayrollPeriod, PayrollResultRow, PersonalAction, SlotKey, VacationAccount,
    VacationLedgerEntry,
};

/// The tables behind the engine.
///
/// Transaction closures receive `&mut StoreData` and may use the query
/// helpers and the public fields directly.
#[derive(Debug, Clone, Default)]
pub struct StoreData {
    /// Payroll periods by id.
    pub payrolls: HashMap<Uuid, PayrollPeriod>,
    /// Employee roster by id.
    pub employees: HashMap<Uuid, Employee>,
    /// Personal actions by id.
    pub actions: HashMap<Uuid, PersonalAction>,
    /// Employee snapshots, append-ordered.
    pub employee_snapshots: Vec<EmployeeSnapshot>,
    /// Input snapshots, append-ordered.
    pub input_snapshots: Vec<InputSnapshot>,
    /// Per-employee payroll results, append-ordered.
    pub results: Vec<PayrollResultRow>,
    /// Vacation accounts by employee id.
    pub accounts: HashMap<Uuid, VacationAccount>,
    /// The append-only vacation ledger, in append order.
    pub ledger: Vec<VacationLedgerEntry>,
}

impl StoreData {
    /// Fetches a payroll or returns `PayrollNotFound`.
    pub fn payroll(&self, id: Uuid) -> EngineResult<&PayrollPeriod> {
        self.payrolls
            .get(&id)
            .ok_or(EngineError::PayrollNotFound { id })
    }

    /// Fetches a payroll mutably or returns `PayrollNotFound`.
    pub fn payroll_mut(&mut self, id: Uuid) -> EngineResult<&mut PayrollPeriod> {
        self.payrolls
            .get_mut(&id)
            .ok_or(EngineError::PayrollNotFound { id })
    }

    /// Fetches an employee or returns `EmployeeNotFound`.
    pub fn employee(&self, id: Uuid) -> EngineResult<&Employee> {
        self.employees
            .get(&id)
            .ok_or(EngineError::EmployeeNotFound { id })
    }

    /// Fetches an action or returns `ActionNotFound`.
    pub fn action(&self, id: Uuid) -> EngineResult<&PersonalAction> {
        self.actions.get(&id).ok_or(EngineError::ActionNotFound { id })
    }

    /// Fetches an action mutably or returns `ActionNotFound`.
    pub fn action_mut(&mut self, id: Uuid) -> EngineResult<&mut PersonalAction> {
        self.actions
            .get_mut(&id)
            .ok_or(EngineError::ActionNotFound { id })
    }

    /// Fetches a vacation account mutably or returns `AccountNotFound`.
    pub fn account_mut(&mut self, employee_id: Uuid) -> EngineResult<&mut VacationAccount> {
        self.accounts
            .get_mut(&employee_id)
            .ok_or(EngineError::AccountNotFound { employee_id })
    }

    /// Returns true if another payroll with an active slot occupies the
    /// given slot key.
    pub fn active_slot_taken(&self, slot: &SlotKey, exclude_id: Uuid) -> bool {
        self.payrolls
            .values()
            .any(|p| p.id != exclude_id && p.is_active_slot() && &p.slot_key() == slot)
    }

    /// Employee snapshots belonging to one payroll.
    pub fn employee_snapshots_for(&self, payroll_id: Uuid) -> Vec<&EmployeeSnapshot> {
        self.employee_snapshots
            .iter()
            .filter(|s| s.payroll_id == payroll_id)
            .collect()
    }

    /// Input snapshots belonging to one payroll.
    pub fn input_snapshots_for(&self, payroll_id: Uuid) -> Vec<&InputSnapshot> {
        self.input_snapshots
            .iter()
            .filter(|s| s.payroll_id == payroll_id)
            .collect()
    }

    /// Result rows belonging to one payroll.
    pub fn results_for(&self, payroll_id: Uuid) -> Vec<&PayrollResultRow> {
        self.results
            .iter()
            .filter(|r| r.payroll_id == payroll_id)
            .collect()
    }

    /// Returns true if an input with this idempotency key already exists
    /// on the payroll.
    pub fn input_exists(
        &self,
        payroll_id: Uuid,
        source_type: InputSourceType,
        source_id: Uuid,
    ) -> bool {
        self.input_snapshots.iter().any(|s| {
            s.payroll_id == payroll_id && s.source_type == source_type && s.source_id == source_id
        })
    }

    /// Ids of actions currently bound to the payroll.
    pub fn bound_action_ids(&self, payroll_id: Uuid) -> Vec<Uuid> {
        self.actions
            .values()
            .filter(|a| a.payroll_id == Some(payroll_id))
            .map(|a| a.id)
            .collect()
    }

    /// Deletes the payroll's snapshots, inputs and results, and releases
    /// still-consumable actions bound to it so a re-collection starts
    /// from a clean slate.
    pub fn wipe_payroll_data(&mut self, payroll_id: Uuid) {
        self.employee_snapshots.retain(|s| s.payroll_id != payroll_id);
        self.input_snapshots.retain(|s| s.payroll_id != payroll_id);
        self.results.retain(|r| r.payroll_id != payroll_id);
        for action in self.actions.values_mut() {
            if action.payroll_id == Some(payroll_id) && action.state.is_consumable() {
                action.payroll_id = None;
            }
        }
    }

    /// Ledger entries for one employee, in append order.
    pub fn ledger_for(&self, employee_id: Uuid) -> Vec<&VacationLedgerEntry> {
        self.ledger
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .collect()
    }

    /// The employee's most recent ledger entry.
    pub fn last_ledger_entry(&self, employee_id: Uuid) -> Option<&VacationLedgerEntry> {
        self.ledger
            .iter()
            .rev()
            .find(|e| e.employee_id == employee_id)
    }

    /// Returns true if an accrual entry exists for (employee, period
    /// label); the uniqueness guard for the provision run.
    pub fn accrual_recorded(&self, employee_id: Uuid, period_label: &str) -> bool {
        self.ledger.iter().any(|e| {
            e.employee_id == employee_id
                && e.kind == LedgerEntryKind::MonthlyAccrual
                && e.period_label.as_deref() == Some(period_label)
        })
    }

    /// Returns true if a ledger entry already references the given source
    /// record; the idempotency guard for usage posting.
    pub fn ledger_source_recorded(&self, source_id: Uuid) -> bool {
        self.ledger.iter().any(|e| e.source_id == Some(source_id))
    }
}

/// The engine's store: shared tables behind a writer lock.
#[derive(Debug, Default)]
pub struct Store {
    inner: RwLock<StoreData>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a read-write transaction. The closure works on a copy of the
    /// data; the copy replaces the live data only when the closure
    /// returns `Ok`, so errors roll back completely.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreData) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut guard = self.inner.write().expect("store lock poisoned");
        let mut working = guard.clone();
        let result = f(&mut working)?;
        *guard = working;
        Ok(result)
    }

    /// Runs a read-only query against the live data.
    pub fn read<T>(&self, f: impl FnOnce(&StoreData) -> T) -> T {
        let guard = self.inner.read().expect("store lock poisoned");
        f(&guard)
    }
}

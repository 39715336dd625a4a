//! Core data models for the Payroll Lifecycle Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod action;
mod employee;
mod payroll;
mod snapshot;
mod vacation;

pub use action::{
    ActionState, ActionType, ActorType, Invalidation, InvalidationReason, PersonalAction,
};
pub use employee::{Employee, PayPeriodType};
pub use payroll::{PayrollPeriod, PayrollState, SlotKey};
pub use snapshot::{
    EmployeeSnapshot, InputSnapshot, InputSourceType, PayrollResultRow, ResultTotals,
    SnapshotSummary,
};
pub use vacation::{LedgerEntryKind, LedgerSourceType, VacationAccount, VacationLedgerEntry};

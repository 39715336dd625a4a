//! Error types for the Payroll Lifecycle Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Errors fall into four families that callers handle differently:
//! precondition violations (fix the input or wait for the right state),
//! conflicts (reload and retry), not-found, and configuration errors.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{ActionState, PayrollState};

/// The main error type for the Payroll Lifecycle Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
/// use uuid::Uuid;
///
/// let error = EngineError::PayrollNotFound { id: Uuid::nil() };
/// assert!(error.is_not_found());
/// assert_eq!(
///     error.to_string(),
///     "Payroll not found: 00000000-0000-0000-0000-000000000000"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No payroll period exists with the given id.
    #[error("Payroll not found: {id}")]
    PayrollNotFound {
        /// The payroll id that was not found.
        id: Uuid,
    },

    /// No employee exists with the given id.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee id that was not found.
        id: Uuid,
    },

    /// No personal action exists with the given id.
    #[error("Personal action not found: {id}")]
    ActionNotFound {
        /// The action id that was not found.
        id: Uuid,
    },

    /// No vacation account exists for the given employee.
    #[error("Vacation account not found for employee {employee_id}")]
    AccountNotFound {
        /// The employee whose account was requested.
        employee_id: Uuid,
    },

    /// A lifecycle operation was attempted from a state that does not
    /// permit it.
    #[error("Cannot {operation} payroll {id} in state {state:?}: {message}")]
    InvalidTransition {
        /// The payroll the operation targeted.
        id: Uuid,
        /// The payroll's current state.
        state: PayrollState,
        /// The operation that was attempted.
        operation: &'static str,
        /// Why the transition is not permitted.
        message: String,
    },

    /// A personal-action operation was attempted from a state that does
    /// not permit it.
    #[error("Cannot {operation} action {id} in state {state:?}")]
    InvalidActionState {
        /// The action the operation targeted.
        id: Uuid,
        /// The action's current state.
        state: ActionState,
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// The payroll's date fields violate the date-rule guard.
    #[error("Invalid payroll dates: {message}")]
    InvalidDates {
        /// A description of the violated rule.
        message: String,
    },

    /// A non-state precondition was not met (missing snapshots, pending
    /// recalculation, invalid input data).
    #[error("Precondition failed: {message}")]
    PreconditionFailed {
        /// A description of the unmet precondition.
        message: String,
    },

    /// Another operationally active payroll already occupies the same
    /// (company, worked period, type, currency) slot.
    #[error("An active payroll already exists for this company, period, type and currency")]
    SlotConflict,

    /// The caller's expected version did not match the current version.
    /// The caller must reload and retry.
    #[error("Version conflict on payroll {id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// The payroll the operation targeted.
        id: Uuid,
        /// The version the caller expected.
        expected: u64,
        /// The version actually found.
        actual: u64,
    },

    /// The actor lacks the capability required for the operation.
    #[error("Actor {actor_id} lacks capability '{capability}'")]
    PermissionDenied {
        /// The actor that was denied.
        actor_id: Uuid,
        /// The capability that was required.
        capability: String,
    },
}

impl EngineError {
    /// Returns true for client-correctable precondition violations.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidTransition { .. }
                | EngineError::InvalidActionState { .. }
                | EngineError::InvalidDates { .. }
                | EngineError::PreconditionFailed { .. }
                | EngineError::PermissionDenied { .. }
        )
    }

    /// Returns true for conflicts where the caller should reload and retry
    /// rather than fix input.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EngineError::SlotConflict | EngineError::VersionConflict { .. }
        )
    }

    /// Returns true when the referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::PayrollNotFound { .. }
                | EngineError::EmployeeNotFound { .. }
                | EngineError::ActionNotFound { .. }
                | EngineError::AccountNotFound { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

//! Action Eligibility Engine.
//!
//! Personal actions are approved against a snapshot of the employee's
//! context that can drift before collection: the employee may be
//! terminated, moved to another company, or switched to another currency.
//! This module owns the rules that detect such drift and invalidate the
//! affected actions, plus the hygiene rule that expires approved actions
//! whose effective range passed without ever being collected.
//!
//! The sweep is idempotent: a second consecutive run invalidates zero
//! additional rows because every rule only matches consumable, unbound
//! actions.

mod rules;
mod sweep;

pub use rules::{company_mismatch, currency_mismatch, terminated_before_effective};
pub use sweep::{run_sweep, SweepOutcome, SweepScope};

//! Payroll Lifecycle Engine
//!
//! This crate implements the payroll lifecycle: opening a payroll period,
//! freezing employee roster and approved personal actions into immutable
//! snapshots, verifying and atomically applying the period, and maintaining
//! the append-only vacation balance ledger that records monthly accruals
//! and usage deductions.

#![warn(missing_docs)]

pub mod audit;
pub mod collector;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod models;
pub mod proration;
pub mod store;

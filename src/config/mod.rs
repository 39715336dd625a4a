//! Configuration loading and management for the Payroll Lifecycle Engine.
//!
//! The engine configuration controls the vacation accrual provision
//! formula (a divisor per pay-period type) and which action types count
//! as vacation usage. A built-in default covers every standard type; a
//! YAML file can override it per deployment.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/engine.yaml").unwrap();
//! println!("Default divisor: {}", config.config().accrual.default_divisor);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AccrualSettings, EngineConfig};

//! Configuration data structures.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ActionType, PayPeriodType};

/// Settings for the monthly vacation accrual provision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualSettings {
    /// Divisor overrides per pay-period type. Types not listed here use
    /// their built-in divisor.
    #[serde(default)]
    pub divisors: HashMap<PayPeriodType, Decimal>,
    /// Divisor for pay-period types with no mapping at all.
    pub default_divisor: Decimal,
}

impl AccrualSettings {
    /// The divisor to use for the given pay-period type: configured
    /// override first, then the type's built-in value.
    pub fn divisor_for(&self, period_type: PayPeriodType) -> Decimal {
        self.divisors
            .get(&period_type)
            .copied()
            .unwrap_or_else(|| period_type.default_provision_divisor())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Vacation accrual provision settings.
    pub accrual: AccrualSettings,
    /// Action types whose consumption is mirrored into the vacation
    /// ledger as usage.
    pub vacation_action_types: Vec<ActionType>,
}

impl EngineConfig {
    /// Returns true if the action type is recognized as vacation usage.
    pub fn is_vacation_type(&self, action_type: ActionType) -> bool {
        self.vacation_action_types.contains(&action_type)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            accrual: AccrualSettings {
                divisors: HashMap::new(),
                default_divisor: Decimal::from(30),
            },
            vacation_action_types: vec![ActionType::VacationDays],
        }
    }
}

//! The invalidation sweep: select-then-update pairs over identically
//! scoped rows, one transaction per run.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{ActionState, ActorType, Invalidation, InvalidationReason};
use crate::store::StoreData;

use super::rules;

/// What the sweep should look at.
#[derive(Debug, Clone, Default)]
pub struct SweepScope {
    /// Limit to one company's actions; `None` sweeps every company.
    pub company_id: Option<Uuid>,
    /// Cross-check currencies against this payroll's currency.
    pub target_payroll_id: Option<Uuid>,
    /// The actor to stamp onto invalidations, when a user triggered the
    /// sweep. System runs leave this empty.
    pub actor_id: Option<Uuid>,
}

/// Counts reported by one sweep run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Actions invalidated, by reason code.
    pub invalidated_by_reason: HashMap<InvalidationReason, usize>,
    /// Approved actions expired by the hygiene rule.
    pub expired: usize,
}

impl SweepOutcome {
    /// Total actions invalidated across all reasons.
    pub fn total_invalidated(&self) -> usize {
        self.invalidated_by_reason.values().sum()
    }
}

/// Runs the three invalidation rules and the expiry hygiene rule against
/// every consumable, unbound action in scope.
///
/// Each rule is a select+update pair over the same row set: the ids are
/// selected first, then exactly those rows are flipped, so reporting and
/// mutation can never diverge. Running the sweep twice in a row
/// invalidates nothing the second time.
pub fn run_sweep(
    data: &mut StoreData,
    scope: &SweepScope,
    as_of: NaiveDate,
) -> EngineResult<SweepOutcome> {
    let target_currency: Option<String> = match scope.target_payroll_id {
        Some(id) => Some(data.payroll(id)?.currency.clone()),
        None => None,
    };

    let mut outcome = SweepOutcome::default();

    for reason in [
        InvalidationReason::TerminationEffective,
        InvalidationReason::CompanyMismatch,
        InvalidationReason::CurrencyMismatch,
    ] {
        // Select: the ids matching the rule, with the employee context
        // joined in.
        let matching: Vec<Uuid> = data
            .actions
            .values()
            .filter(|a| a.is_bindable())
            .filter(|a| scope.company_id.is_none_or(|c| a.company_id == c))
            .filter(|a| {
                let Some(employee) = data.employees.get(&a.employee_id) else {
                    return false;
                };
                match reason {
                    InvalidationReason::TerminationEffective => {
                        rules::terminated_before_effective(employee, a)
                    }
                    InvalidationReason::CompanyMismatch => rules::company_mismatch(employee, a),
                    InvalidationReason::CurrencyMismatch => {
                        rules::currency_mismatch(employee, a, target_currency.as_deref())
                    }
                    InvalidationReason::Manual => false,
                }
            })
            .map(|a| a.id)
            .collect();

        // Update: flip exactly the selected rows.
        for id in &matching {
            let detail = invalidation_detail(data, *id, reason);
            let action = data.action_mut(*id)?;
            action.state = ActionState::Invalidated;
            action.version += 1;
            action.invalidation = Some(Invalidation {
                reason,
                actor_type: if scope.actor_id.is_some() {
                    ActorType::User
                } else {
                    ActorType::System
                },
                actor_id: scope.actor_id,
                at: Utc::now(),
                detail,
            });
        }

        if !matching.is_empty() {
            warn!(
                reason = ?reason,
                count = matching.len(),
                sample_id = %matching[0],
                "eligibility sweep invalidated actions"
            );
            *outcome.invalidated_by_reason.entry(reason).or_insert(0) += matching.len();
        }
    }

    // Hygiene rule: approved actions whose effective range ended without
    // ever being collected.
    let stale: Vec<Uuid> = data
        .actions
        .values()
        .filter(|a| a.is_bindable())
        .filter(|a| scope.company_id.is_none_or(|c| a.company_id == c))
        .filter(|a| a.effective_end < as_of)
        .map(|a| a.id)
        .collect();
    for id in &stale {
        let action = data.action_mut(*id)?;
        action.state = ActionState::Expired;
        action.version += 1;
    }
    if !stale.is_empty() {
        warn!(
            count = stale.len(),
            sample_id = %stale[0],
            "eligibility sweep expired uncollected actions"
        );
    }
    outcome.expired = stale.len();

    Ok(outcome)
}

/// Builds the structured audit payload for one invalidation.
fn invalidation_detail(
    data: &StoreData,
    action_id: Uuid,
    reason: InvalidationReason,
) -> serde_json::Value {
    let action = &data.actions[&action_id];
    let employee = data.employees.get(&action.employee_id);
    serde_json::json!({
        "rule": reason,
        "action_id": action.id,
        "action_company": action.company_id,
        "action_currency": action.currency,
        "effective_start": action.effective_start,
        "employee_company": employee.map(|e| e.company_id),
        "employee_currency": employee.map(|e| e.currency.clone()),
        "employee_termination_date": employee.and_then(|e| e.termination_date),
    })
}

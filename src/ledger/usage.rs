//! Posting vacation usage from an applied payroll.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ActionState, InputSourceType, LedgerEntryKind, LedgerSourceType,
};
use crate::store::StoreData;

use super::account::append_entry;

/// Appends one negative-delta usage entry per consumed vacation-type
/// action bound to an applied payroll.
///
/// Each entry is keyed by (payroll action, action id); repeated calls are
/// no-ops, so this may run as an idempotent follow-up transaction after
/// the apply, and be retried freely.
pub fn apply_usage_from_payroll(
    data: &mut StoreData,
    config: &EngineConfig,
    payroll_id: Uuid,
    now: DateTime<Utc>,
) -> EngineResult<usize> {
    let payroll = data.payroll(payroll_id)?;
    if !payroll.state.is_terminal() {
        return Err(EngineError::PreconditionFailed {
            message: format!(
                "vacation usage can only be posted from an applied payroll, not {:?}",
                payroll.state
            ),
        });
    }

    let mut consumed_vacation: Vec<Uuid> = data
        .actions
        .values()
        .filter(|a| a.payroll_id == Some(payroll_id))
        .filter(|a| a.state == ActionState::Consumed)
        .filter(|a| config.is_vacation_type(a.action_type))
        .map(|a| a.id)
        .collect();
    consumed_vacation.sort();

    let mut appended = 0usize;
    for action_id in consumed_vacation {
        if data.ledger_source_recorded(action_id) {
            continue;
        }

        let action = data.action(action_id)?.clone();
        // The input snapshot carries the prorated day count actually
        // consumed by this payroll.
        let input = data
            .input_snapshots
            .iter()
            .find(|i| {
                i.payroll_id == payroll_id
                    && i.source_type == InputSourceType::PersonalAction
                    && i.source_id == action_id
            })
            .cloned()
            .ok_or_else(|| EngineError::PreconditionFailed {
                message: format!(
                    "consumed action {action_id} has no input snapshot on payroll {payroll_id}"
                ),
            })?;

        append_entry(
            data,
            action.employee_id,
            LedgerEntryKind::VacationUsage,
            -input.units,
            input.final_amount,
            None,
            Some((LedgerSourceType::PayrollAction, action_id)),
            now,
        );
        appended += 1;
    }

    if appended > 0 {
        info!(%payroll_id, entries = appended, "vacation usage posted from payroll");
    }
    Ok(appended)
}

//! Snapshot Collector.
//!
//! Freezes the employee roster and the approved personal actions of a
//! payroll's company into immutable per-payroll records, then aggregates
//! per-employee results. Collection is idempotent: the payroll's prior
//! snapshot data is wiped first, and each input carries a (source type,
//! source id) key that is unique per payroll.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    EmployeeSnapshot, InputSnapshot, InputSourceType, PayrollResultRow,
};
use crate::proration::prorate;
use crate::store::StoreData;

/// Counts reported by one collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionOutcome {
    /// Employee snapshots written.
    pub employees: usize,
    /// Input snapshots written.
    pub inputs: usize,
    /// Of those, inputs flagged retro.
    pub retro_inputs: usize,
    /// Result rows written.
    pub results: usize,
}

/// Collects snapshots for one payroll.
///
/// The caller is responsible for the lifecycle guard (the payroll must be
/// open) and for flipping the payroll's state afterwards; this function
/// only rebuilds the snapshot data inside the caller's transaction.
pub fn run_collection(
    data: &mut StoreData,
    payroll_id: Uuid,
    now: DateTime<Utc>,
) -> EngineResult<CollectionOutcome> {
    let payroll = data.payroll(payroll_id)?.clone();

    // Re-collection starts clean: prior snapshots go, still-consumable
    // actions are released back to the pool.
    data.wipe_payroll_data(payroll_id);

    // Freeze the roster: every employee of the company whose employment
    // overlaps the worked period, terminations mid-period included.
    let mut roster: Vec<Uuid> = data
        .employees
        .values()
        .filter(|e| e.company_id == payroll.company_id)
        .filter(|e| e.overlaps_period(payroll.period_start, payroll.period_end))
        .map(|e| e.id)
        .collect();
    roster.sort();

    for employee_id in &roster {
        let employee = data.employee(*employee_id)?;
        data.employee_snapshots.push(EmployeeSnapshot {
            payroll_id,
            employee_id: employee.id,
            salary: employee.salary,
            currency: employee.currency.clone(),
            pay_period_type: employee.pay_period_type,
            schedule: employee.schedule.clone(),
            bank_account: employee.bank_account.clone(),
            captured_at: now,
        });
    }

    // Select the actions eligible for this payroll: consumable, unbound,
    // effective range overlapping the worked period, approved by the
    // cutoff, and belonging to a snapshotted employee.
    let mut eligible: Vec<Uuid> = data
        .actions
        .values()
        .filter(|a| a.is_bindable())
        .filter(|a| a.company_id == payroll.company_id)
        .filter(|a| roster.binary_search(&a.employee_id).is_ok())
        .filter(|a| {
            a.effective_start <= payroll.period_end && a.effective_end >= payroll.period_start
        })
        .filter(|a| {
            a.approved_at
                .is_none_or(|t| t.date_naive() <= payroll.cutoff_date)
        })
        .map(|a| a.id)
        .collect();
    eligible.sort();

    let mut inputs = 0usize;
    let mut retro_inputs = 0usize;
    for action_id in eligible {
        let action = data.action(action_id)?.clone();
        if data.input_exists(payroll_id, InputSourceType::PersonalAction, action_id) {
            continue;
        }

        let proration = prorate(
            action.amount,
            action.effective_start,
            action.effective_end,
            payroll.period_start,
            payroll.period_end,
        );
        if proration.retro {
            retro_inputs += 1;
        }

        data.input_snapshots.push(InputSnapshot {
            payroll_id,
            source_type: InputSourceType::PersonalAction,
            source_id: action.id,
            employee_id: action.employee_id,
            action_type: action.action_type,
            units: Decimal::from(proration.overlap_days),
            base_amount: action.amount,
            final_amount: proration.final_amount,
            retro: proration.retro,
            original_period: proration.original_period,
        });
        inputs += 1;

        // Bind the action so no other payroll can collect it.
        let action = data.action_mut(action_id)?;
        action.payroll_id = Some(payroll_id);
        action.version += 1;
    }

    // Aggregate per-employee results: deduction-type inputs accumulate
    // into deductions, everything else into gross.
    for employee_id in &roster {
        let mut gross = Decimal::ZERO;
        let mut deductions = Decimal::ZERO;
        for input in data
            .input_snapshots
            .iter()
            .filter(|i| i.payroll_id == payroll_id && i.employee_id == *employee_id)
        {
            if input.action_type.is_deduction() {
                deductions += input.final_amount;
            } else {
                gross += input.final_amount;
            }
        }
        data.results.push(PayrollResultRow {
            payroll_id,
            employee_id: *employee_id,
            gross,
            deductions,
            net: gross - deductions,
        });
    }

    let outcome = CollectionOutcome {
        employees: roster.len(),
        inputs,
        retro_inputs,
        results: roster.len(),
    };
    info!(
        payroll_id = %payroll_id,
        employees = outcome.employees,
        inputs = outcome.inputs,
        retro_inputs = outcome.retro_inputs,
        "snapshot collection completed"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActionState, ActionType, Employee, PayPeriodType, PayrollPeriod, PayrollState,
        PersonalAction,
    };
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_payroll(data: &mut StoreData, company_id: Uuid) -> Uuid {
        let payroll = PayrollPeriod {
            id: Uuid::new_v4(),
            company_id,
            period_type: PayPeriodType::SemiMonthly,
            currency: "USD".to_string(),
            period_start: date(2026, 1, 1),
            period_end: date(2026, 1, 15),
            cutoff_date: date(2026, 1, 13),
            payment_window_start: date(2026, 1, 14),
            payment_window_end: date(2026, 1, 20),
            pay_date: date(2026, 1, 16),
            state: PayrollState::Open,
            inactive: false,
            version: 1,
            requires_recalculation: false,
            last_snapshot_at: None,
        };
        let id = payroll.id;
        data.payrolls.insert(id, payroll);
        id
    }

    fn seed_employee(data: &mut StoreData, company_id: Uuid) -> Uuid {
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id,
            full_name: "Dana Reyes".to_string(),
            hire_date: date(2024, 3, 10),
            termination_date: None,
            salary: Decimal::from(3000),
            currency: "USD".to_string(),
            pay_period_type: PayPeriodType::SemiMonthly,
            schedule: "mon-fri-8h".to_string(),
            bank_account: Some("ACC-001".to_string()),
        };
        let id = employee.id;
        data.employees.insert(id, employee);
        id
    }

    fn seed_action(
        data: &mut StoreData,
        company_id: Uuid,
        employee_id: Uuid,
        action_type: ActionType,
        amount: Decimal,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Uuid {
        let action = PersonalAction {
            id: Uuid::new_v4(),
            company_id,
            employee_id,
            action_type,
            state: ActionState::Approved,
            effective_start: start,
            effective_end: end,
            amount,
            currency: "USD".to_string(),
            approved_at: Some(
                date(2026, 1, 5).and_hms_opt(10, 0, 0).unwrap().and_utc(),
            ),
            payroll_id: None,
            version: 1,
            invalidation: None,
        };
        let id = action.id;
        data.actions.insert(id, action);
        id
    }

    #[test]
    fn test_collection_freezes_roster_and_prorates_actions() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        let employee_id = seed_employee(&mut data, company);
        let action_id = seed_action(
            &mut data,
            company,
            employee_id,
            ActionType::Raise,
            dec("3000"),
            date(2026, 1, 10),
            date(2026, 2, 10),
        );

        let outcome = run_collection(&mut data, payroll_id, Utc::now()).unwrap();

        assert_eq!(outcome.employees, 1);
        assert_eq!(outcome.inputs, 1);
        assert_eq!(outcome.results, 1);

        let inputs = data.input_snapshots_for(payroll_id);
        assert_eq!(inputs[0].units, dec("6"));
        assert_eq!(inputs[0].final_amount, dec("562.50"));
        assert!(!inputs[0].retro);

        // Action is now bound and versioned up.
        let action = &data.actions[&action_id];
        assert_eq!(action.payroll_id, Some(payroll_id));
        assert_eq!(action.version, 2);
    }

    #[test]
    fn test_recollection_is_idempotent() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        let employee_id = seed_employee(&mut data, company);
        seed_action(
            &mut data,
            company,
            employee_id,
            ActionType::Bonus,
            dec("500"),
            date(2026, 1, 2),
            date(2026, 1, 6),
        );

        let first = run_collection(&mut data, payroll_id, Utc::now()).unwrap();
        let second = run_collection(&mut data, payroll_id, Utc::now()).unwrap();
        let third = run_collection(&mut data, payroll_id, Utc::now()).unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(data.input_snapshots_for(payroll_id).len(), 1);
        assert_eq!(data.employee_snapshots_for(payroll_id).len(), 1);
        assert_eq!(data.results_for(payroll_id).len(), 1);
    }

    #[test]
    fn test_action_approved_after_cutoff_excluded() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        let employee_id = seed_employee(&mut data, company);
        let action_id = seed_action(
            &mut data,
            company,
            employee_id,
            ActionType::Bonus,
            dec("500"),
            date(2026, 1, 2),
            date(2026, 1, 6),
        );
        data.actions.get_mut(&action_id).unwrap().approved_at =
            Some(date(2026, 1, 14).and_hms_opt(9, 0, 0).unwrap().and_utc());

        let outcome = run_collection(&mut data, payroll_id, Utc::now()).unwrap();

        assert_eq!(outcome.inputs, 0);
        assert_eq!(data.actions[&action_id].payroll_id, None);
    }

    #[test]
    fn test_action_outside_period_excluded() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        let employee_id = seed_employee(&mut data, company);
        seed_action(
            &mut data,
            company,
            employee_id,
            ActionType::Bonus,
            dec("500"),
            date(2026, 2, 1),
            date(2026, 2, 28),
        );

        let outcome = run_collection(&mut data, payroll_id, Utc::now()).unwrap();
        assert_eq!(outcome.inputs, 0);
    }

    #[test]
    fn test_action_bound_elsewhere_excluded() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        let employee_id = seed_employee(&mut data, company);
        let action_id = seed_action(
            &mut data,
            company,
            employee_id,
            ActionType::Bonus,
            dec("500"),
            date(2026, 1, 2),
            date(2026, 1, 6),
        );
        let other_payroll = Uuid::new_v4();
        data.actions.get_mut(&action_id).unwrap().payroll_id = Some(other_payroll);

        let outcome = run_collection(&mut data, payroll_id, Utc::now()).unwrap();

        assert_eq!(outcome.inputs, 0);
        assert_eq!(data.actions[&action_id].payroll_id, Some(other_payroll));
    }

    #[test]
    fn test_retro_action_recorded_with_original_period() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        let employee_id = seed_employee(&mut data, company);
        seed_action(
            &mut data,
            company,
            employee_id,
            ActionType::Bonus,
            dec("800"),
            date(2025, 12, 20),
            date(2026, 1, 5),
        );

        let outcome = run_collection(&mut data, payroll_id, Utc::now()).unwrap();

        assert_eq!(outcome.retro_inputs, 1);
        let inputs = data.input_snapshots_for(payroll_id);
        assert!(inputs[0].retro);
        assert_eq!(inputs[0].original_period, Some("2025-12".to_string()));
    }

    #[test]
    fn test_results_split_gross_and_deductions() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        let employee_id = seed_employee(&mut data, company);
        seed_action(
            &mut data,
            company,
            employee_id,
            ActionType::Bonus,
            dec("500"),
            date(2026, 1, 1),
            date(2026, 1, 15),
        );
        seed_action(
            &mut data,
            company,
            employee_id,
            ActionType::Deduction,
            dec("120"),
            date(2026, 1, 1),
            date(2026, 1, 15),
        );

        run_collection(&mut data, payroll_id, Utc::now()).unwrap();

        let results = data.results_for(payroll_id);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].gross, dec("500.00"));
        assert_eq!(results[0].deductions, dec("120.00"));
        assert_eq!(results[0].net, dec("380.00"));
    }

    #[test]
    fn test_terminated_mid_period_employee_snapshotted() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        let employee_id = seed_employee(&mut data, company);
        data.employees.get_mut(&employee_id).unwrap().termination_date =
            Some(date(2026, 1, 10));

        let outcome = run_collection(&mut data, payroll_id, Utc::now()).unwrap();
        assert_eq!(outcome.employees, 1);
    }

    #[test]
    fn test_employee_of_other_company_excluded() {
        let mut data = StoreData::default();
        let company = Uuid::new_v4();
        let payroll_id = seed_payroll(&mut data, company);
        seed_employee(&mut data, Uuid::new_v4());

        let outcome = run_collection(&mut data, payroll_id, Utc::now()).unwrap();
        assert_eq!(outcome.employees, 0);
        assert_eq!(outcome.results, 0);
    }
}

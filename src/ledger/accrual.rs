//! The monthly accrual provision run.
//!
//! For every active account the run walks forward one month-with-anchor
//! at a time from the last recorded accrual (or the hire date), appending
//! one +1-day entry per due month together with the monetary provision
//! from the employee's pay-period-type formula. The (employee, period
//! label) uniqueness guard makes the run safe to re-enter at any point.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::LedgerEntryKind;
use crate::store::StoreData;

use super::account::append_entry;

/// Counts reported by one provision run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccrualOutcome {
    /// Accounts visited.
    pub processed: usize,
    /// Accrual entries appended.
    pub created: usize,
    /// Due months skipped because an entry already existed.
    pub skipped: usize,
    /// Accounts that could not be processed (missing employee).
    pub errors: usize,
}

/// The next accrual due date after `from`: one month forward, on the
/// account's anchor day.
///
/// The anchor is in [1, 28], so the result is a valid date in any month.
///
/// # Example
///
/// ```
/// use payroll_engine::ledger::next_anchor_date;
/// use chrono::NaiveDate;
///
/// let from = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
/// assert_eq!(
///     next_anchor_date(from, 10),
///     NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
/// );
/// ```
pub fn next_anchor_date(from: NaiveDate, anchor_day: u32) -> NaiveDate {
    let (mut year, mut month) = (from.year(), from.month());
    if month == 12 {
        year += 1;
        month = 1;
    } else {
        month += 1;
    }
    NaiveDate::from_ymd_opt(year, month, anchor_day)
        .expect("anchor day in [1, 28] is valid in every month")
}

/// Runs the monthly accrual provision for every active account, up to
/// `as_of`.
///
/// Accrual stops at the employee's termination date or `as_of`, whichever
/// is earlier. The run never errors for "nothing to do"; accounts whose
/// employee is missing are counted and logged.
pub fn run_daily_provision(
    data: &mut StoreData,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> EngineResult<AccrualOutcome> {
    let mut outcome = AccrualOutcome::default();

    let mut account_ids: Vec<Uuid> = data
        .accounts
        .values()
        .filter(|a| a.active)
        .map(|a| a.employee_id)
        .collect();
    account_ids.sort();

    for employee_id in account_ids {
        outcome.processed += 1;

        let Some(employee) = data.employees.get(&employee_id).cloned() else {
            warn!(%employee_id, "accrual skipped: employee missing for account");
            outcome.errors += 1;
            continue;
        };

        let account = data.accounts[&employee_id].clone();
        let bound = match employee.termination_date {
            Some(t) => t.min(as_of),
            None => as_of,
        };

        let divisor = config.accrual.divisor_for(employee.pay_period_type);
        let provision = (employee.salary / divisor)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        let mut cursor = account.last_accrual_date.unwrap_or(employee.hire_date);
        loop {
            let due = next_anchor_date(cursor, account.anchor_day);
            if due > bound {
                break;
            }

            let label = format!("{:04}-{:02}", due.year(), due.month());
            if data.accrual_recorded(employee_id, &label) {
                outcome.skipped += 1;
            } else {
                append_entry(
                    data,
                    employee_id,
                    LedgerEntryKind::MonthlyAccrual,
                    Decimal::ONE,
                    provision,
                    Some(label),
                    None,
                    chrono::Utc::now(),
                );
                outcome.created += 1;
            }

            data.account_mut(employee_id)?.last_accrual_date = Some(due);
            cursor = due;
        }
    }

    warn!(
        processed = outcome.processed,
        created = outcome.created,
        skipped = outcome.skipped,
        errors = outcome.errors,
        "accrual provision run finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::create_initial_account;
    use crate::models::{Employee, PayPeriodType};
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_employee_with_account(
        data: &mut StoreData,
        hire_date: NaiveDate,
        pay_period_type: PayPeriodType,
    ) -> Uuid {
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            full_name: "Dana Reyes".to_string(),
            hire_date,
            termination_date: None,
            salary: Decimal::from(3000),
            currency: "USD".to_string(),
            pay_period_type,
            schedule: "mon-fri-8h".to_string(),
            bank_account: None,
        };
        let id = employee.id;
        data.employees.insert(id, employee);
        create_initial_account(data, id, Decimal::ZERO, Utc::now()).unwrap();
        id
    }

    #[test]
    fn test_next_anchor_date_rolls_over_year() {
        assert_eq!(
            next_anchor_date(date(2025, 12, 15), 15),
            date(2026, 1, 15)
        );
    }

    #[test]
    fn test_next_anchor_date_into_february() {
        // Anchor 28 is valid even in February.
        assert_eq!(next_anchor_date(date(2026, 1, 28), 28), date(2026, 2, 28));
    }

    #[test]
    fn test_accrues_one_day_per_elapsed_month() {
        let mut data = StoreData::default();
        let employee_id =
            seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Monthly);

        let outcome =
            run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 4, 20)).unwrap();

        // Due: 02-10, 03-10, 04-10.
        assert_eq!(outcome.created, 3);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.errors, 0);

        let entries = data.ledger_for(employee_id);
        // Initial + 3 accruals, running balance 0 -> 3.
        assert_eq!(entries.len(), 4);
        assert_eq!(entries.last().unwrap().balance_days, dec("3"));
        assert_eq!(
            data.accounts[&employee_id].last_accrual_date,
            Some(date(2026, 4, 10))
        );
    }

    #[test]
    fn test_monthly_provision_amount_is_salary_over_30() {
        let mut data = StoreData::default();
        let employee_id =
            seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Monthly);

        run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 2, 15)).unwrap();

        let entries = data.ledger_for(employee_id);
        let accrual = entries
            .iter()
            .find(|e| e.kind == LedgerEntryKind::MonthlyAccrual)
            .unwrap();
        // 3000 / 30 = 100.00
        assert_eq!(accrual.amount, dec("100.00"));
        assert_eq!(accrual.period_label, Some("2026-02".to_string()));
    }

    #[test]
    fn test_weekly_provision_uses_weekly_divisor() {
        let mut data = StoreData::default();
        let employee_id =
            seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Weekly);

        run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 2, 15)).unwrap();

        let entries = data.ledger_for(employee_id);
        let accrual = entries
            .iter()
            .find(|e| e.kind == LedgerEntryKind::MonthlyAccrual)
            .unwrap();
        // 3000 / 7 = 428.571... -> 428.57
        assert_eq!(accrual.amount, dec("428.57"));
    }

    #[test]
    fn test_rerun_skips_recorded_months() {
        let mut data = StoreData::default();
        seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Monthly);

        let first =
            run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 3, 15)).unwrap();
        assert_eq!(first.created, 2);

        let second =
            run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 3, 15)).unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 0);
    }

    #[test]
    fn test_interrupted_run_resumes_where_it_left_off() {
        let mut data = StoreData::default();
        let employee_id =
            seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Monthly);

        // Simulate an interrupted run: the February entry exists but
        // last_accrual_date was never advanced.
        run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 2, 15)).unwrap();
        data.account_mut(employee_id).unwrap().last_accrual_date = None;

        let outcome =
            run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 3, 15)).unwrap();

        // February is skipped by the uniqueness guard, March is created.
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.created, 1);
    }

    #[test]
    fn test_accrual_stops_at_termination() {
        let mut data = StoreData::default();
        let employee_id =
            seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Monthly);
        data.employees.get_mut(&employee_id).unwrap().termination_date =
            Some(date(2026, 3, 1));

        let outcome =
            run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 6, 30)).unwrap();

        // Only 02-10 falls before the termination date.
        assert_eq!(outcome.created, 1);
    }

    #[test]
    fn test_missing_employee_counted_as_error() {
        let mut data = StoreData::default();
        let employee_id =
            seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Monthly);
        data.employees.remove(&employee_id);

        let outcome =
            run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 3, 15)).unwrap();

        assert_eq!(outcome.errors, 1);
        assert_eq!(outcome.created, 0);
    }

    #[test]
    fn test_inactive_account_not_processed() {
        let mut data = StoreData::default();
        let employee_id =
            seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Monthly);
        data.accounts.get_mut(&employee_id).unwrap().active = false;

        let outcome =
            run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 6, 30)).unwrap();

        assert_eq!(outcome.processed, 0);
    }

    #[test]
    fn test_nothing_due_is_not_an_error() {
        let mut data = StoreData::default();
        seed_employee_with_account(&mut data, date(2026, 1, 10), PayPeriodType::Monthly);

        let outcome =
            run_daily_provision(&mut data, &EngineConfig::default(), date(2026, 1, 20)).unwrap();

        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.errors, 0);
    }
}

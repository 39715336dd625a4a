//! The pure eligibility predicates.
//!
//! Each business rule is a standalone function over the employee/action
//! pair so it can be tested independently of any data access.

use crate::models::{Employee, PersonalAction};

/// Rule 1: the employee was terminated before the action's effective
/// start date, so the action can never apply.
pub fn terminated_before_effective(employee: &Employee, action: &PersonalAction) -> bool {
    employee.is_terminated_before(action.effective_start)
}

/// Rule 2: the employee's current company differs from the company the
/// action was recorded under.
pub fn company_mismatch(employee: &Employee, action: &PersonalAction) -> bool {
    employee.company_id != action.company_id
}

/// Rule 3: the employee's currency differs from the action's currency,
/// optionally cross-checked against a target payroll's currency.
pub fn currency_mismatch(
    employee: &Employee,
    action: &PersonalAction,
    target_currency: Option<&str>,
) -> bool {
    if employee.currency != action.currency {
        return true;
    }
    target_currency.is_some_and(|c| c != action.currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionState, ActionType, PayPeriodType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_pair() -> (Employee, PersonalAction) {
        let company_id = Uuid::new_v4();
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id,
            full_name: "Dana Reyes".to_string(),
            hire_date: date(2024, 3, 10),
            termination_date: None,
            salary: Decimal::from(3000),
            currency: "USD".to_string(),
            pay_period_type: PayPeriodType::Monthly,
            schedule: "mon-fri-8h".to_string(),
            bank_account: None,
        };
        let action = PersonalAction {
            id: Uuid::new_v4(),
            company_id,
            employee_id: employee.id,
            action_type: ActionType::Bonus,
            state: ActionState::Approved,
            effective_start: date(2026, 3, 1),
            effective_end: date(2026, 3, 31),
            amount: Decimal::from(500),
            currency: "USD".to_string(),
            approved_at: None,
            payroll_id: None,
            version: 1,
            invalidation: None,
        };
        (employee, action)
    }

    /// Worked example: terminated 2026-02-01, action effective 2026-03-01.
    #[test]
    fn test_termination_before_effective_matches() {
        let (mut employee, action) = create_pair();
        employee.termination_date = Some(date(2026, 2, 1));
        assert!(terminated_before_effective(&employee, &action));
    }

    #[test]
    fn test_termination_on_effective_date_does_not_match() {
        let (mut employee, action) = create_pair();
        employee.termination_date = Some(date(2026, 3, 1));
        assert!(!terminated_before_effective(&employee, &action));
    }

    #[test]
    fn test_active_employee_does_not_match_termination_rule() {
        let (employee, action) = create_pair();
        assert!(!terminated_before_effective(&employee, &action));
    }

    #[test]
    fn test_company_mismatch() {
        let (mut employee, action) = create_pair();
        assert!(!company_mismatch(&employee, &action));

        employee.company_id = Uuid::new_v4();
        assert!(company_mismatch(&employee, &action));
    }

    #[test]
    fn test_currency_mismatch_against_employee() {
        let (mut employee, action) = create_pair();
        assert!(!currency_mismatch(&employee, &action, None));

        employee.currency = "EUR".to_string();
        assert!(currency_mismatch(&employee, &action, None));
    }

    #[test]
    fn test_currency_mismatch_against_target_payroll() {
        let (employee, action) = create_pair();
        assert!(!currency_mismatch(&employee, &action, Some("USD")));
        assert!(currency_mismatch(&employee, &action, Some("EUR")));
    }
}

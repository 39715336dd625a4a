//! Employee model and pay-period type.
//!
//! The employee roster is maintained by an external CRUD surface; the
//! engine only reads it when collecting snapshots, checking action
//! eligibility and computing vacation provisions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The cadence on which a company pays its employees.
///
/// Also drives the monetary provision recorded with each monthly vacation
/// accrual: the provision is the salary divided by the type's divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayPeriodType {
    /// Paid every day.
    Daily,
    /// Paid every week.
    Weekly,
    /// Paid every two weeks.
    BiWeekly,
    /// Paid twice a month.
    SemiMonthly,
    /// Paid once a month.
    Monthly,
    /// Paid once a quarter.
    Quarterly,
    /// Paid twice a year.
    SemiAnnual,
    /// Paid once a year.
    Annual,
}

impl PayPeriodType {
    /// The built-in divisor used to turn a salary into a one-day vacation
    /// provision. Semi-monthly is (salary / 2) / 15, which reduces to
    /// salary / 30.
    pub fn default_provision_divisor(self) -> Decimal {
        match self {
            PayPeriodType::Daily => Decimal::ONE,
            PayPeriodType::Weekly => Decimal::from(7),
            PayPeriodType::BiWeekly => Decimal::from(14),
            PayPeriodType::SemiMonthly => Decimal::from(30),
            PayPeriodType::Monthly => Decimal::from(30),
            PayPeriodType::Quarterly => Decimal::from(90),
            PayPeriodType::SemiAnnual => Decimal::from(180),
            PayPeriodType::Annual => Decimal::from(365),
        }
    }
}

/// Represents an employee on a company's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// The company the employee currently belongs to.
    pub company_id: Uuid,
    /// The employee's full name.
    pub full_name: String,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
    /// The date the employee's employment ended, if terminated.
    pub termination_date: Option<NaiveDate>,
    /// The employee's salary per month.
    pub salary: Decimal,
    /// ISO currency code the employee is paid in.
    pub currency: String,
    /// The cadence on which the employee is paid.
    pub pay_period_type: PayPeriodType,
    /// The employee's work schedule label (e.g. "mon-fri-8h").
    pub schedule: String,
    /// The employee's bank account, if on file.
    pub bank_account: Option<String>,
}

impl Employee {
    /// Returns true if the employee was terminated strictly before the
    /// given date.
    pub fn is_terminated_before(&self, date: NaiveDate) -> bool {
        self.termination_date.is_some_and(|t| t < date)
    }

    /// Returns true if the employee's employment overlaps the given period.
    ///
    /// An employee overlaps when hired on or before the period end and not
    /// terminated before the period start. This keeps employees terminated
    /// mid-period in scope for their final payroll.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{Employee, PayPeriodType};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let employee = Employee {
    ///     id: Uuid::new_v4(),
    ///     company_id: Uuid::new_v4(),
    ///     full_name: "Dana Reyes".to_string(),
    ///     hire_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
    ///     termination_date: None,
    ///     salary: Decimal::from(3000),
    ///     currency: "USD".to_string(),
    ///     pay_period_type: PayPeriodType::Monthly,
    ///     schedule: "mon-fri-8h".to_string(),
    ///     bank_account: None,
    /// };
    /// assert!(employee.overlaps_period(
    ///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
    /// ));
    /// ```
    pub fn overlaps_period(&self, period_start: NaiveDate, period_end: NaiveDate) -> bool {
        self.hire_date <= period_end && !self.is_terminated_before(period_start)
    }

    /// The anchor day-of-month used for vacation accrual scheduling,
    /// derived from the hire date and clamped into [1, 28] so every month
    /// has a valid due date.
    pub fn accrual_anchor_day(&self) -> u32 {
        use chrono::Datelike;
        self.hire_date.day().min(28)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_employee() -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            full_name: "Dana Reyes".to_string(),
            hire_date: date(2024, 3, 10),
            termination_date: None,
            salary: Decimal::from(3000),
            currency: "USD".to_string(),
            pay_period_type: PayPeriodType::Monthly,
            schedule: "mon-fri-8h".to_string(),
            bank_account: Some("ACC-001".to_string()),
        }
    }

    #[test]
    fn test_active_employee_overlaps_period() {
        let employee = create_test_employee();
        assert!(employee.overlaps_period(date(2026, 1, 1), date(2026, 1, 31)));
    }

    #[test]
    fn test_employee_hired_after_period_does_not_overlap() {
        let mut employee = create_test_employee();
        employee.hire_date = date(2026, 2, 1);
        assert!(!employee.overlaps_period(date(2026, 1, 1), date(2026, 1, 31)));
    }

    #[test]
    fn test_employee_terminated_before_period_does_not_overlap() {
        let mut employee = create_test_employee();
        employee.termination_date = Some(date(2025, 12, 31));
        assert!(!employee.overlaps_period(date(2026, 1, 1), date(2026, 1, 31)));
    }

    #[test]
    fn test_employee_terminated_mid_period_still_overlaps() {
        let mut employee = create_test_employee();
        employee.termination_date = Some(date(2026, 1, 15));
        assert!(employee.overlaps_period(date(2026, 1, 1), date(2026, 1, 31)));
    }

    #[test]
    fn test_is_terminated_before() {
        let mut employee = create_test_employee();
        employee.termination_date = Some(date(2026, 2, 1));
        assert!(employee.is_terminated_before(date(2026, 3, 1)));
        assert!(!employee.is_terminated_before(date(2026, 2, 1)));
        assert!(!employee.is_terminated_before(date(2026, 1, 1)));
    }

    #[test]
    fn test_accrual_anchor_day_from_hire_date() {
        let employee = create_test_employee();
        assert_eq!(employee.accrual_anchor_day(), 10);
    }

    #[test]
    fn test_accrual_anchor_day_clamped_to_28() {
        let mut employee = create_test_employee();
        employee.hire_date = date(2024, 1, 31);
        assert_eq!(employee.accrual_anchor_day(), 28);
    }

    #[test]
    fn test_default_provision_divisors() {
        assert_eq!(
            PayPeriodType::Daily.default_provision_divisor(),
            Decimal::ONE
        );
        assert_eq!(
            PayPeriodType::Weekly.default_provision_divisor(),
            Decimal::from(7)
        );
        assert_eq!(
            PayPeriodType::BiWeekly.default_provision_divisor(),
            Decimal::from(14)
        );
        assert_eq!(
            PayPeriodType::SemiMonthly.default_provision_divisor(),
            Decimal::from(30)
        );
        assert_eq!(
            PayPeriodType::Monthly.default_provision_divisor(),
            Decimal::from(30)
        );
        assert_eq!(
            PayPeriodType::Quarterly.default_provision_divisor(),
            Decimal::from(90)
        );
        assert_eq!(
            PayPeriodType::SemiAnnual.default_provision_divisor(),
            Decimal::from(180)
        );
        assert_eq!(
            PayPeriodType::Annual.default_provision_divisor(),
            Decimal::from(365)
        );
    }

    #[test]
    fn test_pay_period_type_serialization() {
        assert_eq!(
            serde_json::to_string(&PayPeriodType::BiWeekly).unwrap(),
            "\"bi_weekly\""
        );
        assert_eq!(
            serde_json::to_string(&PayPeriodType::SemiMonthly).unwrap(),
            "\"semi_monthly\""
        );
    }

    #[test]
    fn test_employee_serde_round_trip() {
        let employee = create_test_employee();
        let json = serde_json::to_string(&employee).unwrap();
        let deserialized: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(employee, deserialized);
    }
}

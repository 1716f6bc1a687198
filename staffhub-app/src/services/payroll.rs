//! Payroll calculation and persistence

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;
use rust_decimal::Decimal;

use shared::error::{AppError, AppResult};
use shared::models::{AttendanceRecord, AttendanceStatus, PayrollRecord};
use shared::types::Month;
use staffhub_client::query::rows_to;
use staffhub_client::{SelectRequest, TableBackend};

use super::{AttendanceService, EmployeeService};

const TABLE: &str = "payroll";

/// Deduction names under the default policy
pub const DEDUCTION_TAX: &str = "tax";
pub const DEDUCTION_INSURANCE: &str = "insurance";

/// Salary deduction policy applied to every employee
///
/// Flat rates; per-employee configuration is out of scope.
#[derive(Debug, Clone)]
pub struct DeductionPolicy {
    /// Fraction of gross withheld as tax
    pub tax_rate: Decimal,
    /// Fixed insurance amount, in the same currency unit as salary
    pub insurance: Decimal,
}

impl Default for DeductionPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(20, 2),  // 0.20
            insurance: Decimal::new(500, 0),
        }
    }
}

impl DeductionPolicy {
    /// Compose a payroll record from a salary snapshot and one month of
    /// attendance
    ///
    /// working_days counts "present" records only. total_hours sums
    /// recorded hours across ALL records regardless of status (the
    /// product currently defines it that way; see DESIGN.md). Net salary
    /// is not floored: it goes negative when deductions exceed gross.
    pub fn compose(
        &self,
        employee_id: &str,
        month: Month,
        gross_salary: Decimal,
        records: &[AttendanceRecord],
    ) -> PayrollRecord {
        let working_days = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count() as u32;
        let total_hours: f64 = records.iter().filter_map(|r| r.hours_worked).sum();

        let tax = gross_salary * self.tax_rate;
        let insurance = self.insurance;

        let mut deductions = BTreeMap::new();
        deductions.insert(DEDUCTION_TAX.to_string(), tax);
        deductions.insert(DEDUCTION_INSURANCE.to_string(), insurance);

        PayrollRecord {
            employee_id: employee_id.to_string(),
            month_year: month.first_day(),
            gross_salary,
            net_salary: gross_salary - tax - insurance,
            deductions,
            working_days,
            total_hours,
        }
    }
}

/// Payroll calculation and access to the `payroll` relation
#[derive(Clone)]
pub struct PayrollService {
    backend: Arc<dyn TableBackend>,
    employees: EmployeeService,
    attendance: AttendanceService,
    policy: DeductionPolicy,
}

impl PayrollService {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self::with_policy(backend, DeductionPolicy::default())
    }

    pub fn with_policy(backend: Arc<dyn TableBackend>, policy: DeductionPolicy) -> Self {
        Self {
            employees: EmployeeService::new(backend.clone()),
            attendance: AttendanceService::new(backend.clone()),
            backend,
            policy,
        }
    }

    /// Calculate one employee's payroll for one month
    ///
    /// Read-only: two queries (salary snapshot, attendance in the month's
    /// inclusive date range), then pure arithmetic. The result is NOT
    /// persisted; pass it to [`save`](Self::save) explicitly. It also goes
    /// stale by design: recalculate after salary or attendance changes.
    pub async fn calculate_monthly(
        &self,
        employee_id: &str,
        month: Month,
    ) -> AppResult<PayrollRecord> {
        if employee_id.is_empty() {
            return Err(AppError::required_field("employee id"));
        }

        let employee = self.employees.get(employee_id).await?;
        let records = self.attendance.month_records(employee_id, month).await?;

        Ok(self
            .policy
            .compose(employee_id, month, employee.salary, &records))
    }

    /// Persist a payroll record, upserting by (employee, month)
    ///
    /// Saving the same key twice replaces the previous record.
    pub async fn save(&self, record: &PayrollRecord) -> AppResult<PayrollRecord> {
        if record.employee_id.is_empty() {
            return Err(AppError::required_field("employee_id"));
        }
        if record.month_year.day() != 1 {
            return Err(AppError::validation(format!(
                "month_year must be a first-of-month date, got {}",
                record.month_year
            )));
        }
        if record.gross_salary - record.total_deductions() != record.net_salary {
            return Err(AppError::invalid_format(
                "net salary does not equal gross minus deductions",
            ));
        }

        let row = serde_json::to_value(record)
            .map_err(|e| AppError::internal(format!("encode payroll: {}", e)))?;
        let stored = self
            .backend
            .upsert(TABLE, &["employee_id", "month_year"], row)
            .await?;

        tracing::debug!(
            employee_id = %record.employee_id,
            month = %record.month_year,
            "Payroll record saved"
        );
        serde_json::from_value(stored)
            .map_err(|e| AppError::invalid_format(format!("stored payroll: {}", e)))
    }

    /// All saved records for one employee, newest month first
    pub async fn history(&self, employee_id: &str) -> AppResult<Vec<PayrollRecord>> {
        if employee_id.is_empty() {
            return Err(AppError::required_field("employee id"));
        }

        let request = SelectRequest::table(TABLE)
            .eq("employee_id", employee_id)
            .order("month_year", false);
        let rows = self.backend.select(&request).await?;
        Ok(rows_to(rows)?)
    }

    /// All saved records across employees for one month
    ///
    /// Errors propagate like every other repository call; no
    /// swallow-to-empty special case.
    pub async fn for_month(&self, month: Month) -> AppResult<Vec<PayrollRecord>> {
        let request = SelectRequest::table(TABLE)
            .gte("month_year", month.first_day().to_string())
            .lte("month_year", month.last_day().to_string());
        let rows = self.backend.select(&request).await?;
        Ok(rows_to(rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::prelude::FromPrimitive;
    use shared::error::ErrorCode;
    use shared::models::EmployeeCreate;
    use staffhub_client::MemoryBackend;

    fn dec(v: f64) -> Decimal {
        Decimal::from_f64(v).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        backend: Arc<MemoryBackend>,
        employees: EmployeeService,
        attendance: AttendanceService,
        payroll: PayrollService,
    }

    fn fixture() -> Fixture {
        let backend = Arc::new(MemoryBackend::new());
        Fixture {
            employees: EmployeeService::new(backend.clone()),
            attendance: AttendanceService::new(backend.clone()),
            payroll: PayrollService::new(backend.clone()),
            backend,
        }
    }

    async fn seed_employee(fixture: &Fixture, salary: f64) -> String {
        fixture
            .employees
            .create(EmployeeCreate {
                full_name: "Ada Lovelace".to_string(),
                role: "Engineer".to_string(),
                department: "R&D".to_string(),
                salary: dec(salary),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_default_policy_formula() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 3000.0).await;
        let march = Month::new(2025, 3).unwrap();

        let record = fixture.payroll.calculate_monthly(&id, march).await.unwrap();

        assert_eq!(record.gross_salary, dec(3000.0));
        assert_eq!(record.deductions[DEDUCTION_TAX], dec(600.0));
        assert_eq!(record.deductions[DEDUCTION_INSURANCE], dec(500.0));
        assert_eq!(record.net_salary, dec(1900.0));
        assert_eq!(record.month_year, date(2025, 3, 1));
        assert_eq!(record.working_days, 0);
        assert_eq!(record.total_hours, 0.0);
    }

    #[tokio::test]
    async fn test_net_salary_may_go_negative() {
        // Gross below the fixed insurance amount: 0.8 * 400 - 500 = -180
        let fixture = fixture();
        let id = seed_employee(&fixture, 400.0).await;

        let record = fixture
            .payroll
            .calculate_monthly(&id, Month::new(2025, 3).unwrap())
            .await
            .unwrap();

        assert_eq!(record.net_salary, dec(-180.0));
    }

    #[tokio::test]
    async fn test_zero_salary() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 0.0).await;

        let record = fixture
            .payroll
            .calculate_monthly(&id, Month::new(2025, 3).unwrap())
            .await
            .unwrap();

        assert_eq!(record.gross_salary, Decimal::ZERO);
        assert_eq!(record.deductions[DEDUCTION_TAX], Decimal::ZERO);
        assert_eq!(record.net_salary, dec(-500.0));
    }

    #[tokio::test]
    async fn test_working_days_counts_present_inside_range_only() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 3000.0).await;
        let march = Month::new(2025, 3).unwrap();

        // Inside the month: two present, one absent, one leave
        for (day, status) in [
            (3, AttendanceStatus::Present),
            (4, AttendanceStatus::Present),
            (5, AttendanceStatus::Absent),
            (6, AttendanceStatus::Leave),
        ] {
            fixture
                .attendance
                .mark(&id, date(2025, 3, day), Some(status), None)
                .await
                .unwrap();
        }
        // Boundary neighbors, both present, must not count
        fixture
            .attendance
            .mark(&id, date(2025, 2, 28), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();
        fixture
            .attendance
            .mark(&id, date(2025, 4, 1), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();

        let record = fixture.payroll.calculate_monthly(&id, march).await.unwrap();
        assert_eq!(record.working_days, 2);
    }

    #[tokio::test]
    async fn test_total_hours_includes_non_present_records() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 3000.0).await;
        let march = Month::new(2025, 3).unwrap();

        fixture
            .attendance
            .mark(&id, date(2025, 3, 3), Some(AttendanceStatus::Present), Some(8.0))
            .await
            .unwrap();
        // Recorded hours on a leave day still contribute
        fixture
            .attendance
            .mark(&id, date(2025, 3, 4), Some(AttendanceStatus::Leave), Some(2.5))
            .await
            .unwrap();
        fixture
            .attendance
            .mark(&id, date(2025, 3, 5), Some(AttendanceStatus::Absent), None)
            .await
            .unwrap();

        let record = fixture.payroll.calculate_monthly(&id, march).await.unwrap();
        assert_eq!(record.total_hours, 10.5);
        assert_eq!(record.working_days, 1);
    }

    #[tokio::test]
    async fn test_missing_employee_is_not_found() {
        let fixture = fixture();
        let err = fixture
            .payroll
            .calculate_monthly("nope", Month::new(2025, 3).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_calculate_does_not_persist() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 3000.0).await;

        fixture
            .payroll
            .calculate_monthly(&id, Month::new(2025, 3).unwrap())
            .await
            .unwrap();

        assert!(fixture.backend.table_snapshot("payroll").is_empty());
    }

    #[tokio::test]
    async fn test_save_upsert_is_idempotent() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 3000.0).await;
        let march = Month::new(2025, 3).unwrap();

        let first = fixture.payroll.calculate_monthly(&id, march).await.unwrap();
        fixture.payroll.save(&first).await.unwrap();

        // Salary raise, recalculate, save again for the same month
        fixture
            .employees
            .update(
                &id,
                shared::models::EmployeeUpdate {
                    salary: Some(dec(4000.0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = fixture.payroll.calculate_monthly(&id, march).await.unwrap();
        fixture.payroll.save(&second).await.unwrap();

        let stored = fixture.payroll.history(&id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].gross_salary, dec(4000.0));
    }

    #[tokio::test]
    async fn test_save_rejects_mid_month_date() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 3000.0).await;

        let mut record = fixture
            .payroll
            .calculate_monthly(&id, Month::new(2025, 3).unwrap())
            .await
            .unwrap();
        record.month_year = date(2025, 3, 15);

        let err = fixture.payroll.save(&record).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_save_rejects_broken_invariant() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 3000.0).await;

        let mut record = fixture
            .payroll
            .calculate_monthly(&id, Month::new(2025, 3).unwrap())
            .await
            .unwrap();
        record.net_salary = dec(9999.0);

        let err = fixture.payroll.save(&record).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[tokio::test]
    async fn test_history_orders_newest_month_first() {
        let fixture = fixture();
        let id = seed_employee(&fixture, 3000.0).await;

        for month in [
            Month::new(2025, 1).unwrap(),
            Month::new(2025, 3).unwrap(),
            Month::new(2025, 2).unwrap(),
        ] {
            let record = fixture.payroll.calculate_monthly(&id, month).await.unwrap();
            fixture.payroll.save(&record).await.unwrap();
        }

        let history = fixture.payroll.history(&id).await.unwrap();
        let months: Vec<NaiveDate> = history.iter().map(|r| r.month_year).collect();
        assert_eq!(
            months,
            vec![date(2025, 3, 1), date(2025, 2, 1), date(2025, 1, 1)]
        );
    }

    #[tokio::test]
    async fn test_for_month_spans_employees_and_propagates_errors() {
        let fixture = fixture();
        let march = Month::new(2025, 3).unwrap();

        let first = seed_employee(&fixture, 3000.0).await;
        let second = fixture
            .employees
            .create(EmployeeCreate {
                full_name: "Grace Hopper".to_string(),
                role: "Engineer".to_string(),
                department: "Compilers".to_string(),
                salary: dec(4000.0),
                email: "grace@example.com".to_string(),
            })
            .await
            .unwrap()
            .id;

        for id in [&first, &second] {
            let record = fixture.payroll.calculate_monthly(id, march).await.unwrap();
            fixture.payroll.save(&record).await.unwrap();
        }
        // A different month stays out of the listing
        let feb = fixture
            .payroll
            .calculate_monthly(&first, Month::new(2025, 2).unwrap())
            .await
            .unwrap();
        fixture.payroll.save(&feb).await.unwrap();

        let listed = fixture.payroll.for_month(march).await.unwrap();
        assert_eq!(listed.len(), 2);

        // Unified error policy: a failing backend read is an error, not
        // an empty result
        fixture.backend.fail_next_selects(1);
        let err = fixture.payroll.for_month(march).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BackendError);
    }
}

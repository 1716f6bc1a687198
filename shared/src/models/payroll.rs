//! Payroll Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payroll row matching the hosted `payroll` table
///
/// Composite identity: (employee_id, month_year). A saved record is a
/// snapshot of salary and attendance at calculation time; it is never
/// recomputed automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub employee_id: String,
    /// First day of the month this record covers
    pub month_year: NaiveDate,
    pub gross_salary: Decimal,
    /// Deduction name -> amount. "tax" and "insurance" under the default policy.
    pub deductions: BTreeMap<String, Decimal>,
    /// Invariant: net_salary = gross_salary - sum(deductions)
    pub net_salary: Decimal,
    /// Count of days marked "present" in the month
    pub working_days: u32,
    /// Sum of recorded hours across the month's records
    pub total_hours: f64,
}

impl PayrollRecord {
    /// Sum of all deduction amounts
    pub fn total_deductions(&self) -> Decimal {
        self.deductions.values().copied().sum()
    }
}

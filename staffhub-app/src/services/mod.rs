//! Repository-access services
//!
//! Thin typed layers over the hosted table surface, one per relation.
//! Each call validates its inputs, issues the query through the
//! [`TableBackend`](staffhub_client::TableBackend) seam, and returns
//! `AppResult` (validation and not-found errors are raised immediately;
//! backend errors propagate without retry).

pub mod attendance;
pub mod employees;
pub mod payroll;

pub use attendance::AttendanceService;
pub use employees::EmployeeService;
pub use payroll::{DeductionPolicy, PayrollService};

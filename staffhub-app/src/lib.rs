//! StaffHub application core
//!
//! The layer a thin view sits on top of: an explicit session context,
//! repository-access services for the three hosted relations, the monthly
//! payroll calculator, and the optimistic attendance month view. All
//! persistence and authentication are delegated to the hosted backend
//! through the `staffhub-client` trait seams; this crate owns only form
//! validation, local view state, and the payroll arithmetic.

pub mod attendance_view;
pub mod config;
pub mod logger;
pub mod notice;
pub mod services;
pub mod session;

pub use attendance_view::MonthView;
pub use config::AppConfig;
pub use notice::{Notice, NoticeLevel, NoticeSender};
pub use services::{AttendanceService, DeductionPolicy, EmployeeService, PayrollService};
pub use session::{AuthState, SessionContext};

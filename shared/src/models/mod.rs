//! Data models
//!
//! Row types for the three hosted relations (`employees`, `attendance`,
//! `payroll`) plus the create/update payloads the services accept.
//! All IDs are opaque server-assigned strings.

pub mod attendance;
pub mod employee;
pub mod payroll;

// Re-exports
pub use attendance::*;
pub use employee::*;
pub use payroll::*;

//! Shared types for StaffHub
//!
//! Domain models, the unified error system, and calendar types used by
//! both the backend client and the application core.

pub mod error;
pub mod models;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use types::Month;

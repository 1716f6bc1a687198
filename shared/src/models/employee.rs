//! Employee Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee row matching the hosted `employees` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Server-assigned id
    pub id: String,
    pub full_name: String,
    pub role: String,
    pub department: String,
    /// Monthly gross salary. Invariant: never negative.
    pub salary: Decimal,
    pub email: String,
    /// Server-assigned creation timestamp
    pub created_at: Option<DateTime<Utc>>,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub full_name: String,
    pub role: String,
    pub department: String,
    pub salary: Decimal,
    pub email: String,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl EmployeeUpdate {
    /// True when no field is set (nothing to send)
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.role.is_none()
            && self.department.is_none()
            && self.salary.is_none()
            && self.email.is_none()
    }
}

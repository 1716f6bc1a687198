//! Employee repository access

use std::sync::Arc;

use rust_decimal::Decimal;

use shared::error::{AppError, AppResult};
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate};
use staffhub_client::query::rows_to;
use staffhub_client::{Filter, FilterOp, SelectRequest, TableBackend};

const TABLE: &str = "employees";

/// CRUD access to the `employees` relation
#[derive(Clone)]
pub struct EmployeeService {
    backend: Arc<dyn TableBackend>,
}

impl EmployeeService {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    /// List all employees, newest first
    ///
    /// A non-empty `search` term filters by case-insensitive substring
    /// match on full name OR email.
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Employee>> {
        let mut request = SelectRequest::table(TABLE).order("created_at", false);

        if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
            request = request.search(&["full_name", "email"], term);
        }

        let rows = self.backend.select(&request).await?;
        Ok(rows_to(rows)?)
    }

    /// Fetch one employee by id
    pub async fn get(&self, id: &str) -> AppResult<Employee> {
        if id.is_empty() {
            return Err(AppError::required_field("employee id"));
        }

        let request = SelectRequest::table(TABLE).eq("id", id).limit(1);
        let rows = self.backend.select(&request).await?;

        rows_to::<Employee>(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(format!("Employee {}", id)))
    }

    /// Create an employee, returning the stored row
    pub async fn create(&self, data: EmployeeCreate) -> AppResult<Employee> {
        validate_name(&data.full_name)?;
        validate_text("role", &data.role)?;
        validate_text("department", &data.department)?;
        validate_salary(data.salary)?;
        validate_email(&data.email)?;

        let row = serde_json::to_value(&data)
            .map_err(|e| AppError::internal(format!("encode employee: {}", e)))?;
        let stored = self.backend.insert(TABLE, row).await?;

        tracing::debug!(name = %data.full_name, "Employee created");
        serde_json::from_value(stored)
            .map_err(|e| AppError::invalid_format(format!("stored employee: {}", e)))
    }

    /// Update an employee, returning the stored row
    pub async fn update(&self, id: &str, data: EmployeeUpdate) -> AppResult<Employee> {
        if id.is_empty() {
            return Err(AppError::required_field("employee id"));
        }
        if data.is_empty() {
            return Err(AppError::invalid_request("no fields to update"));
        }
        if let Some(name) = &data.full_name {
            validate_name(name)?;
        }
        if let Some(role) = &data.role {
            validate_text("role", role)?;
        }
        if let Some(department) = &data.department {
            validate_text("department", department)?;
        }
        if let Some(salary) = data.salary {
            validate_salary(salary)?;
        }
        if let Some(email) = &data.email {
            validate_email(email)?;
        }

        let patch = serde_json::to_value(&data)
            .map_err(|e| AppError::internal(format!("encode employee update: {}", e)))?;
        let filters = [Filter::new("id", FilterOp::Eq, id)];
        let rows = self.backend.update(TABLE, &filters, patch).await?;

        rows_to::<Employee>(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(format!("Employee {}", id)))
    }

    /// Delete an employee
    ///
    /// Hard delete; deleting an already-missing id is a no-op.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if id.is_empty() {
            return Err(AppError::required_field("employee id"));
        }

        let filters = [Filter::new("id", FilterOp::Eq, id)];
        let removed = self.backend.delete(TABLE, &filters).await?;
        tracing::debug!(id = %id, removed = removed, "Employee delete issued");
        Ok(())
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::required_field("full_name"));
    }
    Ok(())
}

fn validate_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::required_field(field));
    }
    Ok(())
}

fn validate_salary(salary: Decimal) -> AppResult<()> {
    if salary < Decimal::ZERO {
        return Err(
            AppError::with_message(
                shared::error::ErrorCode::ValueOutOfRange,
                "salary must not be negative",
            )
            .with_detail("salary", salary.to_string()),
        );
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::required_field("email"));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::validation(format!("invalid email: {}", email)));
    }
    Ok(())
}

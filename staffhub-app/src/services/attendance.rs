//! Attendance repository access

use std::sync::Arc;

use chrono::NaiveDate;

use shared::error::{AppError, AppResult};
use shared::models::{AttendanceMark, AttendanceRecord, AttendanceStatus};
use shared::types::Month;
use staffhub_client::query::rows_to;
use staffhub_client::{Filter, FilterOp, SelectRequest, TableBackend};

const TABLE: &str = "attendance";

/// Per-day attendance access for the `attendance` relation
///
/// One row per (employee, date), enforced by upsert on that composite
/// key. A cleared day is represented by row absence.
#[derive(Clone)]
pub struct AttendanceService {
    backend: Arc<dyn TableBackend>,
}

impl AttendanceService {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    /// Fetch one employee's records for a month, first through last day
    /// inclusive, ordered by date
    pub async fn month_records(
        &self,
        employee_id: &str,
        month: Month,
    ) -> AppResult<Vec<AttendanceRecord>> {
        if employee_id.is_empty() {
            return Err(AppError::required_field("employee id"));
        }

        let request = SelectRequest::table(TABLE)
            .eq("employee_id", employee_id)
            .gte("date", month.first_day().to_string())
            .lte("date", month.last_day().to_string())
            .order("date", true);

        let rows = self.backend.select(&request).await?;
        Ok(rows_to(rows)?)
    }

    /// Set or clear one day's status
    ///
    /// `Some(status)` upserts the row for (employee, date); `None` clears
    /// the day by deleting the row.
    pub async fn mark(
        &self,
        employee_id: &str,
        date: NaiveDate,
        status: Option<AttendanceStatus>,
        hours_worked: Option<f64>,
    ) -> AppResult<()> {
        if employee_id.is_empty() {
            return Err(AppError::required_field("employee id"));
        }
        if let Some(hours) = hours_worked {
            if !hours.is_finite() || hours < 0.0 {
                return Err(AppError::with_message(
                    shared::error::ErrorCode::ValueOutOfRange,
                    "hours_worked must not be negative",
                ));
            }
        }

        match status {
            Some(status) => {
                let mark = AttendanceMark {
                    employee_id: employee_id.to_string(),
                    date,
                    status,
                    hours_worked,
                };
                let row = serde_json::to_value(&mark)
                    .map_err(|e| AppError::internal(format!("encode attendance: {}", e)))?;
                self.backend
                    .upsert(TABLE, &["employee_id", "date"], row)
                    .await?;
            }
            None => {
                let filters = [
                    Filter::new("employee_id", FilterOp::Eq, employee_id),
                    Filter::new("date", FilterOp::Eq, date.to_string()),
                ];
                self.backend.delete(TABLE, &filters).await?;
            }
        }

        tracing::debug!(employee_id = %employee_id, date = %date, status = ?status, "Attendance marked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;
    use staffhub_client::MemoryBackend;

    fn service() -> (Arc<MemoryBackend>, AttendanceService) {
        let backend = Arc::new(MemoryBackend::new());
        let service = AttendanceService::new(backend.clone());
        (backend, service)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_mark_and_fetch_month() {
        let (_, service) = service();
        let march = Month::new(2025, 3).unwrap();

        service
            .mark("e1", date(2025, 3, 5), Some(AttendanceStatus::Present), Some(8.0))
            .await
            .unwrap();
        service
            .mark("e1", date(2025, 3, 6), Some(AttendanceStatus::Leave), None)
            .await
            .unwrap();

        let records = service.month_records("e1", march).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date(2025, 3, 5));
        assert_eq!(records[0].hours_worked, Some(8.0));
        assert_eq!(records[1].status, AttendanceStatus::Leave);
    }

    #[tokio::test]
    async fn test_remark_same_day_replaces() {
        let (backend, service) = service();

        service
            .mark("e1", date(2025, 3, 5), Some(AttendanceStatus::Absent), None)
            .await
            .unwrap();
        service
            .mark("e1", date(2025, 3, 5), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();

        let rows = backend.table_snapshot("attendance");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], "present");
    }

    #[tokio::test]
    async fn test_clear_removes_row() {
        let (backend, service) = service();

        service
            .mark("e1", date(2025, 3, 5), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();
        service.mark("e1", date(2025, 3, 5), None, None).await.unwrap();

        assert!(backend.table_snapshot("attendance").is_empty());
    }

    #[tokio::test]
    async fn test_month_fetch_excludes_neighboring_days() {
        let (_, service) = service();
        let march = Month::new(2025, 3).unwrap();

        service
            .mark("e1", date(2025, 2, 28), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();
        service
            .mark("e1", date(2025, 3, 1), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();
        service
            .mark("e1", date(2025, 3, 31), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();
        service
            .mark("e1", date(2025, 4, 1), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();

        let records = service.month_records("e1", march).await.unwrap();
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2025, 3, 1), date(2025, 3, 31)]);
    }

    #[tokio::test]
    async fn test_month_fetch_is_per_employee() {
        let (_, service) = service();
        let march = Month::new(2025, 3).unwrap();

        service
            .mark("e1", date(2025, 3, 5), Some(AttendanceStatus::Present), None)
            .await
            .unwrap();
        service
            .mark("e2", date(2025, 3, 5), Some(AttendanceStatus::Absent), None)
            .await
            .unwrap();

        let records = service.month_records("e1", march).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_negative_hours_rejected() {
        let (_, service) = service();
        let err = service
            .mark("e1", date(2025, 3, 5), Some(AttendanceStatus::Present), Some(-1.0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }
}

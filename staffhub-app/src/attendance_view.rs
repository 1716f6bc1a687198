//! Optimistic attendance month view
//!
//! In-memory state for one (employee, month) calendar, mutated
//! optimistically: a status change is visible locally before the backend
//! confirms it. On backend failure the whole month is re-read from the
//! backend, replacing local state (eventual consistency via full re-read,
//! not precise rollback).
//!
//! Rapid successive edits to the same cell are not coalesced or
//! serialized; with several edits in flight, responses may resolve out of
//! submission order. Acceptable for a low-contention single-operator
//! calendar, where the backend's upsert-by-key is the only serialization
//! point.

use chrono::NaiveDate;
use tokio::sync::RwLock;

use shared::error::AppResult;
use shared::models::{AttendanceRecord, AttendanceStatus};
use shared::types::Month;

use crate::notice::NoticeSender;
use crate::services::AttendanceService;

/// One employee's attendance calendar for one month
pub struct MonthView {
    employee_id: String,
    month: Month,
    service: AttendanceService,
    notices: NoticeSender,
    records: RwLock<Vec<AttendanceRecord>>,
}

impl MonthView {
    pub fn new(
        service: AttendanceService,
        notices: NoticeSender,
        employee_id: impl Into<String>,
        month: Month,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            month,
            service,
            notices,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    /// Replace local state with the backend's authoritative month data
    pub async fn load(&self) -> AppResult<()> {
        let records = self
            .service
            .month_records(&self.employee_id, self.month)
            .await?;
        *self.records.write().await = records;
        Ok(())
    }

    /// Snapshot of the current local records
    pub async fn records(&self) -> Vec<AttendanceRecord> {
        self.records.read().await.clone()
    }

    /// The locally-known status for one day, if any
    pub async fn status_on(&self, date: NaiveDate) -> Option<AttendanceStatus> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.date == date)
            .map(|r| r.status)
    }

    /// Set or clear one day's status, optimistically
    ///
    /// The local mutation is applied before the backend call: any record
    /// for the date is removed, and the new one inserted when `status` is
    /// `Some`. On success the local state stands and a success notice is
    /// emitted. On failure the optimistic state is discarded, the month is
    /// re-read from the backend, and an error notice is emitted; the error
    /// is also returned.
    pub async fn set_status(
        &self,
        date: NaiveDate,
        status: Option<AttendanceStatus>,
    ) -> AppResult<()> {
        {
            let mut records = self.records.write().await;
            records.retain(|r| r.date != date);
            if let Some(status) = status {
                records.push(AttendanceRecord {
                    employee_id: self.employee_id.clone(),
                    date,
                    status,
                    hours_worked: None,
                });
            }
        }

        match self
            .service
            .mark(&self.employee_id, date, status, None)
            .await
        {
            Ok(()) => {
                self.notices.success("Attendance updated");
                Ok(())
            }
            Err(err) => {
                self.reconcile().await;
                self.notices
                    .error(format!("Failed to update attendance: {}", err));
                Err(err)
            }
        }
    }

    /// Discard local state in favor of the backend's
    ///
    /// When even the re-read fails, the view falls back to an empty month
    /// rather than keeping unconfirmed local records.
    async fn reconcile(&self) {
        match self
            .service
            .month_records(&self.employee_id, self.month)
            .await
        {
            Ok(authoritative) => *self.records.write().await = authoritative,
            Err(err) => {
                tracing::warn!(
                    employee_id = %self.employee_id,
                    month = %self.month,
                    error = %err,
                    "Reconcile re-read failed, clearing local month state"
                );
                self.records.write().await.clear();
            }
        }
    }
}

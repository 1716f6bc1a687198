//! Attendance Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Attendance status for a single calendar day
///
/// A cleared ("unset") day is represented by record absence, not by a
/// fourth variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "present")]
    Present,
    #[serde(rename = "absent")]
    Absent,
    #[serde(rename = "leave")]
    Leave,
}

impl AttendanceStatus {
    /// Wire name, as stored in the `attendance.status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Leave => "leave",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attendance row matching the hosted `attendance` table
///
/// Composite identity: (employee_id, date). The backend enforces at most
/// one row per pair via upsert on that key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: String,
    /// Calendar date (ISO `YYYY-MM-DD`)
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Hours worked that day, if recorded. Never negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_worked: Option<f64>,
}

/// Upsert payload for marking one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_worked: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Present).unwrap(),
            "\"present\""
        );
        assert_eq!(
            serde_json::from_str::<AttendanceStatus>("\"leave\"").unwrap(),
            AttendanceStatus::Leave
        );
        assert_eq!(AttendanceStatus::Absent.to_string(), "absent");
    }

    #[test]
    fn test_record_round_trip() {
        let json = r#"{"employee_id":"e1","date":"2025-03-05","status":"present","hours_worked":7.5}"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.hours_worked, Some(7.5));
    }

    #[test]
    fn test_missing_hours_is_none() {
        let json = r#"{"employee_id":"e1","date":"2025-03-05","status":"absent"}"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert!(record.hours_worked.is_none());
    }
}

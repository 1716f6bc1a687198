//! Typed round trips through the table surface
//!
//! Exercises the trait seam the application services rely on, using the
//! in-memory backend with the real shared models.

use serde_json::json;
use shared::models::{AttendanceRecord, AttendanceStatus, Employee};
use staffhub_client::{MemoryBackend, SelectRequest, TableBackend, query::rows_to};

#[tokio::test]
async fn employees_order_by_created_at_descending() {
    let backend = MemoryBackend::new();

    for (name, created_at) in [
        ("First", "2025-01-01T08:00:00Z"),
        ("Third", "2025-03-01T08:00:00Z"),
        ("Second", "2025-02-01T08:00:00Z"),
    ] {
        backend
            .insert(
                "employees",
                json!({
                    "full_name": name,
                    "role": "Engineer",
                    "department": "R&D",
                    "salary": 1000.0,
                    "email": format!("{}@example.com", name.to_lowercase()),
                    "created_at": created_at,
                }),
            )
            .await
            .unwrap();
    }

    let rows = backend
        .select(&SelectRequest::table("employees").order("created_at", false))
        .await
        .unwrap();
    let employees: Vec<Employee> = rows_to(rows).unwrap();

    let names: Vec<&str> = employees.iter().map(|e| e.full_name.as_str()).collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn attendance_rows_deserialize_with_typed_status() {
    let backend = MemoryBackend::new();

    backend
        .upsert(
            "attendance",
            &["employee_id", "date"],
            json!({"employee_id": "e1", "date": "2025-03-05", "status": "present", "hours_worked": 8.0}),
        )
        .await
        .unwrap();

    let rows = backend
        .select(&SelectRequest::table("attendance").eq("employee_id", "e1"))
        .await
        .unwrap();
    let records: Vec<AttendanceRecord> = rows_to(rows).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::Present);
    assert_eq!(records[0].hours_worked, Some(8.0));
}

#[tokio::test]
async fn malformed_row_surfaces_as_invalid_response() {
    let backend = MemoryBackend::new();

    backend
        .insert("attendance", json!({"employee_id": "e1", "date": "2025-03-05", "status": "vacationing"}))
        .await
        .unwrap();

    let rows = backend
        .select(&SelectRequest::table("attendance"))
        .await
        .unwrap();
    let result = rows_to::<AttendanceRecord>(rows);

    assert!(matches!(
        result,
        Err(staffhub_client::ClientError::InvalidResponse(_))
    ));
}

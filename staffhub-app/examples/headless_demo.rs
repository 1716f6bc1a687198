//! Headless demo of the application core
//!
//! Drives the employee / attendance / payroll flow end to end without a
//! view layer. With `STAFFHUB_BACKEND_URL` and `STAFFHUB_BACKEND_API_KEY`
//! set (plus `STAFFHUB_DEMO_EMAIL` / `STAFFHUB_DEMO_PASSWORD` for
//! sign-in), it talks to the hosted backend; otherwise it runs entirely
//! in-process against the in-memory backend.
//!
//! ```bash
//! cargo run -p staffhub-app --example headless_demo
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::{AttendanceStatus, EmployeeCreate};
use shared::types::Month;
use staffhub_app::{
    AppConfig, AttendanceService, EmployeeService, MonthView, NoticeSender, PayrollService,
    SessionContext, logger,
};
use staffhub_client::{AuthBackend, MemoryBackend, TableBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logger("info", false)?;

    let hosted = std::env::var("STAFFHUB_BACKEND_URL").is_ok();
    let (tables, session): (Arc<dyn TableBackend>, SessionContext) = if hosted {
        let config = AppConfig::from_env();
        let rest = Arc::new(config.client_config().build_rest_client());
        let auth: Arc<dyn AuthBackend> = Arc::new(config.client_config().build_auth_client());

        let session = SessionContext::new(auth).with_session_file(&config.session_file);
        let sink = rest.clone();
        session.on_token_change(move |token| sink.set_token(token.map(String::from)));
        session.init().await?;

        if !session.is_authenticated().await {
            let email = std::env::var("STAFFHUB_DEMO_EMAIL")?;
            let password = std::env::var("STAFFHUB_DEMO_PASSWORD")?;
            session.sign_in(&email, &password).await?;
        }

        (rest, session)
    } else {
        tracing::info!("No backend configured, using the in-memory backend");
        let backend = Arc::new(MemoryBackend::new().with_user("demo@example.com", "demo"));
        let session = SessionContext::new(backend.clone());
        session.sign_in("demo@example.com", "demo").await?;
        (backend, session)
    };

    let notices = NoticeSender::default();
    let mut notice_rx = notices.subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = notice_rx.recv().await {
            println!("[{:?}] {}", notice.level, notice.message);
        }
    });

    let employees = EmployeeService::new(tables.clone());
    let attendance = AttendanceService::new(tables.clone());
    let payroll = PayrollService::new(tables.clone());

    let ada = employees
        .create(EmployeeCreate {
            full_name: "Ada Lovelace".to_string(),
            role: "Engineer".to_string(),
            department: "R&D".to_string(),
            salary: Decimal::new(3000, 0),
            email: "ada@example.com".to_string(),
        })
        .await?;
    println!("Created employee {} ({})", ada.full_name, ada.id);

    let march = Month::new(2025, 3).unwrap();
    let view = MonthView::new(attendance, notices.clone(), ada.id.clone(), march);
    view.load().await?;
    for day in 3..=7 {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
        view.set_status(date, Some(AttendanceStatus::Present)).await?;
    }

    let record = payroll.calculate_monthly(&ada.id, march).await?;
    println!(
        "Payroll {}: gross {} | deductions {} | net {} | {} working days",
        march,
        record.gross_salary,
        record.total_deductions(),
        record.net_salary,
        record.working_days
    );

    payroll.save(&record).await?;
    let history = payroll.history(&ada.id).await?;
    println!("History now holds {} record(s)", history.len());

    session.sign_out().await?;
    Ok(())
}

//! Integration tests for the smart-helper consoles and account storage
//!
//! These drive whole sessions through the public API: virtual time is
//! stepped directly, so minutes of simulated activity run instantly.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use smart_helper_core::admin::{AdminSession, AdminTuning};
use smart_helper_core::auth::{AuthStore, SignUpForm};
use smart_helper_core::config::Config;
use smart_helper_core::db::Database;
use smart_helper_core::generate::{MockGenerator, INCOMING_POOL};
use smart_helper_core::helper::{HelperCommand, HelperSession, HelperTimings};
use smart_helper_core::session::{SessionClock, Simulation};
use smart_helper_core::types::{
    FraudRisk, Helper, HelperStatus, HistoryStatus, JobStatus, MatchQuality, RequestStatus,
    Role, ServiceRequest, ServiceType,
};
use tempfile::TempDir;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn helper_console(seed: u64) -> HelperSession {
    HelperSession::new(
        "Alex Thomas",
        HelperTimings::default(),
        MockGenerator::from_seed(seed),
        SessionClock::new(Utc::now()),
    )
}

// ============================================
// Helper console
// ============================================

#[test]
fn test_accept_named_request() {
    let mut console = helper_console(1);
    let mut generator = MockGenerator::from_seed(2);
    let mut card = generator.incoming_from(&INCOMING_POOL[2], Utc::now());
    card.id = "req-7".to_string();
    console.offer(card);

    let outcome = console.apply(HelperCommand::Accept("req-7".to_string()));
    assert!(outcome.is_applied());

    assert!(console.incoming().iter().all(|r| r.id != "req-7"));
    let job = console.active_job().expect("job should be active");
    assert_eq!(job.request.id, "req-7");
    assert_eq!(job.job_status, JobStatus::Pending);
    assert_eq!(console.status(), HelperStatus::Busy);
}

#[test]
fn test_helper_shift_keeps_earnings_consistent() {
    let mut console = helper_console(42);

    // Accept whatever is on top every 20 seconds and drive it to completion
    for minute in 1..=30u64 {
        console.advance_to(secs(minute * 20));
        if console.active_job().is_none() {
            if let Some(id) = console.incoming().first().map(|r| r.id.clone()) {
                console.apply(HelperCommand::Accept(id));
            }
        }
        console.apply(HelperCommand::AdvanceJob);
    }

    let completed: Vec<_> = console
        .history()
        .iter()
        .filter(|h| h.status == HistoryStatus::Completed)
        .collect();
    let earned: u64 = completed.iter().map(|h| u64::from(h.amount)).sum();

    let earnings = console.earnings();
    assert!(earnings.total_jobs > 0);
    assert_eq!(earnings.total_jobs as usize, completed.len());
    assert_eq!(earnings.today, earned);
    assert_eq!(earnings.weekly, earned);

    // Every card that was neither accepted nor rejected timed out
    assert!(console.incoming().len() <= 1);
}

#[test]
fn test_notification_lifetime_independent_of_activity() {
    let mut console = helper_console(9);
    console.advance_to(secs(1));
    let first = console.incoming()[0].id.clone();
    let second = console.incoming()[1].id.clone();

    console.advance_to(secs(2));
    console.apply(HelperCommand::Reject(first));
    console.advance_to(secs(4));
    console.apply(HelperCommand::Reject(second));

    // 2s push gone at 5s, 4s push still visible
    console.advance_to(secs(5));
    assert_eq!(console.notifications().len(), 1);
    console.advance_to(secs(7));
    assert!(console.notifications().is_empty());
}

// ============================================
// Admin console
// ============================================

#[test]
fn test_manual_assign_from_empty_console() {
    let mut admin = AdminSession::new(
        AdminTuning::empty(),
        MockGenerator::from_seed(3),
        SessionClock::new(Utc::now()),
    );
    assert!(admin.requests().is_empty());

    admin.insert_request(ServiceRequest {
        id: "R1".to_string(),
        customer_name: "Anita Nair".to_string(),
        service_type: ServiceType::AcRepair,
        status: RequestStatus::Pending,
        assigned_helper: None,
        created_at: Utc::now(),
        eta_minutes: 8,
        match_quality: MatchQuality::High,
        fraud_risk: FraudRisk::Low,
        payment_amount: 650,
    });
    admin.insert_helper(Helper {
        id: "H1".to_string(),
        name: "Rajesh Kumar".to_string(),
        status: HelperStatus::Available,
        current_job: None,
        rating: 4.8,
        earnings_today: 1200,
        location: "Ernakulam".to_string(),
    });

    assert!(admin.manual_assign("R1", "H1").is_applied());

    let snapshot = admin.snapshot();
    let r1 = &snapshot.requests[0];
    assert_eq!(r1.status, RequestStatus::Assigned);
    assert_eq!(r1.assigned_helper.as_deref(), Some("Rajesh Kumar"));
    let h1 = &snapshot.helpers[0];
    assert_eq!(h1.status, HelperStatus::Busy);
    assert_eq!(h1.current_job.as_deref(), Some("R1"));
    assert!(snapshot
        .notifications
        .iter()
        .any(|n| n.message.contains("manually assigned")));
}

#[test]
fn test_admin_hour_keeps_invariants() {
    let mut admin = AdminSession::new(
        AdminTuning::default(),
        MockGenerator::from_seed(2024),
        SessionClock::new(Utc::now()),
    );

    for step in 1..=360u64 {
        admin.advance_to(secs(step * 10));

        let snapshot = admin.snapshot();
        let revenue: u64 = snapshot
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Completed)
            .map(|r| u64::from(r.payment_amount))
            .sum();
        assert_eq!(snapshot.metrics.revenue_today, revenue);
        assert!(snapshot.logs.len() <= 50);

        // Alerts only ever point at high-risk requests
        for alert in &snapshot.fraud_alerts {
            let request = snapshot
                .requests
                .iter()
                .find(|r| r.id == alert.request_id)
                .expect("alert for unknown request");
            assert_eq!(request.fraud_risk, FraudRisk::High);
        }
    }

    // 8 seeded plus one every 20 seconds
    assert_eq!(admin.requests().len(), 8 + 180);
}

#[test]
fn test_block_then_allow_is_ignored() {
    let mut admin = AdminSession::new(
        AdminTuning::empty(),
        MockGenerator::from_seed(11),
        SessionClock::new(Utc::now()),
    );
    admin.insert_request(ServiceRequest {
        id: "F1".to_string(),
        customer_name: "Vikram Singh".to_string(),
        service_type: ServiceType::Electrical,
        status: RequestStatus::Pending,
        assigned_helper: None,
        created_at: Utc::now(),
        eta_minutes: 14,
        match_quality: MatchQuality::Low,
        fraud_risk: FraudRisk::High,
        payment_amount: 780,
    });
    assert_eq!(admin.fraud_alerts().len(), 1);
    assert_eq!(admin.fraud_alerts()[0].request_id, "F1");

    assert!(admin.block_fraud_request("F1").is_applied());
    assert!(admin.fraud_alerts().is_empty());
    let request = admin.request("F1").expect("request kept");
    assert_eq!(request.status, RequestStatus::Cancelled);
    assert_eq!(request.fraud_risk, FraudRisk::Blocked);

    // Nothing left to allow; the request stays blocked
    assert!(!admin.allow_fraud_request("F1").is_applied());
    let request = admin.request("F1").expect("request kept");
    assert_eq!(request.status, RequestStatus::Cancelled);
    assert_eq!(request.fraud_risk, FraudRisk::Blocked);
    assert_eq!(admin.metrics().cancelled_today, 1);
    assert!(admin.notifications().contains("Request F1 allowed"));
}

// ============================================
// Accounts and configuration
// ============================================

#[test]
fn test_login_survives_restart() {
    let temp = TempDir::new().unwrap();
    let db_path: PathBuf = temp.path().join("data.db");

    {
        let db = Database::open(&db_path).unwrap();
        db.migrate().unwrap();
        let form = SignUpForm {
            role: Some(Role::Admin),
            name: "Ops".to_string(),
            email: "ops@smarthelper.in".to_string(),
            password: "letmein".to_string(),
            confirm_password: "letmein".to_string(),
        };
        AuthStore::new(&db).sign_up(&form).unwrap();
    }

    let db = Database::open(&db_path).unwrap();
    db.migrate().unwrap();
    let store = AuthStore::new(&db);
    let user = store.require_role(Role::Admin).unwrap();
    assert_eq!(user.email, "ops@smarthelper.in");

    store.logout().unwrap();
    assert!(store.require_role(Role::Admin).is_err());
    let again = store
        .sign_in("ops@smarthelper.in", "letmein", Some(Role::Admin))
        .unwrap();
    assert_eq!(again.role, Role::Admin);
}

#[test]
fn test_config_drives_console_cadence() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[simulation]
seed = 5
notification_ttl_ms = 1000

[helper]
initial_delay_ms = 200
auto_reject_secs = 2
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let mut console = HelperSession::new(
        config.helper.name.clone(),
        HelperTimings::from_config(&config.helper, config.simulation.notification_ttl()),
        MockGenerator::new(config.simulation.seed),
        SessionClock::new(Utc::now()),
    );

    console.advance_to(Duration::from_millis(200));
    assert_eq!(console.incoming().len(), 2);
    console.advance_to(Duration::from_millis(2_200));
    assert!(console.incoming().is_empty());
    assert!(console.notifications().contains("auto-rejected"));
    console.advance_to(Duration::from_millis(3_200));
    assert!(console.notifications().is_empty());
}

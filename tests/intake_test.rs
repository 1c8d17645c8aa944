mod common;

use common::{created_at, intake, RecordingMailer, StubBehavior, StubRepository, ADMIN};
use lead_intake::adapters::DisabledMailer;
use lead_intake::core::form::LeadForm;
use lead_intake::core::intake::{HealthBody, SUCCESS_MESSAGE};
use lead_intake::core::notification::{render_admin_email, render_customer_email};
use lead_intake::domain::model::{Lead, LeadId, NotificationOutcome};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn form(value: Value) -> LeadForm {
    let bytes = serde_json::to_vec(&value).unwrap();
    LeadForm::from_body(Some("application/json"), &bytes).unwrap()
}

fn valid_submission() -> Value {
    json!({
        "full_name": "Jane Doe",
        "email": "jane@example.com",
        "zip_code": "94107",
        "monthly_bill": "100"
    })
}

#[tokio::test]
async fn test_successful_submission_returns_201_and_notifies_both() {
    let repository = StubRepository::new(StubBehavior::Succeed);
    let mailer = Arc::new(RecordingMailer::default());
    let intake = intake(repository.clone(), mailer.clone(), false);

    let (reply, notifications) = intake.submit_tracked(form(valid_submission())).await;

    assert_eq!(reply.status, 201);
    assert!(reply.body.success);
    assert_eq!(reply.body.message, SUCCESS_MESSAGE);
    assert_eq!(reply.body.lead_id, Some(LeadId::Int(42)));
    assert_eq!(
        serde_json::to_value(&reply.body).unwrap(),
        json!({"success": true, "message": SUCCESS_MESSAGE, "leadId": 42})
    );

    let inserted = repository.inserted.lock().await;
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].monthly_bill, 100.0);
    drop(inserted);

    let report = notifications.expect("notifications dispatched").await.unwrap();
    assert!(report.customer.success());
    assert!(report.admin.success());

    let snapshot = Lead {
        id: LeadId::Int(42),
        full_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        zip_code: "94107".to_string(),
        monthly_bill: 100.0,
        created_at: created_at(),
    };
    assert_eq!(
        mailer.sent_to("jane@example.com").await,
        Some(render_customer_email("Jane Doe", "jane@example.com", 100.0).unwrap())
    );
    let admin_email = mailer.sent_to(ADMIN).await.expect("admin notified");
    assert_eq!(admin_email, render_admin_email(&snapshot).unwrap());
    assert!(admin_email.text.contains("Annual bill: $1200.00"));
    assert!(admin_email.text.contains("Potential savings: $1080.00/year with solar"));
    assert!(admin_email.text.contains("System size estimate: 6.5 kW"));
}

#[tokio::test]
async fn test_missing_fields_are_rejected_before_storage() {
    for field in ["full_name", "email", "zip_code", "monthly_bill"] {
        let repository = StubRepository::new(StubBehavior::Succeed);
        let intake = intake(repository.clone(), Arc::new(RecordingMailer::default()), false);

        let mut submission = valid_submission();
        submission.as_object_mut().unwrap().remove(field);
        let (reply, notifications) = intake.submit_tracked(form(submission)).await;

        assert_eq!(reply.status, 400, "missing {}", field);
        assert_eq!(
            serde_json::to_value(&reply.body).unwrap(),
            json!({"success": false, "message": "All fields are required"})
        );
        assert!(notifications.is_none());
        assert!(repository.inserted.lock().await.is_empty());
    }
}

#[tokio::test]
async fn test_invalid_email_is_rejected_before_storage() {
    let repository = StubRepository::new(StubBehavior::Succeed);
    let intake = intake(repository.clone(), Arc::new(RecordingMailer::default()), false);

    for email in ["jane", "jane@example", "jane doe@example.com", "@example.com"] {
        let mut submission = valid_submission();
        submission["email"] = json!(email);
        let reply = intake.submit(form(submission)).await;
        assert_eq!(reply.status, 400, "email {}", email);
        assert_eq!(reply.body.message, "Invalid email format");
    }
    assert!(repository.inserted.lock().await.is_empty());
}

#[tokio::test]
async fn test_undecodable_body_is_rejected_without_storage() {
    let repository = StubRepository::new(StubBehavior::Succeed);
    let intake = intake(repository.clone(), Arc::new(RecordingMailer::default()), true);

    let err = LeadForm::from_body(Some("application/json"), b"{\"full_name\": ").unwrap_err();
    let reply = intake.reject(err);

    assert_eq!(reply.status, 400);
    assert_eq!(
        serde_json::to_value(&reply.body).unwrap(),
        json!({"success": false, "message": "Invalid request body"})
    );
    assert!(repository.inserted.lock().await.is_empty());
}

#[tokio::test]
async fn test_storage_failures_map_to_distinct_messages_without_notifying() {
    let cases = [
        (
            Some("42501"),
            "Permission denied. Please check your Supabase RLS policies.",
        ),
        (
            Some("42P01"),
            "Table not found. Please create the leads table in your Supabase database.",
        ),
        (
            Some("23514"),
            "Database error. Please check server console for details.",
        ),
        (None, "Database error. Please check server console for details."),
    ];

    for (code, message) in cases {
        let mailer = Arc::new(RecordingMailer::default());
        let intake = intake(
            StubRepository::new(StubBehavior::FailWithCode(code)),
            mailer.clone(),
            false,
        );

        let (reply, notifications) = intake.submit_tracked(form(valid_submission())).await;
        assert_eq!(reply.status, 500);
        assert!(!reply.body.success);
        assert_eq!(reply.body.message, message);
        assert_eq!(reply.body.details, None);
        assert!(notifications.is_none());
        assert!(mailer.sent.lock().await.is_empty());
    }
}

#[tokio::test]
async fn test_development_mode_exposes_storage_details() {
    let intake = intake(
        StubRepository::new(StubBehavior::FailWithCode(Some("42501"))),
        Arc::new(RecordingMailer::default()),
        true,
    );

    let reply = intake.submit(form(valid_submission())).await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body.details.as_deref(), Some("backend said no"));
}

#[tokio::test]
async fn test_unexpected_errors_are_generic_and_gated() {
    let production = intake(
        StubRepository::new(StubBehavior::Unexpected),
        Arc::new(RecordingMailer::default()),
        false,
    );
    let reply = production.submit(form(valid_submission())).await;
    assert_eq!(reply.status, 500);
    assert_eq!(
        reply.body.message,
        "An unexpected error occurred. Please try again later."
    );
    assert_eq!(reply.body.error, None);

    let development = intake(
        StubRepository::new(StubBehavior::Unexpected),
        Arc::new(RecordingMailer::default()),
        true,
    );
    let reply = development.submit(form(valid_submission())).await;
    assert!(reply
        .body
        .error
        .as_deref()
        .is_some_and(|e| e.contains("row came back malformed")));
}

#[tokio::test]
async fn test_unconfigured_mail_still_returns_201() {
    let intake = intake(
        StubRepository::new(StubBehavior::Succeed),
        Arc::new(DisabledMailer),
        false,
    );

    let (reply, notifications) = intake.submit_tracked(form(valid_submission())).await;
    assert_eq!(reply.status, 201);

    let report = notifications.unwrap().await.unwrap();
    assert!(matches!(report.customer, NotificationOutcome::Skipped { .. }));
    assert!(matches!(report.admin, NotificationOutcome::Skipped { .. }));
}

#[tokio::test]
async fn test_slow_mail_transport_does_not_delay_response() {
    let mailer = RecordingMailer::slow(Duration::from_secs(30));
    let intake = intake(
        StubRepository::new(StubBehavior::Succeed),
        mailer.clone(),
        false,
    );

    let reply = tokio::time::timeout(
        Duration::from_secs(2),
        intake.submit(form(valid_submission())),
    )
    .await
    .expect("response must not wait for notifications");

    assert_eq!(reply.status, 201);
    assert!(mailer.sent.lock().await.is_empty());
}

#[tokio::test]
async fn test_health_reports_storage_and_mail_state() {
    let healthy = intake(
        StubRepository::new(StubBehavior::Succeed),
        Arc::new(DisabledMailer),
        false,
    );
    let reply = healthy.health().await;
    assert_eq!(reply.status, 200);
    let body = serde_json::to_value(&reply.body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["email"], "not configured");
    assert_eq!(body["supabase"], "connected");
    assert_eq!(body["table"], "leads table accessible");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

    let broken = intake(
        StubRepository::new(StubBehavior::FailWithCode(None)),
        Arc::new(RecordingMailer::default()),
        false,
    );
    let reply = broken.health().await;
    assert_eq!(reply.status, 500);
    match reply.body {
        HealthBody::Error {
            status,
            database,
            error,
            ..
        } => {
            assert_eq!(status, "error");
            assert_eq!(database, "disconnected");
            assert_eq!(error, "connection refused");
        }
        other => panic!("expected error body, got {:?}", other),
    }
}

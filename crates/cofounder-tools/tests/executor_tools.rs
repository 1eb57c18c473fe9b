//! The task executor driving the real integration tools.

use std::sync::Arc;

use redb::Database;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cofounder_ai::{MockLlmClient, MockStep, TaskExecutor, TaskRunConfig, TaskRunOutcome};
use cofounder_storage::IntegrationStorage;
use cofounder_tools::{CreateCalendarEventTool, SendEmailTool, StorageIntegrationGate};
use cofounder_traits::ToolRegistry;

fn integrations() -> IntegrationStorage {
    let temp_dir = tempdir().unwrap();
    let db = Arc::new(Database::create(temp_dir.path().join("test.db")).unwrap());
    IntegrationStorage::new(db).unwrap()
}

#[tokio::test]
async fn scheduling_task_calls_the_calendar_api_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-42",
            "summary": "Meeting with Jane",
            "start": {"dateTime": "2026-08-08T10:00:00Z"},
            "end": {"dateTime": "2026-08-08T10:30:00Z"},
            "htmlLink": "https://calendar.example/evt-42"
        })))
        .mount(&server)
        .await;

    let integrations = integrations();
    integrations
        .connect("user-1", "google_calendar", "tok-cal", None)
        .unwrap();

    let mut registry = ToolRegistry::new();
    registry.register(
        CreateCalendarEventTool::new(integrations.resolver()).with_base_url(server.uri()),
    );
    let registry = Arc::new(registry);

    let planner = MockLlmClient::from_steps(vec![
        MockStep::tool_call(
            "call-1",
            "create_calendar_event",
            json!({
                "title": "Meeting with Jane",
                "start": "2026-08-08T10:00:00Z",
                "end": "2026-08-08T10:30:00Z"
            }),
        ),
        MockStep::text("Booked the meeting with Jane for tomorrow at 10:00."),
    ]);

    let executor = TaskExecutor::new(Arc::new(planner), registry.clone()).with_gate(Arc::new(
        StorageIntegrationGate::new(integrations, registry),
    ));

    let outcome = executor
        .run(TaskRunConfig::new(
            "schedule a meeting tomorrow with Jane",
            "user-1",
        ))
        .await
        .unwrap();

    match outcome {
        TaskRunOutcome::Completed(report) => {
            assert_eq!(report.steps, 1);
            assert_eq!(report.tools_used, vec!["create_calendar_event"]);
            assert_eq!(report.actions[0].result["event_id"], "evt-42");
            assert_eq!(report.missing_integrations, Some(vec![]));
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn email_task_suspends_on_the_real_approval_gate() {
    let integrations = integrations();
    integrations
        .connect("user-1", "gmail", "tok-gmail", None)
        .unwrap();

    let mut registry = ToolRegistry::new();
    registry.register(SendEmailTool::new(integrations.resolver()));
    let registry = Arc::new(registry);

    let planner = MockLlmClient::from_steps(vec![MockStep::tool_call(
        "call-1",
        "send_email",
        json!({
            "to": "investors@fund.com",
            "subject": "Monthly update",
            "body": "Revenue grew 20%."
        }),
    )]);

    let executor = TaskExecutor::new(Arc::new(planner), registry);

    let outcome = executor
        .run(
            TaskRunConfig::new("email the investor update", "user-1")
                .with_task_id("task-7"),
        )
        .await
        .unwrap();

    match outcome {
        TaskRunOutcome::NeedsApproval(handoff) => {
            assert!(!handoff.approval_id.is_empty());
            assert_eq!(handoff.preview["to"], "investors@fund.com");
            assert_eq!(handoff.steps, 1);
        }
        other => panic!("expected approval suspension, got {other:?}"),
    }
}

#[tokio::test]
async fn email_task_without_gmail_reports_the_gap_and_still_succeeds() {
    let integrations = integrations();

    let mut registry = ToolRegistry::new();
    registry.register(SendEmailTool::new(integrations.resolver()));
    let registry = Arc::new(registry);

    let planner = MockLlmClient::from_steps(vec![
        MockStep::tool_call(
            "call-1",
            "send_email",
            json!({"to": "a@b.com", "subject": "s", "body": "b"}),
        ),
        MockStep::text("Gmail is not connected yet - connect it and I'll send the update."),
    ]);

    let executor = TaskExecutor::new(Arc::new(planner), registry.clone()).with_gate(Arc::new(
        StorageIntegrationGate::new(integrations, registry),
    ));

    let outcome = executor
        .run(TaskRunConfig::new("email the investor update", "user-1"))
        .await
        .unwrap();

    match outcome {
        TaskRunOutcome::Completed(report) => {
            assert!(report.result.contains("not connected"));
            assert!(report.tools_used.is_empty());
            assert_eq!(report.missing_integrations, Some(vec!["gmail".to_string()]));
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

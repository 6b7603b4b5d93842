//! End-to-end delivery flow: raw request, standard catalogue, handlers,
//! check-run reporting, HTTP response.

use std::sync::{Arc, Mutex};

use dispatch::{
    CheckRunConclusion, CheckRunError, CheckRunRef, CheckRunReporter, CheckRunUpdate, Dispatcher,
    HandlerRegistryBuilder, RawHeaders,
};
use github::{EventCatalogue, EventExt, IssueCommentView};
use http::StatusCode;
use listener::WebhookReceiver;
use serde_json::json;

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct RecordingReporter {
    updates: Mutex<Vec<(CheckRunRef, CheckRunUpdate)>>,
}

impl CheckRunReporter for RecordingReporter {
    fn update(&self, check_run: &CheckRunRef, update: &CheckRunUpdate) -> Result<(), CheckRunError> {
        self.updates
            .lock()
            .unwrap()
            .push((check_run.clone(), update.clone()));
        Ok(())
    }
}

struct App {
    receiver: WebhookReceiver,
    log: Log,
    reporter: Arc<RecordingReporter>,
}

fn app() -> App {
    let catalogue = EventCatalogue::standard().unwrap();
    let events = *catalogue.events();
    let log = Log::default();
    let reporter = Arc::new(RecordingReporter::default());
    let mut registry = HandlerRegistryBuilder::new(Arc::clone(catalogue.taxonomy()));

    let audit = Arc::clone(&log);
    registry
        .register_fn(catalogue.taxonomy().base(), "audit", move |event| {
            audit
                .lock()
                .unwrap()
                .push(format!("audit:{}", event.type_name()));
            Ok(())
        })
        .unwrap();

    let comments = Arc::clone(&log);
    registry
        .register_fn(events.issue_comment_created, "reply", move |event| {
            let view: IssueCommentView = event.view()?;
            comments
                .lock()
                .unwrap()
                .push(format!("reply:{}", view.comment.body));
            Ok(())
        })
        .unwrap();

    registry
        .register_fn(events.check_run_rerequested, "rerun", |event| {
            anyhow::ensure!(event.check_run().is_some(), "no check run");
            anyhow::bail!("runner unavailable")
        })
        .unwrap();

    let dispatcher = Dispatcher::new(Arc::new(registry.seal()))
        .with_check_run_reporter(Arc::clone(&reporter) as Arc<dyn CheckRunReporter>);

    App {
        receiver: WebhookReceiver::new(Arc::new(dispatcher)),
        log,
        reporter,
    }
}

fn headers(event: &str) -> RawHeaders {
    [
        ("X-GitHub-Event", event),
        ("X-GitHub-Delivery", "d0d7a4a4-4e6f-4f0e-9d43-6d3bbd4e6c1a"),
        ("X-GitHub-Hook-Id", "1"),
        ("X-GitHub-Hook-Installation-Target-Type", "integration"),
        ("X-GitHub-Hook-Installation-Target-Id", "99"),
    ]
    .into_iter()
    .collect()
}

fn envelope(mut extra: serde_json::Value) -> Vec<u8> {
    let common = json!({
        "installation": { "id": 1234 },
        "repository": {
            "id": 1,
            "name": "widgets",
            "full_name": "acme/widgets",
            "owner": { "id": 2, "login": "acme", "type": "Organization" }
        },
        "sender": { "id": 3, "login": "alice", "type": "User" }
    });
    if let (Some(target), Some(common)) = (extra.as_object_mut(), common.as_object()) {
        for (key, value) in common {
            target.insert(key.clone(), value.clone());
        }
    }
    extra.to_string().into_bytes()
}

#[test]
fn created_comment_runs_audit_and_reply() {
    let app = app();
    let body = envelope(json!({
        "action": "created",
        "issue": { "number": 1, "title": "Hi" },
        "comment": { "id": 5, "body": "/deploy" }
    }));

    let response = app.receiver.receive(&headers("issue_comment"), &body);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        *app.log.lock().unwrap(),
        vec!["audit:IssueCommentCreatedEvent", "reply:/deploy"]
    );
}

#[test]
fn deleted_comment_runs_only_audit() {
    let app = app();
    let body = envelope(json!({
        "action": "deleted",
        "issue": { "number": 1, "title": "Hi" },
        "comment": { "id": 5, "body": "/deploy" }
    }));

    let response = app.receiver.receive(&headers("issue_comment"), &body);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(*app.log.lock().unwrap(), vec!["audit:IssueCommentDeletedEvent"]);
}

#[test]
fn failing_handler_marks_check_run_and_returns_server_error() {
    let app = app();
    let body = envelope(json!({
        "action": "rerequested",
        "check_run": {
            "id": 31337,
            "name": "build",
            "head_sha": "deadbeef",
            "status": "completed"
        }
    }));

    let response = app.receiver.receive(&headers("check_run"), &body);

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(*app.log.lock().unwrap(), vec!["audit:CheckRunRerequestedEvent"]);

    let updates = app.reporter.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    let (check_run, update) = &updates[0];
    assert_eq!(check_run.id().as_u64(), 31337);
    assert_eq!(check_run.head_sha(), Some("deadbeef"));
    assert_eq!(update.conclusion, CheckRunConclusion::Failure);
    assert!(update
        .text
        .as_deref()
        .is_some_and(|text| text.contains("runner unavailable")));
}

#[test]
fn unknown_event_is_rejected_without_running_handlers() {
    let app = app();

    let response = app
        .receiver
        .receive(&headers("deployment_status"), &envelope(json!({})));

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.log.lock().unwrap().is_empty());
}

#[test]
fn missing_event_header_is_rejected() {
    let app = app();
    let mut headers = RawHeaders::new();
    headers.insert("X-GitHub-Delivery", "d0d7a4a4-4e6f-4f0e-9d43-6d3bbd4e6c1a");

    let response = app.receiver.receive(&headers, &envelope(json!({})));

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("X-GitHub-Event"));
}

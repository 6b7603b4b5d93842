//! Tests for typed event views.

use super::*;
use crate::EventCatalogue;
use dispatch::RawHeaders;
use serde_json::{json, Value};

fn event(name: &str, extra: Value) -> Event {
    let catalogue = EventCatalogue::standard().unwrap();
    let headers: RawHeaders = [
        ("X-GitHub-Event", name),
        ("X-GitHub-Delivery", "9a2f3a8e-6f1b-11ee-8c99-0242ac120002"),
        ("X-GitHub-Hook-Installation-Target-Id", "42"),
    ]
    .into_iter()
    .collect();

    let mut body = json!({
        "installation": { "id": 7 },
        "repository": {
            "id": 1,
            "name": "hello",
            "full_name": "octo/hello",
            "owner": { "id": 5, "login": "octo", "type": "Organization" }
        },
        "sender": { "id": 6, "login": "dependabot[bot]", "type": "Bot" }
    });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }

    let taxonomy = catalogue.taxonomy();
    let id = taxonomy.resolve(&headers, &body).unwrap();
    Event::from_delivery(taxonomy, id, &headers, body).unwrap()
}

#[test]
fn test_issue_comment_view() {
    let event = event(
        "issue_comment",
        json!({
            "action": "edited",
            "issue": { "number": 12, "title": "Crash on start", "pull_request": { "url": "x" } },
            "comment": { "id": 3, "body": "fixed", "user": { "id": 9, "login": "alice" } },
            "changes": { "body": { "from": "fixd" } }
        }),
    );

    let view: IssueCommentView = event.view().unwrap();

    assert_eq!(view.issue.number, 12);
    assert!(view.issue.is_pull_request());
    assert_eq!(view.comment.body, "fixed");
    assert_eq!(view.comment.user.as_ref().map(|u| u.login.as_str()), Some("alice"));
    assert_eq!(
        view.changes.and_then(|c| c.body).map(|b| b.from),
        Some("fixd".to_string())
    );
    assert!(event.sender().is_bot());
}

#[test]
fn test_issue_comment_view_without_changes() {
    let event = event(
        "issue_comment",
        json!({
            "action": "created",
            "issue": { "number": 1, "title": "t" },
            "comment": { "id": 2, "body": "b" }
        }),
    );

    let view = IssueCommentView::from_event(&event).unwrap();

    assert!(view.changes.is_none());
    assert!(!view.issue.is_pull_request());
}

#[test]
fn test_create_view() {
    let event = event(
        "create",
        json!({ "ref": "v1.2.0", "ref_type": "tag", "master_branch": "main" }),
    );

    let view: CreateView = event.view().unwrap();

    assert_eq!(
        view,
        CreateView {
            ref_name: "v1.2.0".to_string(),
            ref_type: RefType::Tag,
            master_branch: Some("main".to_string()),
        }
    );
}

#[test]
fn test_release_view() {
    let event = event(
        "release",
        json!({
            "action": "published",
            "release": { "id": 100, "tag_name": "v2", "prerelease": true }
        }),
    );

    let view: ReleaseView = event.view().unwrap();

    assert_eq!(view.release.tag_name, "v2");
    assert!(view.release.prerelease);
    assert!(!view.release.draft);
}

#[test]
fn test_pull_request_synchronize_view() {
    let event = event(
        "pull_request",
        json!({
            "action": "synchronize",
            "number": 8,
            "before": "aaa",
            "after": "bbb",
            "pull_request": {
                "number": 8,
                "title": "Add feature",
                "state": "open",
                "head": { "ref": "feature", "sha": "bbb" },
                "base": { "ref": "main", "sha": "ccc" }
            }
        }),
    );

    let view: PullRequestView = event.view().unwrap();

    assert_eq!(view.number, 8);
    assert_eq!(view.pull_request.head.ref_name, "feature");
    assert_eq!(view.pull_request.base.sha, "ccc");
    assert_eq!(view.before.as_deref(), Some("aaa"));
    assert_eq!(view.after.as_deref(), Some("bbb"));
}

#[test]
fn test_push_view_branch_and_tag() {
    let branch = event(
        "push",
        json!({
            "ref": "refs/heads/main",
            "before": "a",
            "after": "b",
            "commits": [{ "id": "b", "message": "Fix typo" }]
        }),
    );
    let tag = event(
        "push",
        json!({ "ref": "refs/tags/v1", "before": "a", "after": "b" }),
    );

    let branch: PushView = branch.view().unwrap();
    let tag: PushView = tag.view().unwrap();

    assert_eq!(branch.branch(), Some("main"));
    assert_eq!(branch.tag(), None);
    assert_eq!(branch.commits.len(), 1);
    assert_eq!(tag.tag(), Some("v1"));
    assert!(tag.commits.is_empty());
}

#[test]
fn test_check_run_view() {
    let event = event(
        "check_run",
        json!({
            "action": "requested_action",
            "check_run": {
                "id": 555,
                "name": "lint",
                "head_sha": "abc",
                "status": "completed",
                "conclusion": "failure"
            },
            "requested_action": { "identifier": "fix" }
        }),
    );

    let view: CheckRunView = event.view().unwrap();

    assert_eq!(view.check_run.id, dispatch::CheckRunId::new(555));
    assert_eq!(view.requested_action.as_deref(), Some("fix"));
    assert_eq!(
        event.check_run().map(|c| c.id()),
        Some(dispatch::CheckRunId::new(555))
    );
}

#[test]
fn test_ill_typed_payload_is_malformed() {
    let event = event(
        "create",
        json!({ "ref": "x", "ref_type": "branch" }),
    );

    let err = event.view::<ReleaseView>().unwrap_err();

    assert_eq!(
        err,
        MalformedRequest::MissingField {
            field: "release".to_string()
        }
    );
}

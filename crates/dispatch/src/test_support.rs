//! Shared fixtures for unit tests in this crate.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::{EventTypeId, RawHeaders, Taxonomy, TaxonomyBuilder};

pub(crate) const DELIVERY: &str = "72d3162e-cc78-11e3-81ab-4c9367dc0958";

/// Ids of the small taxonomy used throughout the tests.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ids {
    pub base: EventTypeId,
    pub issue_comment: EventTypeId,
    pub created: EventTypeId,
    pub deleted: EventTypeId,
    pub edited: EventTypeId,
    pub create: EventTypeId,
    pub create_branch: EventTypeId,
    pub create_tag: EventTypeId,
    pub push: EventTypeId,
}

pub(crate) fn taxonomy() -> (Arc<Taxonomy>, Ids) {
    let mut builder = TaxonomyBuilder::new();
    let base = builder.base();
    let issue_comment = builder
        .declare_root("IssueCommentEvent", "issue_comment", &["issue", "comment"])
        .unwrap();
    let created = builder
        .declare_action(issue_comment, "IssueCommentCreatedEvent", "created", &[])
        .unwrap();
    let deleted = builder
        .declare_action(issue_comment, "IssueCommentDeletedEvent", "deleted", &[])
        .unwrap();
    let edited = builder
        .declare_action(issue_comment, "IssueCommentEditedEvent", "edited", &["changes"])
        .unwrap();
    let create = builder
        .declare_root("CreateEvent", "create", &["ref", "ref_type"])
        .unwrap();
    let create_branch = builder
        .declare(
            create,
            "CreateBranchEvent",
            vec![crate::Criterion::body("ref_type", "branch")],
            &[],
        )
        .unwrap();
    let create_tag = builder
        .declare(
            create,
            "CreateTagEvent",
            vec![crate::Criterion::body("ref_type", "tag")],
            &[],
        )
        .unwrap();
    let push = builder.declare_root("PushEvent", "push", &[]).unwrap();

    let ids = Ids {
        base,
        issue_comment,
        created,
        deleted,
        edited,
        create,
        create_branch,
        create_tag,
        push,
    };
    (Arc::new(builder.build()), ids)
}

pub(crate) fn headers(event: &str) -> RawHeaders {
    [
        ("X-GitHub-Event", event),
        ("X-GitHub-Delivery", DELIVERY),
        ("X-GitHub-Hook-Id", "292430182"),
        ("X-GitHub-Hook-Installation-Target-Type", "integration"),
        ("X-GitHub-Hook-Installation-Target-Id", "681139"),
    ]
    .into_iter()
    .collect()
}

/// A body carrying the fields every event requires.
pub(crate) fn common_body() -> Value {
    json!({
        "installation": { "id": 1 },
        "repository": {
            "id": 10,
            "name": "repo",
            "full_name": "owner/repo",
            "private": false,
            "owner": { "id": 2, "login": "owner", "type": "User" }
        },
        "sender": { "id": 3, "login": "octocat", "type": "User" }
    })
}

/// An `issue_comment` body for `action`.
pub(crate) fn issue_comment_body(action: &str) -> Value {
    let mut body = common_body();
    body["action"] = json!(action);
    body["issue"] = json!({ "number": 7, "title": "Bug" });
    body["comment"] = json!({ "id": 99, "body": "hello" });
    body
}

//! The standard GitHub webhook event hierarchy.
//!
//! ```text
//! Event
//! ├── IssueCommentEvent            X-GitHub-Event: issue_comment
//! │   ├── IssueCommentCreatedEvent     action = created
//! │   ├── IssueCommentDeletedEvent     action = deleted
//! │   └── IssueCommentEditedEvent      action = edited
//! ├── CreateEvent                  X-GitHub-Event: create
//! │   ├── CreateBranchEvent            ref_type = branch
//! │   └── CreateTagEvent               ref_type = tag
//! ├── ReleaseEvent                 X-GitHub-Event: release
//! │   ├── ReleaseReleasedEvent         action = released
//! │   ├── ReleasePublishedEvent        action = published
//! │   └── ReleaseCreatedEvent          action = created
//! ├── PullRequestEvent             X-GitHub-Event: pull_request
//! │   ├── PullRequestOpenedEvent       action = opened
//! │   ├── PullRequestClosedEvent       action = closed
//! │   ├── PullRequestReopenedEvent     action = reopened
//! │   └── PullRequestSynchronizeEvent  action = synchronize
//! ├── PushEvent                    X-GitHub-Event: push
//! └── CheckRunEvent                X-GitHub-Event: check_run
//!     ├── CheckRunCreatedEvent         action = created
//!     ├── CheckRunCompletedEvent       action = completed
//!     ├── CheckRunRerequestedEvent     action = rerequested
//!     └── CheckRunRequestedActionEvent action = requested_action
//! ```

use std::sync::Arc;

use dispatch::{Criterion, EventTypeId, Taxonomy, TaxonomyBuilder, TaxonomyError};
use tracing::debug;

/// Ids of every event type declared by [`declare_standard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GithubEvents {
    pub issue_comment: EventTypeId,
    pub issue_comment_created: EventTypeId,
    pub issue_comment_deleted: EventTypeId,
    pub issue_comment_edited: EventTypeId,

    pub create: EventTypeId,
    pub create_branch: EventTypeId,
    pub create_tag: EventTypeId,

    pub release: EventTypeId,
    pub release_released: EventTypeId,
    pub release_published: EventTypeId,
    pub release_created: EventTypeId,

    pub pull_request: EventTypeId,
    pub pull_request_opened: EventTypeId,
    pub pull_request_closed: EventTypeId,
    pub pull_request_reopened: EventTypeId,
    pub pull_request_synchronize: EventTypeId,

    pub push: EventTypeId,

    pub check_run: EventTypeId,
    pub check_run_created: EventTypeId,
    pub check_run_completed: EventTypeId,
    pub check_run_rerequested: EventTypeId,
    pub check_run_requested_action: EventTypeId,
}

/// Declare the standard GitHub events on `builder`.
///
/// Applications that need additional event types declare them on the same
/// builder, before or after this call.
///
/// # Errors
///
/// Fails if `builder` already declares one of the standard names or an
/// identical root.
pub fn declare_standard(builder: &mut TaxonomyBuilder) -> Result<GithubEvents, TaxonomyError> {
    let issue_comment =
        builder.declare_root("IssueCommentEvent", "issue_comment", &["issue", "comment"])?;
    let issue_comment_created =
        builder.declare_action(issue_comment, "IssueCommentCreatedEvent", "created", &[])?;
    let issue_comment_deleted =
        builder.declare_action(issue_comment, "IssueCommentDeletedEvent", "deleted", &[])?;
    let issue_comment_edited = builder.declare_action(
        issue_comment,
        "IssueCommentEditedEvent",
        "edited",
        &["changes"],
    )?;

    let create = builder.declare_root("CreateEvent", "create", &["ref", "ref_type"])?;
    let create_branch = builder.declare(
        create,
        "CreateBranchEvent",
        vec![Criterion::body("ref_type", "branch")],
        &[],
    )?;
    let create_tag = builder.declare(
        create,
        "CreateTagEvent",
        vec![Criterion::body("ref_type", "tag")],
        &[],
    )?;

    let release = builder.declare_root("ReleaseEvent", "release", &["release"])?;
    let release_released =
        builder.declare_action(release, "ReleaseReleasedEvent", "released", &[])?;
    let release_published =
        builder.declare_action(release, "ReleasePublishedEvent", "published", &[])?;
    let release_created = builder.declare_action(release, "ReleaseCreatedEvent", "created", &[])?;

    let pull_request =
        builder.declare_root("PullRequestEvent", "pull_request", &["number", "pull_request"])?;
    let pull_request_opened =
        builder.declare_action(pull_request, "PullRequestOpenedEvent", "opened", &[])?;
    let pull_request_closed =
        builder.declare_action(pull_request, "PullRequestClosedEvent", "closed", &[])?;
    let pull_request_reopened =
        builder.declare_action(pull_request, "PullRequestReopenedEvent", "reopened", &[])?;
    let pull_request_synchronize = builder.declare_action(
        pull_request,
        "PullRequestSynchronizeEvent",
        "synchronize",
        &["before", "after"],
    )?;

    let push = builder.declare_root("PushEvent", "push", &["ref", "before", "after"])?;

    let check_run = builder.declare_root("CheckRunEvent", "check_run", &["check_run"])?;
    let check_run_created =
        builder.declare_action(check_run, "CheckRunCreatedEvent", "created", &[])?;
    let check_run_completed =
        builder.declare_action(check_run, "CheckRunCompletedEvent", "completed", &[])?;
    let check_run_rerequested =
        builder.declare_action(check_run, "CheckRunRerequestedEvent", "rerequested", &[])?;
    let check_run_requested_action = builder.declare_action(
        check_run,
        "CheckRunRequestedActionEvent",
        "requested_action",
        &["requested_action"],
    )?;

    debug!("Declared standard GitHub event types");
    Ok(GithubEvents {
        issue_comment,
        issue_comment_created,
        issue_comment_deleted,
        issue_comment_edited,
        create,
        create_branch,
        create_tag,
        release,
        release_released,
        release_published,
        release_created,
        pull_request,
        pull_request_opened,
        pull_request_closed,
        pull_request_reopened,
        pull_request_synchronize,
        push,
        check_run,
        check_run_created,
        check_run_completed,
        check_run_rerequested,
        check_run_requested_action,
    })
}

/// A frozen taxonomy holding exactly the standard GitHub events.
#[derive(Debug, Clone)]
pub struct EventCatalogue {
    taxonomy: Arc<Taxonomy>,
    events: GithubEvents,
}

impl EventCatalogue {
    /// Build the catalogue of standard events.
    pub fn standard() -> Result<Self, TaxonomyError> {
        let mut builder = TaxonomyBuilder::new();
        let events = declare_standard(&mut builder)?;
        Ok(Self {
            taxonomy: Arc::new(builder.build()),
            events,
        })
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    pub fn events(&self) -> &GithubEvents {
        &self.events
    }
}

#[cfg(test)]
#[path = "catalogue_tests.rs"]
mod tests;

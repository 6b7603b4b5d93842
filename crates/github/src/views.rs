//! Typed views of dispatched events.
//!
//! A view gathers the type-specific payload of one event family into a
//! struct. The required fields a view reads are the same ones the catalogue
//! declares for that family, so for events resolved through
//! [`crate::EventCatalogue`] extraction only fails on ill-typed payloads.

use dispatch::{Event, MalformedRequest};

use crate::{
    CheckRun, CommentChanges, Issue, IssueComment, PullRequest, PushCommit, RefType, Release,
};

/// Extraction of a typed view from an [`Event`].
pub trait FromEvent: Sized {
    /// # Errors
    ///
    /// [`MalformedRequest`] naming the first missing or ill-typed field.
    fn from_event(event: &Event) -> Result<Self, MalformedRequest>;
}

/// `event.view::<T>()` sugar over [`FromEvent`].
pub trait EventExt {
    fn view<T: FromEvent>(&self) -> Result<T, MalformedRequest>;
}

impl EventExt for Event {
    fn view<T: FromEvent>(&self) -> Result<T, MalformedRequest> {
        T::from_event(self)
    }
}

/// `issue_comment` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCommentView {
    pub issue: Issue,
    pub comment: IssueComment,
    /// Only present on `edited`.
    pub changes: Option<CommentChanges>,
}

impl FromEvent for IssueCommentView {
    fn from_event(event: &Event) -> Result<Self, MalformedRequest> {
        Ok(Self {
            issue: event.parse_field("issue")?,
            comment: event.parse_field("comment")?,
            changes: event.parse_optional_field("changes")?,
        })
    }
}

/// `create` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateView {
    pub ref_name: String,
    pub ref_type: RefType,
    pub master_branch: Option<String>,
}

impl FromEvent for CreateView {
    fn from_event(event: &Event) -> Result<Self, MalformedRequest> {
        Ok(Self {
            ref_name: event.parse_field("ref")?,
            ref_type: event.parse_field("ref_type")?,
            master_branch: event.parse_optional_field("master_branch")?,
        })
    }
}

/// `release` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseView {
    pub release: Release,
}

impl FromEvent for ReleaseView {
    fn from_event(event: &Event) -> Result<Self, MalformedRequest> {
        Ok(Self {
            release: event.parse_field("release")?,
        })
    }
}

/// `pull_request` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestView {
    pub number: u64,
    pub pull_request: PullRequest,
    /// Previous head commit; only present on `synchronize`.
    pub before: Option<String>,
    /// New head commit; only present on `synchronize`.
    pub after: Option<String>,
}

impl FromEvent for PullRequestView {
    fn from_event(event: &Event) -> Result<Self, MalformedRequest> {
        Ok(Self {
            number: event.parse_field("number")?,
            pull_request: event.parse_field("pull_request")?,
            before: event.parse_optional_field("before")?,
            after: event.parse_optional_field("after")?,
        })
    }
}

/// `push` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushView {
    pub ref_name: String,
    pub before: String,
    pub after: String,
    pub commits: Vec<PushCommit>,
}

impl PushView {
    /// Branch name for pushes to `refs/heads/*`.
    pub fn branch(&self) -> Option<&str> {
        self.ref_name.strip_prefix("refs/heads/")
    }

    /// Tag name for pushes to `refs/tags/*`.
    pub fn tag(&self) -> Option<&str> {
        self.ref_name.strip_prefix("refs/tags/")
    }
}

impl FromEvent for PushView {
    fn from_event(event: &Event) -> Result<Self, MalformedRequest> {
        Ok(Self {
            ref_name: event.parse_field("ref")?,
            before: event.parse_field("before")?,
            after: event.parse_field("after")?,
            commits: event.parse_optional_field("commits")?.unwrap_or_default(),
        })
    }
}

/// `check_run` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRunView {
    pub check_run: CheckRun,
    /// The button identifier for `requested_action`.
    pub requested_action: Option<String>,
}

impl FromEvent for CheckRunView {
    fn from_event(event: &Event) -> Result<Self, MalformedRequest> {
        Ok(Self {
            check_run: event.parse_field("check_run")?,
            requested_action: event.parse_optional_field("requested_action.identifier")?,
        })
    }
}

#[cfg(test)]
#[path = "views_tests.rs"]
mod tests;

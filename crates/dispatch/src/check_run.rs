//! Check-run port.
//!
//! A check run is GitHub's per-commit status report. An [`crate::Event`] may
//! carry a [`CheckRunRef`]; when a handler fails, the dispatcher marks that
//! check run as failed through a [`CheckRunReporter`]. The reporter is
//! implemented outside this crate on top of whatever GitHub API client the
//! host application uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{taxonomy::resolve_json_path, CheckRunId};

/// A reference to a check run the event is associated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunRef {
    id: CheckRunId,
    name: Option<String>,
    head_sha: Option<String>,
}

impl CheckRunRef {
    pub fn new(id: CheckRunId) -> Self {
        Self {
            id,
            name: None,
            head_sha: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_head_sha(mut self, head_sha: impl Into<String>) -> Self {
        self.head_sha = Some(head_sha.into());
        self
    }

    pub fn id(&self) -> CheckRunId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn head_sha(&self) -> Option<&str> {
        self.head_sha.as_deref()
    }

    /// Derive a reference from the payload's `check_run` object, if any.
    ///
    /// Only local payload data is used; nothing is fetched.
    pub(crate) fn from_payload(body: &Value) -> Option<Self> {
        let id = resolve_json_path(body, "check_run.id")?.as_u64()?;
        let mut check_run = Self::new(CheckRunId::new(id));
        if let Some(name) = resolve_json_path(body, "check_run.name").and_then(Value::as_str) {
            check_run = check_run.with_name(name);
        }
        if let Some(sha) = resolve_json_path(body, "check_run.head_sha").and_then(Value::as_str) {
            check_run = check_run.with_head_sha(sha);
        }
        Some(check_run)
    }
}

/// Final state of a completed check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
}

impl CheckRunConclusion {
    /// The value GitHub expects in the `conclusion` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Neutral => "neutral",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed_out",
            Self::ActionRequired => "action_required",
        }
    }
}

impl std::fmt::Display for CheckRunConclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The change to apply to a check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRunUpdate {
    pub conclusion: CheckRunConclusion,
    pub title: Option<String>,
    pub summary: Option<String>,
    /// Long-form report body (Markdown).
    pub text: Option<String>,
}

impl CheckRunUpdate {
    pub fn new(conclusion: CheckRunConclusion) -> Self {
        Self {
            conclusion,
            title: None,
            summary: None,
            text: None,
        }
    }

    /// A `failure` conclusion carrying `text` as the report body.
    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            title: Some("Webhook handler failed".to_string()),
            summary: Some("An error occurred while processing this event.".to_string()),
            text: Some(text.into()),
            ..Self::new(CheckRunConclusion::Failure)
        }
    }
}

/// Failure to update a check run.
#[derive(Debug, Error)]
pub enum CheckRunError {
    #[error("Check run {id} could not be updated: {message}")]
    UpdateFailed { id: CheckRunId, message: String },
}

/// Applies updates to check runs on the hosting platform.
///
/// Implementations perform whatever network I/O is needed; they are called
/// synchronously from the dispatching thread.
pub trait CheckRunReporter: Send + Sync {
    fn update(&self, check_run: &CheckRunRef, update: &CheckRunUpdate) -> Result<(), CheckRunError>;
}

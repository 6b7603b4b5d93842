//! Hookwise GitHub event catalogue.
//!
//! Declares the standard GitHub webhook events on top of the generic
//! [`dispatch`] taxonomy and provides typed views of their payloads.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`catalogue`] | [`declare_standard`] and the ready-made [`EventCatalogue`] |
//! | [`payloads`] | Serde models of payload objects (`Issue`, `PullRequest`, etc.) |
//! | [`views`] | [`FromEvent`] extraction of typed views from a dispatched [`dispatch::Event`] |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use dispatch::{Dispatcher, HandlerRegistryBuilder};
//! use github::{EventCatalogue, EventExt, IssueCommentView};
//!
//! let catalogue = EventCatalogue::standard().unwrap();
//! let mut registry = HandlerRegistryBuilder::new(Arc::clone(catalogue.taxonomy()));
//! registry
//!     .register_fn(catalogue.events().issue_comment_created, "greet", |event| {
//!         let view: IssueCommentView = event.view()?;
//!         tracing::info!(issue = view.issue.number, "New comment");
//!         Ok(())
//!     })
//!     .unwrap();
//! let dispatcher = Dispatcher::new(Arc::new(registry.seal()));
//! # let _ = dispatcher;
//! ```

pub mod catalogue;
pub mod payloads;
pub mod views;

pub use catalogue::{declare_standard, EventCatalogue, GithubEvents};
pub use payloads::{
    ChangedValue, CheckRun, CommentChanges, GitRef, Issue, IssueComment, PullRequest,
    PushCommit, RefType, Release,
};
pub use views::{
    CheckRunView, CreateView, EventExt, FromEvent, IssueCommentView, PullRequestView, PushView,
    ReleaseView,
};

//! Core webhook dispatch domain for Hookwise.
//!
//! This crate classifies each GitHub webhook delivery into the most specific
//! event type of a static hierarchy and runs the handlers registered for it.
//! It performs no network I/O: talking to GitHub is left to implementations
//! of the [`CheckRunReporter`] and [`CredentialProvider`] ports.
//!
//! ## Lifecycle
//!
//! 1. Declare the event hierarchy with a [`TaxonomyBuilder`] and freeze it into
//!    a [`Taxonomy`].
//! 2. Register handlers on a [`HandlerRegistryBuilder`]. Registering against a
//!    non-leaf event type registers on every leaf below it.
//! 3. [`HandlerRegistryBuilder::seal`] the registry and wrap it in a
//!    [`Dispatcher`].
//! 4. Call [`Dispatcher::dispatch`] once per delivery.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`InstallationId`, `DeliveryId`, `EventTypeId`, etc.) |
//! | [`types`] | Shared value types (`User`, `Repository`, `Timestamp`) |
//! | [`errors`] | Request, resolution, registration, handler, and dispatch errors |
//! | [`headers`] | Case-insensitive header map and the parsed delivery headers |
//! | [`taxonomy`] | The event type tree and its identifying criteria |
//! | [`resolver`] | Delivery to event type resolution |
//! | [`event`] | The per-delivery [`Event`] handed to handlers |
//! | [`handlers`] | The [`Handler`] trait and the handler registry |
//! | [`dispatcher`] | The dispatch loop |
//! | [`check_run`] | Check-run references and the failure reporting port |
//! | [`credentials`] | Credential selection and the credential port |
//! | [`config`] | Hierarchical configuration values |

pub mod check_run;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod errors;
pub mod event;
pub mod handlers;
pub mod headers;
pub mod identifiers;
pub mod resolver;
pub mod taxonomy;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use check_run::{
    CheckRunConclusion, CheckRunError, CheckRunRef, CheckRunReporter, CheckRunUpdate,
};
pub use config::{ConfigError, ConfigNode, ConfigValue};
pub use credentials::{
    Credential, CredentialError, CredentialProvider, EnvCredentialProvider,
    DEFAULT_PRIVATE_KEY_PATH,
};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use errors::{
    DispatchError, HandlerError, MalformedRequest, RegistrationError, ResolutionError,
    SignatureError,
};
pub use event::Event;
pub use handlers::{
    handler_fn, FnHandler, Handler, HandlerRegistry, HandlerRegistryBuilder, HandlerSignature,
};
pub use headers::{DeliveryHeaders, RawHeaders};
pub use identifiers::{
    CheckRunId, DeliveryId, EventName, EventTypeId, HookId, InstallationId,
    InstallationTargetId, RepositoryId, UserId,
};
pub use taxonomy::{
    Criterion, CriterionSource, EventTypeDef, Taxonomy, TaxonomyBuilder, TaxonomyError,
    BASE_EVENT_NAME,
};
pub use types::{Repository, Timestamp, User, UserType};

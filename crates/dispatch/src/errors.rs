//! Error taxonomy for resolution, construction, registration, and dispatch.
//!
//! Each stage fails with its own type so callers can tell a bad request from
//! a failing handler:
//!
//! | Error | Raised by | Meaning |
//! |-------|-----------|---------|
//! | [`MalformedRequest`] | resolver, event construction | A required header or body field is missing or unparseable |
//! | [`ResolutionError::UnknownEvent`] | resolver | The event-name header matches no declared event type |
//! | [`SignatureError`] | handler registration | A handler does not take exactly one event argument |
//! | [`HandlerError`] | dispatcher | A handler returned an error or panicked |
//!
//! [`DispatchError`] aggregates everything that [`crate::Dispatcher::dispatch`]
//! can return. [`DispatchError::is_client_error`] gives the HTTP layer the
//! distinction between "the request was bad" and "we failed to process it".

use thiserror::Error;

use crate::{CredentialError, EventTypeId};

// ---------------------------------------------------------------------------
// Request errors
// ---------------------------------------------------------------------------

/// A required header or body field is missing or cannot be parsed.
///
/// Produced before any handler runs; no partial processing happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRequest {
    #[error("Required header '{header}' is missing or empty")]
    MissingHeader { header: String },

    #[error("Header '{header}' has invalid format: {message}")]
    InvalidHeader { header: String, message: String },

    #[error("Required body field '{field}' is missing")]
    MissingField { field: String },

    #[error("Body field '{field}' has invalid format: {message}")]
    InvalidField { field: String, message: String },

    #[error("Request body is not a JSON object: {message}")]
    InvalidBody { message: String },
}

/// Failure to map a delivery onto a declared event type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error(transparent)]
    Malformed(#[from] MalformedRequest),

    /// The event-name header is present but no root event type declares it.
    #[error("No event type is declared for GitHub event '{event}'")]
    UnknownEvent { event: String },
}

// ---------------------------------------------------------------------------
// Registration errors
// ---------------------------------------------------------------------------

/// A handler was registered with a parameter list other than a single event.
///
/// Raised at registration time, before any delivery is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Handler {handler}({}) signature error. The handler must accept only one argument of the Event type",
    .parameters.join(", ")
)]
pub struct SignatureError {
    pub handler: String,
    pub parameters: Vec<String>,
}

/// Errors from [`crate::HandlerRegistryBuilder::register`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// The id was not produced by the registry's taxonomy.
    #[error("Event type {id} is not declared in this taxonomy")]
    UnknownEventType { id: EventTypeId },
}

// ---------------------------------------------------------------------------
// Handler errors
// ---------------------------------------------------------------------------

/// A handler failed while processing an event.
///
/// Wraps whatever the handler returned (or a description of its panic). The
/// remaining handlers for the same delivery were not invoked.
#[derive(Debug, Error)]
#[error("Handler '{handler}' failed: {source}")]
pub struct HandlerError {
    pub handler: String,
    #[source]
    pub source: anyhow::Error,
}

impl HandlerError {
    pub fn new(handler: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            handler: handler.into(),
            source,
        }
    }

    /// Full textual trace of the failure, including the chain of causes.
    ///
    /// This is the text attached to a failed check run.
    pub fn trace(&self) -> String {
        format!("Handler '{}' failed\n\n{:?}", self.handler, self.source)
    }
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Everything [`crate::Dispatcher::dispatch`] can fail with.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Malformed(#[from] MalformedRequest),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// Returns `true` when the delivery itself was at fault.
    ///
    /// Malformed requests and unknown events are client errors; credential and
    /// handler failures are server errors.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Resolution(_) | Self::Malformed(_))
    }

    /// Returns `true` if the event-name header matched no declared event type.
    pub fn is_unknown_event(&self) -> bool {
        matches!(self, Self::Resolution(ResolutionError::UnknownEvent { .. }))
    }

    /// Returns `true` if a required header or body field was missing or invalid.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Malformed(_) | Self::Resolution(ResolutionError::Malformed(_))
        )
    }
}

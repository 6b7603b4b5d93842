//! Handler registration.
//!
//! Registration has two phases. At startup a [`HandlerRegistryBuilder`]
//! collects every `register` call; [`HandlerRegistryBuilder::seal`] then turns
//! it into an immutable [`HandlerRegistry`] that the dispatcher reads without
//! locking.
//!
//! Handlers are stored against *leaf* event types only. Registering against a
//! non-leaf type registers the handler on every leaf below it, so a handler on
//! `IssueCommentEvent` runs for `created`, `deleted`, and `edited` alike, and a
//! handler on the base `Event` runs for everything.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::{Event, EventTypeId, RegistrationError, SignatureError, Taxonomy};

// ============================================================================
// Handler
// ============================================================================

/// The parameter list a handler declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSignature {
    parameters: Vec<String>,
}

impl HandlerSignature {
    pub fn new<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// The only valid signature: a single event parameter.
    pub fn single_event() -> Self {
        Self::new(["event"])
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// Something that processes events.
///
/// Handlers run synchronously on the dispatching thread. Returning an error
/// (or panicking) stops the remaining handlers for the same delivery.
pub trait Handler: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    /// The declared parameter list, validated at registration.
    ///
    /// Native handlers keep the default. Adapters that wrap handlers defined
    /// elsewhere (scripts, plugins) report the foreign parameter list so a
    /// mismatch is caught before any traffic is processed.
    fn signature(&self) -> HandlerSignature {
        HandlerSignature::single_event()
    }

    fn handle(&self, event: &mut Event) -> anyhow::Result<()>;
}

/// A [`Handler`] backed by a closure.
pub struct FnHandler<F> {
    name: String,
    signature: HandlerSignature,
    f: F,
}

impl<F> FnHandler<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Event) -> anyhow::Result<()> + Send + Sync,
    {
        Self::with_signature(name, HandlerSignature::single_event(), f)
    }

    /// A closure handler reporting a foreign parameter list.
    pub fn with_signature(name: impl Into<String>, signature: HandlerSignature, f: F) -> Self
    where
        F: Fn(&mut Event) -> anyhow::Result<()> + Send + Sync,
    {
        Self {
            name: name.into(),
            signature,
            f,
        }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut Event) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> HandlerSignature {
        self.signature.clone()
    }

    fn handle(&self, event: &mut Event) -> anyhow::Result<()> {
        (self.f)(event)
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Wrap a closure as a shareable handler.
pub fn handler_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Handler>
where
    F: Fn(&mut Event) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(FnHandler::new(name, f))
}

fn validate_signature(handler: &dyn Handler) -> Result<(), SignatureError> {
    let signature = handler.signature();
    if signature.arity() != 1 {
        return Err(SignatureError {
            handler: handler.name().to_string(),
            parameters: signature.parameters().to_vec(),
        });
    }
    Ok(())
}

// ============================================================================
// Registry
// ============================================================================

type HandlerTable = HashMap<EventTypeId, Vec<Arc<dyn Handler>>>;

/// Collects handler registrations before dispatching starts.
pub struct HandlerRegistryBuilder {
    taxonomy: Arc<Taxonomy>,
    handlers: HandlerTable,
}

impl HandlerRegistryBuilder {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            taxonomy,
            handlers: HashMap::new(),
        }
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Register `handler` for `event_type` and every leaf below it.
    ///
    /// Each affected leaf appends the handler to the end of its list, so each
    /// leaf's handlers run in the order their registrations were made.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Signature`] if the handler does not take exactly
    ///   one parameter; nothing is registered
    /// - [`RegistrationError::UnknownEventType`] if `event_type` is foreign
    pub fn register(
        &mut self,
        event_type: EventTypeId,
        handler: Arc<dyn Handler>,
    ) -> Result<&mut Self, RegistrationError> {
        if !self.taxonomy.contains(event_type) {
            return Err(RegistrationError::UnknownEventType { id: event_type });
        }
        validate_signature(handler.as_ref())?;

        let leaves = self.taxonomy.leaf_descendants(event_type);
        debug!(
            handler = handler.name(),
            event_type = self.taxonomy.node(event_type).name(),
            leaves = leaves.len(),
            "Registering handler"
        );
        for leaf in leaves {
            self.handlers
                .entry(leaf)
                .or_default()
                .push(Arc::clone(&handler));
        }
        Ok(self)
    }

    /// Register a closure. See [`HandlerRegistryBuilder::register`].
    pub fn register_fn<F>(
        &mut self,
        event_type: EventTypeId,
        name: impl Into<String>,
        f: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&mut Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(event_type, handler_fn(name, f))
    }

    /// End the registration phase.
    pub fn seal(self) -> HandlerRegistry {
        HandlerRegistry {
            taxonomy: self.taxonomy,
            handlers: self.handlers,
        }
    }
}

/// Immutable mapping from leaf event type to its ordered handlers.
pub struct HandlerRegistry {
    taxonomy: Arc<Taxonomy>,
    handlers: HandlerTable,
}

impl HandlerRegistry {
    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Handlers for `event_type` in registration order.
    ///
    /// Empty when nothing was registered, and always empty for non-leaf types.
    pub fn lookup(&self, event_type: EventTypeId) -> &[Arc<dyn Handler>] {
        self.handlers
            .get(&event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of (leaf, handler) entries.
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<(&str, Vec<&str>)> = self
            .handlers
            .iter()
            .map(|(id, handlers)| {
                (
                    self.taxonomy.node(*id).name(),
                    handlers.iter().map(|h| h.name()).collect(),
                )
            })
            .collect();
        entries.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &entries)
            .finish()
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

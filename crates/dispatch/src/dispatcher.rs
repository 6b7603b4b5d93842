//! The dispatch loop.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    resolver, CheckRunReporter, CheckRunUpdate, CredentialProvider, DeliveryId, DispatchError,
    Event, EventTypeId, Handler, HandlerError, HandlerRegistry, RawHeaders, ResolutionError,
};

/// Summary of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub event_type: EventTypeId,
    pub type_name: String,
    pub delivery_id: DeliveryId,
    /// Number of handlers that ran; zero when none were registered.
    pub handlers_invoked: usize,
}

/// Resolves deliveries and runs their handlers.
///
/// `Dispatcher` is immutable once built and may be shared between threads;
/// each [`Dispatcher::dispatch`] call processes one delivery on the calling
/// thread.
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    check_runs: Option<Arc<dyn CheckRunReporter>>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            credentials: None,
            check_runs: None,
        }
    }

    /// Bind a credential from `provider` to every event before handlers run.
    pub fn with_credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Report handler failures on the event's check run through `reporter`.
    pub fn with_check_run_reporter(mut self, reporter: Arc<dyn CheckRunReporter>) -> Self {
        self.check_runs = Some(reporter);
        self
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Resolve a delivery without running anything.
    pub fn resolve(
        &self,
        headers: &RawHeaders,
        body: &Value,
    ) -> Result<EventTypeId, ResolutionError> {
        resolver::resolve(self.registry.taxonomy(), headers, body)
    }

    /// Process one delivery.
    ///
    /// 1. Resolve the event type.
    /// 2. Build the [`Event`], failing on any missing required field.
    /// 3. Bind a credential if a provider is configured.
    /// 4. Run the handlers registered for the resolved type, in order.
    ///
    /// The first handler that fails (returns an error or panics) stops the
    /// loop. If the event has a check run bound at that point and a reporter is
    /// configured, the check run is marked failed with the error trace before
    /// the error is returned. A failure to report is logged and does not
    /// replace the handler error.
    ///
    /// A delivery resolving to a type with no handlers succeeds with
    /// `handlers_invoked == 0`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Resolution`] / [`DispatchError::Malformed`] before any handler runs
    /// - [`DispatchError::Credential`] if the provider fails
    /// - [`DispatchError::Handler`] if a handler fails
    #[instrument(
        name = "dispatch",
        skip_all,
        fields(
            event = tracing::field::Empty,
            event_type = tracing::field::Empty,
            delivery_id = tracing::field::Empty,
        )
    )]
    pub fn dispatch(
        &self,
        headers: &RawHeaders,
        body: Value,
    ) -> Result<DispatchOutcome, DispatchError> {
        let taxonomy = self.registry.taxonomy();
        let event_type = resolver::resolve(taxonomy, headers, &body)?;
        let mut event = Event::from_delivery(taxonomy, event_type, headers, body)?;

        let span = tracing::Span::current();
        span.record("event", event.name().as_str());
        span.record("event_type", event.type_name());
        span.record("delivery_id", tracing::field::display(event.delivery().delivery_id()));

        if let Some(provider) = &self.credentials {
            let credential = provider
                .credential(event.delivery().installation_target_id(), event.installation_id())?;
            event.bind_credential(credential);
        }

        let handlers = self.registry.lookup(event_type);
        if handlers.is_empty() {
            debug!("No handlers registered for event type");
        }

        for handler in handlers {
            debug!(handler = handler.name(), "Invoking handler");
            if let Err(source) = invoke(handler.as_ref(), &mut event) {
                let error = HandlerError::new(handler.name(), source);
                warn!(handler = handler.name(), error = %error.source, "Handler failed");
                self.report_failure(&event, &error);
                return Err(error.into());
            }
        }

        info!(handlers = handlers.len(), "Delivery dispatched");
        Ok(DispatchOutcome {
            event_type,
            type_name: event.type_name().to_string(),
            delivery_id: event.delivery().delivery_id(),
            handlers_invoked: handlers.len(),
        })
    }

    fn report_failure(&self, event: &Event, error: &HandlerError) {
        let Some(check_run) = event.check_run() else {
            return;
        };
        let Some(reporter) = &self.check_runs else {
            warn!(
                check_run = %check_run.id(),
                "Event has a check run but no reporter is configured; failure not reported"
            );
            return;
        };

        let update = CheckRunUpdate::failure(error.trace());
        match reporter.update(check_run, &update) {
            Ok(()) => debug!(check_run = %check_run.id(), "Check run marked as failed"),
            Err(report_error) => warn!(
                check_run = %check_run.id(),
                error = %report_error,
                "Failed to mark check run as failed"
            ),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("credentials", &self.credentials.is_some())
            .field("check_runs", &self.check_runs.is_some())
            .finish()
    }
}

/// Run a handler, converting a panic into an error.
fn invoke(handler: &dyn Handler, event: &mut Event) -> anyhow::Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!(
            "handler panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

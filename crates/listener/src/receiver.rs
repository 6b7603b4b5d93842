//! Webhook delivery endpoint.

use std::sync::Arc;

use dispatch::{DispatchError, Dispatcher, MalformedRequest, RawHeaders};
use http::StatusCode;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

/// Body returned for every accepted delivery.
pub const OK_BODY: &str = "OK";

/// Status and body to send back to GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: StatusCode,
    pub body: String,
}

impl WebhookResponse {
    pub fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            body: OK_BODY.to_string(),
        }
    }

    /// A JSON error body of the form `{"error": ..., "status": ...}`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let body = serde_json::json!({
            "error": message.into(),
            "status": status.as_u16(),
        });
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Maps a dispatch failure onto the HTTP status reported to GitHub.
///
/// | Error | Status |
/// |-------|--------|
/// | Malformed request, unknown event | `400 Bad Request` |
/// | Credential lookup, handler failure | `500 Internal Server Error` |
pub fn status_for(error: &DispatchError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Receives webhook deliveries and runs them through a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct WebhookReceiver {
    dispatcher: Arc<Dispatcher>,
}

impl WebhookReceiver {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Process one delivery.
    ///
    /// Client errors echo the error message back to the sender. Server errors
    /// are logged in full and answered with a generic message.
    #[instrument(skip_all, fields(body_len = body.len()))]
    pub fn receive(&self, headers: &RawHeaders, body: &[u8]) -> WebhookResponse {
        let result = parse_body(body).and_then(|payload| self.dispatcher.dispatch(headers, payload));

        match result {
            Ok(outcome) => {
                info!(
                    event_type = %outcome.type_name,
                    delivery_id = %outcome.delivery_id,
                    handlers = outcome.handlers_invoked,
                    "Webhook processed"
                );
                WebhookResponse::ok()
            }
            Err(err) => {
                let status = status_for(&err);
                if err.is_client_error() {
                    warn!(error = %err, "Rejected webhook delivery");
                    WebhookResponse::error(status, err.to_string())
                } else {
                    error!(error = %err, "Webhook processing failed");
                    WebhookResponse::error(status, "Webhook processing failed")
                }
            }
        }
    }
}

fn parse_body(body: &[u8]) -> Result<Value, DispatchError> {
    serde_json::from_slice(body).map_err(|e| {
        DispatchError::Malformed(MalformedRequest::InvalidBody {
            message: e.to_string(),
        })
    })
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod tests;

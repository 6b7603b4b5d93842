//! Per-delivery event instances.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    taxonomy::resolve_json_path, CheckRunRef, Credential, DeliveryHeaders, EventName,
    EventTypeId, InstallationId, MalformedRequest, RawHeaders, Repository, Taxonomy, Timestamp,
    User,
};

/// A delivery bound to its resolved event type.
///
/// Built once per [`crate::Dispatcher::dispatch`] call and handed to each
/// handler in turn as `&mut Event`. Every field a handler can rely on has been
/// checked at construction time: the common fields below, plus every body
/// field the event type (and its ancestors) declares as required.
#[derive(Debug, Clone)]
pub struct Event {
    event_type: EventTypeId,
    type_name: String,
    delivery: DeliveryHeaders,
    action: Option<String>,
    installation_id: InstallationId,
    repository: Repository,
    sender: User,
    check_run: Option<CheckRunRef>,
    credential: Option<Credential>,
    payload: Value,
    received_at: Timestamp,
}

impl Event {
    /// Build the event for a delivery already resolved to `event_type`.
    ///
    /// # Errors
    ///
    /// [`MalformedRequest`] naming the first absent or ill-typed header or body
    /// field. No field is defaulted.
    ///
    /// # Panics
    ///
    /// Panics if `event_type` was not produced by `taxonomy`.
    pub fn from_delivery(
        taxonomy: &Taxonomy,
        event_type: EventTypeId,
        headers: &RawHeaders,
        payload: Value,
    ) -> Result<Self, MalformedRequest> {
        if !payload.is_object() {
            return Err(MalformedRequest::InvalidBody {
                message: format!("expected an object, found {}", json_kind(&payload)),
            });
        }

        let delivery = DeliveryHeaders::from_raw(headers)?;

        let installation_id = required(&payload, "installation.id")?
            .as_u64()
            .map(InstallationId::new)
            .ok_or_else(|| MalformedRequest::InvalidField {
                field: "installation.id".to_string(),
                message: "expected an unsigned integer".to_string(),
            })?;
        let repository: Repository = parse(&payload, "repository")?;
        let sender: User = parse(&payload, "sender")?;

        for field in taxonomy.effective_required_fields(event_type) {
            required(&payload, &field)?;
        }

        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_string);
        let check_run = CheckRunRef::from_payload(&payload);

        Ok(Self {
            event_type,
            type_name: taxonomy.node(event_type).name().to_string(),
            delivery,
            action,
            installation_id,
            repository,
            sender,
            check_run,
            credential: None,
            payload,
            received_at: Timestamp::now(),
        })
    }

    pub fn event_type(&self) -> EventTypeId {
        self.event_type
    }

    /// Name of the resolved event type, e.g. `"IssueCommentCreatedEvent"`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The GitHub event name from the `X-GitHub-Event` header.
    pub fn name(&self) -> &EventName {
        self.delivery.event()
    }

    pub fn delivery(&self) -> &DeliveryHeaders {
        &self.delivery
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn installation_id(&self) -> InstallationId {
        self.installation_id
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn sender(&self) -> &User {
        &self.sender
    }

    pub fn received_at(&self) -> Timestamp {
        self.received_at
    }

    /// The check run that will be marked failed if a handler fails.
    pub fn check_run(&self) -> Option<&CheckRunRef> {
        self.check_run.as_ref()
    }

    /// Associate a check run with this event, replacing any previous one.
    ///
    /// Handlers that create a check run at the start of their work bind it here
    /// so a later failure is reported on it.
    pub fn bind_check_run(&mut self, check_run: CheckRunRef) {
        self.check_run = Some(check_run);
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn bind_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    /// The full JSON body.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The body value at a dot-separated `path`, if present.
    pub fn field(&self, path: &str) -> Option<&Value> {
        resolve_json_path(&self.payload, path)
    }

    /// Deserialise the body value at `path`.
    ///
    /// # Errors
    ///
    /// [`MalformedRequest::MissingField`] if absent,
    /// [`MalformedRequest::InvalidField`] if it does not deserialise into `T`.
    pub fn parse_field<T: DeserializeOwned>(&self, path: &str) -> Result<T, MalformedRequest> {
        parse(&self.payload, path)
    }

    /// Like [`Event::parse_field`], but an absent or `null` value yields `None`.
    pub fn parse_optional_field<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, MalformedRequest> {
        match self.field(path) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => parse(&self.payload, path).map(Some),
        }
    }
}

fn required<'a>(payload: &'a Value, path: &str) -> Result<&'a Value, MalformedRequest> {
    match resolve_json_path(payload, path) {
        Some(Value::Null) | None => Err(MalformedRequest::MissingField {
            field: path.to_string(),
        }),
        Some(value) => Ok(value),
    }
}

fn parse<T: DeserializeOwned>(payload: &Value, path: &str) -> Result<T, MalformedRequest> {
    let value = required(payload, path)?;
    T::deserialize(value).map_err(|e| MalformedRequest::InvalidField {
        field: path.to_string(),
        message: e.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

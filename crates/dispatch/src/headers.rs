//! Webhook delivery headers.
//!
//! [`RawHeaders`] is the case-insensitive header map handed over by the HTTP
//! layer. [`DeliveryHeaders`] is the validated view of the GitHub-specific
//! headers every event carries.

use std::collections::{BTreeMap, HashMap};

use crate::{DeliveryId, EventName, HookId, InstallationTargetId, MalformedRequest};

/// Name of the event (e.g. `issue_comment`).
pub const EVENT_HEADER: &str = "X-GitHub-Event";
/// Per-delivery GUID.
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";
/// Webhook configuration id.
pub const HOOK_ID_HEADER: &str = "X-GitHub-Hook-Id";
/// Kind of resource the webhook was created on (`integration`, `repository`, ...).
pub const TARGET_TYPE_HEADER: &str = "X-GitHub-Hook-Installation-Target-Type";
/// Id of the resource the webhook was created on (the App id for App hooks).
pub const TARGET_ID_HEADER: &str = "X-GitHub-Hook-Installation-Target-Id";

// ============================================================================
// RawHeaders
// ============================================================================

/// HTTP request headers with case-insensitive lookup.
///
/// Names are stored lowercased. When the same name is inserted twice the last
/// value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeaders {
    entries: BTreeMap<String, String>,
}

impl RawHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Look up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(lowercased name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn required(&self, name: &str) -> Result<&str, MalformedRequest> {
        match self.get(name).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(MalformedRequest::MissingHeader {
                header: name.to_string(),
            }),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RawHeaders
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl From<HashMap<String, String>> for RawHeaders {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

/// Read the event name from the `X-GitHub-Event` header.
///
/// # Errors
///
/// [`MalformedRequest::MissingHeader`] when the header is absent or blank.
pub fn event_name(headers: &RawHeaders) -> Result<EventName, MalformedRequest> {
    let value = headers.required(EVENT_HEADER)?;
    EventName::new(value).ok_or_else(|| MalformedRequest::MissingHeader {
        header: EVENT_HEADER.to_string(),
    })
}

// ============================================================================
// DeliveryHeaders
// ============================================================================

/// GitHub-specific headers carried by every delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryHeaders {
    event: EventName,
    delivery_id: DeliveryId,
    hook_id: Option<HookId>,
    target_type: Option<String>,
    target_id: InstallationTargetId,
}

impl DeliveryHeaders {
    /// Parse and validate the delivery headers.
    ///
    /// The event name, delivery GUID, and installation target id are required.
    /// The hook id and target type are optional because GitHub omits them for
    /// some redelivery and test tooling paths.
    ///
    /// # Errors
    ///
    /// - [`MalformedRequest::MissingHeader`] for an absent required header
    /// - [`MalformedRequest::InvalidHeader`] for a value of the wrong shape
    pub fn from_raw(headers: &RawHeaders) -> Result<Self, MalformedRequest> {
        let event = event_name(headers)?;

        let delivery = headers.required(DELIVERY_HEADER)?;
        let delivery_id =
            DeliveryId::parse(delivery).ok_or_else(|| MalformedRequest::InvalidHeader {
                header: DELIVERY_HEADER.to_string(),
                message: "must be a valid UUID".to_string(),
            })?;

        let target_id = parse_u64(TARGET_ID_HEADER, headers.required(TARGET_ID_HEADER)?)?;

        let hook_id = match headers.get(HOOK_ID_HEADER).map(str::trim) {
            Some(value) if !value.is_empty() => Some(HookId::new(parse_u64(HOOK_ID_HEADER, value)?)),
            _ => None,
        };

        let target_type = headers
            .get(TARGET_TYPE_HEADER)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Self {
            event,
            delivery_id,
            hook_id,
            target_type,
            target_id: InstallationTargetId::new(target_id),
        })
    }

    pub fn event(&self) -> &EventName {
        &self.event
    }

    pub fn delivery_id(&self) -> DeliveryId {
        self.delivery_id
    }

    pub fn hook_id(&self) -> Option<HookId> {
        self.hook_id
    }

    pub fn target_type(&self) -> Option<&str> {
        self.target_type.as_deref()
    }

    pub fn installation_target_id(&self) -> InstallationTargetId {
        self.target_id
    }
}

fn parse_u64(header: &str, value: &str) -> Result<u64, MalformedRequest> {
    value
        .parse::<u64>()
        .map_err(|e| MalformedRequest::InvalidHeader {
            header: header.to_string(),
            message: format!("expected an unsigned integer: {e}"),
        })
}

#[cfg(test)]
#[path = "headers_tests.rs"]
mod tests;

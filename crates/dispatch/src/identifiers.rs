//! Newtype domain identifiers.
//!
//! Every value GitHub hands us that carries an identity is represented as a
//! distinct newtype wrapping a primitive. This prevents accidentally
//! interchanging, for example, an [`InstallationId`] (from the payload) with an
//! [`InstallationTargetId`] (from the delivery headers) even though both are
//! `u64` under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies the GitHub App installation that a delivery belongs to.
    ///
    /// Read from the `installation.id` field of the payload and used to obtain
    /// an installation access token.
    InstallationId
}

u64_id! {
    /// Identifies the target of the webhook (the GitHub App id for App hooks).
    ///
    /// Read from the `X-GitHub-Hook-Installation-Target-Id` header.
    InstallationTargetId
}

u64_id! {
    /// Identifies the webhook configuration that produced a delivery.
    ///
    /// Read from the `X-GitHub-Hook-Id` header.
    HookId
}

u64_id! {
    /// Identifies a GitHub repository.
    RepositoryId
}

u64_id! {
    /// Identifies a GitHub user, bot, or organisation account.
    UserId
}

u64_id! {
    /// Identifies a GitHub check run.
    CheckRunId
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (assigned by GitHub per delivery)
// ---------------------------------------------------------------------------

/// Identifies a single webhook delivery.
///
/// GitHub assigns a fresh GUID to every delivery (including redeliveries) and
/// sends it in the `X-GitHub-Delivery` header. It is recorded on spans so all
/// handler activity for one delivery can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    /// Parses a delivery identifier, returning `None` if `value` is not a UUID.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }

    /// Creates a [`DeliveryId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: arena indices
// ---------------------------------------------------------------------------

/// Identifies an event type within a [`crate::Taxonomy`].
///
/// This is an index into the taxonomy's node arena. It is only meaningful for
/// the taxonomy that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventTypeId(usize);

impl EventTypeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The GitHub event name carried in the `X-GitHub-Event` header
    /// (e.g. `"issue_comment"`, `"pull_request"`).
    EventName
}

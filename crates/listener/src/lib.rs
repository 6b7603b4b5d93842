//! Hookwise webhook boundary.
//!
//! Turns the pieces of an HTTP request that every web framework can hand over
//! (a header map and the raw body bytes) into a [`dispatch::Dispatcher`] call,
//! and the result back into a status code and body. Binding a server and
//! routing are left to the host application.
//!
//! ## Routes
//!
//! | Route | Type | Responds with |
//! |-------|------|---------------|
//! | `POST <webhook endpoint>` | [`WebhookReceiver::receive`] | `200 OK`, `400` for bad deliveries, `500` for failed handlers |
//! | `GET /` | [`IndexPage::render`] | An HTML banner with version lines |
//! | `GET /auth-callback` | [`AuthCallback::handle`] | `200 OK` once the user access token has been stored |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** No event semantics live here; everything is delegated
//! to the [`dispatch`] crate.

pub mod auth_callback;
pub mod index;
pub mod receiver;

pub use auth_callback::{AuthCallback, AuthCallbackError, AuthorizationStore, TokenExchange};
pub use index::IndexPage;
pub use receiver::{status_for, WebhookReceiver, WebhookResponse};

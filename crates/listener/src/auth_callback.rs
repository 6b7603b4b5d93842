//! OAuth authorization callback.
//!
//! After a user authorizes the App, GitHub redirects to the callback URL with
//! a one-time `code` and, for installations, an `installation_id`. The code is
//! exchanged for a user access token through a [`TokenExchange`] and the
//! result is handed to the application's [`AuthorizationStore`].

use std::collections::HashMap;
use std::sync::Arc;

use dispatch::InstallationId;
use http::StatusCode;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::WebhookResponse;

#[derive(Debug, Error)]
pub enum AuthCallbackError {
    #[error("Query parameter 'code' is missing or empty")]
    MissingCode,

    #[error("Query parameter 'installation_id' is not a number: {value}")]
    InvalidInstallationId { value: String },

    #[error("Failed to exchange the authorization code")]
    Exchange(#[source] anyhow::Error),

    #[error("Failed to store the user access token")]
    Store(#[source] anyhow::Error),
}

impl AuthCallbackError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCode | Self::InvalidInstallationId { .. } => StatusCode::BAD_REQUEST,
            Self::Exchange(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Exchanges an OAuth code for a user access token.
///
/// Implemented on top of whatever GitHub API client the application uses.
pub trait TokenExchange: Send + Sync {
    fn exchange_code(&self, code: &str) -> anyhow::Result<String>;
}

/// Persists user access tokens.
pub trait AuthorizationStore: Send + Sync {
    fn store(&self, installation_id: Option<InstallationId>, access_token: &str)
        -> anyhow::Result<()>;
}

/// Handles `GET` requests to the authorization callback route.
#[derive(Clone)]
pub struct AuthCallback {
    exchange: Arc<dyn TokenExchange>,
    store: Arc<dyn AuthorizationStore>,
}

impl AuthCallback {
    pub fn new(exchange: Arc<dyn TokenExchange>, store: Arc<dyn AuthorizationStore>) -> Self {
        Self { exchange, store }
    }

    /// Handle a callback given its decoded query parameters.
    pub fn handle(&self, query: &HashMap<String, String>) -> WebhookResponse {
        match self.authorize(query) {
            Ok(()) => WebhookResponse::ok(),
            Err(err) => {
                error!(error = ?err, "Authorization callback failed");
                WebhookResponse::error(err.status(), err.to_string())
            }
        }
    }

    #[instrument(skip_all)]
    fn authorize(&self, query: &HashMap<String, String>) -> Result<(), AuthCallbackError> {
        let code = query
            .get("code")
            .filter(|code| !code.is_empty())
            .ok_or(AuthCallbackError::MissingCode)?;
        let installation_id = query
            .get("installation_id")
            .map(|value| {
                value
                    .parse::<u64>()
                    .map(InstallationId::new)
                    .map_err(|_| AuthCallbackError::InvalidInstallationId {
                        value: value.clone(),
                    })
            })
            .transpose()?;

        let token = self
            .exchange
            .exchange_code(code)
            .map_err(AuthCallbackError::Exchange)?;
        self.store
            .store(installation_id, &token)
            .map_err(AuthCallbackError::Store)?;

        info!(installation_id = ?installation_id.map(|id| id.as_u64()), "User authorized");
        Ok(())
    }
}

impl std::fmt::Debug for AuthCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCallback").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "auth_callback_tests.rs"]
mod tests;

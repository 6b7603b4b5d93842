//! Credential port.
//!
//! Handlers that call back into GitHub need a credential for the installation
//! that sent the delivery. The dispatcher asks a [`CredentialProvider`] for one
//! and binds it to the [`crate::Event`]. Exchanging the credential for an
//! access token is left to the handler's API client.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::{InstallationId, InstallationTargetId};

/// Default location of the App private key when `PRIVATE_KEY` is not set.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "private-key.pem";

/// Credential material for calling the GitHub API on behalf of an installation.
///
/// Secrets are excluded from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// OAuth App user credentials (`CLIENT_ID`, `CLIENT_SECRET`, `TOKEN`).
    AppUser {
        client_id: String,
        client_secret: String,
        token: String,
    },

    /// GitHub App credentials, to be exchanged for an installation token.
    App {
        app_id: InstallationTargetId,
        private_key: String,
        installation_id: InstallationId,
    },

    /// A ready-to-use access token.
    Token(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AppUser { client_id, .. } => f
                .debug_struct("Credential::AppUser")
                .field("client_id", client_id)
                .field("client_secret", &"<REDACTED>")
                .field("token", &"<REDACTED>")
                .finish(),
            Self::App {
                app_id,
                installation_id,
                ..
            } => f
                .debug_struct("Credential::App")
                .field("app_id", app_id)
                .field("private_key", &"<REDACTED>")
                .field("installation_id", installation_id)
                .finish(),
            Self::Token(_) => f.debug_tuple("Credential::Token").field(&"<REDACTED>").finish(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential setting '{name}' is not configured")]
    MissingSetting { name: String },

    #[error("Private key could not be read from '{path}': {message}")]
    KeyUnreadable { path: String, message: String },
}

/// Supplies the credential for a delivery.
pub trait CredentialProvider: Send + Sync {
    fn credential(
        &self,
        target: InstallationTargetId,
        installation: InstallationId,
    ) -> Result<Credential, CredentialError>;
}

type SettingLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Chooses credentials from process settings.
///
/// - When `CLIENT_ID` is set, OAuth App user credentials are built from
///   `CLIENT_ID`, `CLIENT_SECRET` and `TOKEN`.
/// - Otherwise GitHub App credentials are built from the delivery's target id
///   (the App id), the payload's installation id, and the private key in
///   `PRIVATE_KEY`, falling back to the key file.
pub struct EnvCredentialProvider {
    lookup: SettingLookup,
    private_key_path: PathBuf,
}

impl EnvCredentialProvider {
    /// Reads settings from environment variables.
    pub fn from_env() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`.
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            private_key_path: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
        }
    }

    pub fn with_private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = path.into();
        self
    }

    fn setting(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, CredentialError> {
        self.setting(name)
            .ok_or_else(|| CredentialError::MissingSetting {
                name: name.to_string(),
            })
    }

    fn private_key(&self) -> Result<String, CredentialError> {
        if let Some(key) = self.setting("PRIVATE_KEY") {
            return Ok(key);
        }
        debug!(path = %self.private_key_path.display(), "Reading App private key from file");
        std::fs::read_to_string(&self.private_key_path).map_err(|e| CredentialError::KeyUnreadable {
            path: self.private_key_path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for EnvCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvCredentialProvider")
            .field("private_key_path", &self.private_key_path)
            .finish_non_exhaustive()
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credential(
        &self,
        target: InstallationTargetId,
        installation: InstallationId,
    ) -> Result<Credential, CredentialError> {
        if let Some(client_id) = self.setting("CLIENT_ID") {
            return Ok(Credential::AppUser {
                client_id,
                client_secret: self.required("CLIENT_SECRET")?,
                token: self.required("TOKEN")?,
            });
        }

        Ok(Credential::App {
            app_id: target,
            private_key: self.private_key()?,
            installation_id: installation,
        })
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;

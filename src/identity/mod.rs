//! Credential checking against the identity backend
//!
//! The login flow only needs one answer from the backend: who is this email and
//! password, and what role do they hold. [`IdentityProvider`] is that seam;
//! [`hosted::HostedIdentityProvider`] talks to the hosted database's auth API.

pub mod hosted;

use async_trait::async_trait;
use thiserror::Error;

pub use hosted::HostedIdentityProvider;

/// An authenticated principal as reported by the identity backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: String,
}

impl Identity {
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
        }
    }
}

/// Failures talking to the identity backend
///
/// Rejected credentials are not an error; they come back as `Ok(None)`.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity backend returned status {0}")]
    Backend(u16),

    #[error("identity backend response malformed: {0}")]
    Malformed(String),

    #[error("identity backend misconfigured: {0}")]
    Config(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check an email/password pair
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot give an answer. Wrong
    /// credentials are `Ok(None)`.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, IdentityError>;
}

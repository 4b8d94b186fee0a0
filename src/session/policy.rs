//! Session Policy - authorization answers for a single request
//!
//! Combines the [`TokenCodec`] and [`SessionCookies`] with a [`Clock`]. Every
//! public query is total: missing, malformed, forged and expired cookies all
//! come back as `false`/`None`, never as an error.
//!
//! ## Expiry eviction
//!
//! A request carrying an expired but correctly signed token gets its cookie
//! removed. The policy only sees the request, so it records an
//! [`EvictSessionCookie`] marker in the request extensions and the
//! [`evict_expired_sessions`](super::middleware::evict_expired_sessions)
//! middleware appends the removal cookie to the response.

use actix_web::cookie::Cookie;
use actix_web::{HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::cookie::SessionCookies;
use super::error::SessionError;
use super::token::{Session, TokenCodec};
use crate::settings::AztecSettings;

/// Outcome of looking at a request's session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session cookie
    Anonymous,
    /// Cookie present but failed verification
    Invalid,
    /// Signature holds, `expires_at` has passed
    Expired(Session),
    /// Signature holds and the session is current
    Active(Session),
}

impl SessionStatus {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The session, only when it is active
    #[must_use]
    pub const fn active_session(&self) -> Option<&Session> {
        match self {
            Self::Active(session) => Some(session),
            _ => None,
        }
    }
}

/// Request extension asking the response path to delete the session cookie
#[derive(Debug, Clone)]
pub struct EvictSessionCookie(pub Cookie<'static>);

#[derive(Clone)]
pub struct SessionPolicy {
    codec: TokenCodec,
    cookies: SessionCookies,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPolicy")
            .field("codec", &self.codec)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

impl SessionPolicy {
    /// Create a policy using the wall clock
    #[must_use]
    pub fn new(codec: TokenCodec, cookies: SessionCookies) -> Self {
        Self {
            codec,
            cookies,
            clock: Arc::new(SystemClock),
        }
    }

    /// Build the policy from loaded settings
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Misconfigured` if the configured secret is unusable.
    pub fn from_settings(settings: &AztecSettings) -> Result<Self, SessionError> {
        let codec = TokenCodec::new(settings.session.session_secret.as_bytes())?;
        let cookies = SessionCookies::new(settings.cookie_secure());
        log::info!(
            "Session policy ready: secure_cookies={}, environment={}",
            cookies.secure(),
            settings.application.environment
        );
        Ok(Self::new(codec, cookies))
    }

    /// Replace the time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    #[must_use]
    pub const fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Classify the request's session without side effects
    #[must_use]
    pub fn inspect(&self, req: &HttpRequest) -> SessionStatus {
        let Some(token) = self.cookies.read(req) else {
            return SessionStatus::Anonymous;
        };

        match self.codec.verify(&token) {
            Ok(session) if session.is_expired_at(self.now()) => SessionStatus::Expired(session),
            Ok(session) => SessionStatus::Active(session),
            Err(e) => {
                log::debug!("Rejected session cookie: {e}");
                SessionStatus::Invalid
            }
        }
    }

    /// Whether the request carries a current, correctly signed session
    ///
    /// An expired session schedules removal of its cookie.
    #[must_use]
    pub fn validate(&self, req: &HttpRequest) -> bool {
        self.current_session(req).is_some()
    }

    /// Whether the request is validated and its role equals `role` exactly
    #[must_use]
    pub fn has_role(&self, req: &HttpRequest, role: &str) -> bool {
        self.current_session(req)
            .is_some_and(|session| session.has_role(role))
    }

    #[must_use]
    pub fn current_user_id(&self, req: &HttpRequest) -> Option<String> {
        self.current_session(req)
            .map(|session| session.user_id().to_owned())
    }

    /// The active session, if any
    ///
    /// An expired session schedules removal of its cookie.
    #[must_use]
    pub fn current_session(&self, req: &HttpRequest) -> Option<Session> {
        match self.inspect(req) {
            SessionStatus::Active(session) => Some(session),
            SessionStatus::Expired(session) => {
                log::debug!(
                    "Session for user {} expired at {}, evicting cookie",
                    session.user_id(),
                    session.expires_at()
                );
                self.schedule_eviction(req);
                None
            }
            SessionStatus::Anonymous | SessionStatus::Invalid => None,
        }
    }

    /// Issue a token for an authenticated principal and wrap it in a cookie
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingClaim` if `user_id` or `role` is empty.
    pub fn start_session(&self, user_id: &str, role: &str) -> Result<Cookie<'static>, SessionError> {
        let token = self.codec.issue(user_id, role, self.now())?;
        Ok(self.cookies.write(&token))
    }

    /// Cookie that ends the session in the browser
    #[must_use]
    pub fn end_session(&self) -> Cookie<'static> {
        self.cookies.clear()
    }

    fn schedule_eviction(&self, req: &HttpRequest) {
        req.extensions_mut()
            .insert(EvictSessionCookie(self.cookies.clear()));
    }
}

use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;

use super::SESSION_TTL_SECONDS;

/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE_NAME: &str = "session";

/// Moves the opaque session token between the codec and the HTTP cookie
///
/// Every cookie is `HttpOnly; SameSite=Lax; Path=/`, with `Secure` outside
/// local development.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    #[must_use]
    pub const fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Whether cookies are marked `Secure`
    #[must_use]
    pub const fn secure(&self) -> bool {
        self.secure
    }

    /// Build the `Set-Cookie` value storing `token` for one session TTL
    #[must_use]
    pub fn write(&self, token: &str) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE_NAME, token.to_owned())
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::seconds(SESSION_TTL_SECONDS))
            .finish()
    }

    /// Read the session token from an inbound request
    ///
    /// A missing or empty cookie is the normal "not logged in" state, not an error.
    #[must_use]
    pub fn read(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Build the `Set-Cookie` value deleting the session cookie
    ///
    /// Deleting an absent cookie is harmless, so this is safe to send repeatedly.
    #[must_use]
    pub fn clear(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE_NAME, "")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .finish()
    }
}

/// Check whether a cookie deletes the session rather than storing one
#[must_use]
pub fn is_session_removal(cookie: &Cookie<'_>) -> bool {
    cookie.name() == SESSION_COOKIE_NAME
        && cookie.value().is_empty()
        && cookie
            .max_age()
            .is_some_and(|max_age| max_age <= Duration::ZERO)
}

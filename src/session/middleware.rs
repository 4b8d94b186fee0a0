use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{Error, HttpMessage};

use super::cookie::SESSION_COOKIE_NAME;
use super::policy::EvictSessionCookie;

/// Append the session removal cookie when a handler observed an expired session
///
/// Register with `actix_web::middleware::from_fn(evict_expired_sessions)`.
/// A handler that set its own `session` cookie (login, logout) wins.
///
/// # Errors
///
/// Propagates the inner service error, or fails if the cookie header cannot be encoded.
pub async fn evict_expired_sessions(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let mut res = next.call(req).await?;

    let eviction = res.request().extensions_mut().remove::<EvictSessionCookie>();
    if let Some(EvictSessionCookie(cookie)) = eviction {
        let handler_set_session = res
            .response()
            .cookies()
            .any(|existing| existing.name() == SESSION_COOKIE_NAME);

        if !handler_set_session {
            log::debug!("Evicting expired session cookie");
            res.response_mut()
                .add_cookie(&cookie)
                .map_err(actix_web::error::ErrorInternalServerError)?;
        }
    }

    Ok(res)
}

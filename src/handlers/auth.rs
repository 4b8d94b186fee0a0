// Authentication handlers: login, logout and session lookup
use actix_web::{web, HttpRequest, HttpResponse, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::Serialize;

use super::admin::ADMIN_ROLE;
use crate::identity::IdentityProvider;
use crate::session::SessionPolicy;
use crate::utils::ResponseBuilder;
use crate::validation::{validate_login, LoginRequest};

#[derive(Debug, Serialize)]
struct LoginResponse {
    success: bool,
    user_id: String,
    role: String,
    redirect_url: String,
}

#[derive(Debug, Serialize)]
struct SessionInfoResponse {
    authenticated: bool,
    user_id: String,
    role: String,
    is_admin: bool,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Password login
///
/// Validates the body, checks the credentials with the identity backend and,
/// on success, sets the `session` cookie.
///
/// # Errors
///
/// Returns an error if the session token cannot be issued.
pub async fn login(
    body: web::Json<LoginRequest>,
    identity: web::Data<dyn IdentityProvider>,
    policy: web::Data<SessionPolicy>,
) -> Result<HttpResponse> {
    let credentials = match validate_login(&body) {
        Ok(credentials) => credentials,
        Err(e) => {
            debug!("Login request rejected: {e}");
            return Ok(e.to_response());
        }
    };

    match identity
        .authenticate(&credentials.email, &credentials.password)
        .await
    {
        Ok(Some(identity)) => {
            let cookie = policy.start_session(&identity.user_id, &identity.role)?;
            info!(
                "Login succeeded for user {} with role {}",
                identity.user_id, identity.role
            );
            Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
                success: true,
                user_id: identity.user_id,
                role: identity.role,
                redirect_url: credentials.redirect_url,
            }))
        }
        Ok(None) => {
            info!("Login rejected: invalid credentials");
            Ok(ResponseBuilder::authentication_failed(
                "Invalid email or password",
            ))
        }
        Err(e) => {
            error!("Identity backend failure during login: {e}");
            Ok(ResponseBuilder::bad_gateway()
                .with_error_code("identity_unavailable")
                .with_message("The identity service is unavailable, try again later")
                .build())
        }
    }
}

/// Clear the session cookie and go home
///
/// Idempotent: works the same with or without a session.
///
/// # Errors
///
/// Never fails; the `Result` matches the other handlers.
pub async fn logout(policy: web::Data<SessionPolicy>) -> Result<HttpResponse> {
    debug!("Logout: clearing session cookie");
    Ok(ResponseBuilder::redirect_with_cookies(
        "/",
        vec![policy.end_session()],
    ))
}

/// Describe the caller's session, or 401
///
/// # Errors
///
/// Never fails; the `Result` matches the other handlers.
pub async fn session_info(
    req: HttpRequest,
    policy: web::Data<SessionPolicy>,
) -> Result<HttpResponse> {
    let Some(session) = policy.current_session(&req) else {
        return Ok(ResponseBuilder::unauthorized()
            .with_message("No active session")
            .build());
    };

    Ok(HttpResponse::Ok().json(SessionInfoResponse {
        authenticated: true,
        user_id: session.user_id().to_owned(),
        role: session.role().to_owned(),
        is_admin: session.has_role(ADMIN_ROLE),
        issued_at: session.issued_at(),
        expires_at: session.expires_at(),
    }))
}

// Role-guarded admin area
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::warn;
use serde_json::json;

use crate::session::SessionPolicy;
use crate::utils::ResponseBuilder;

/// Role required for the admin area
pub const ADMIN_ROLE: &str = "admin";

/// Where unauthenticated visitors are sent
pub const LOGIN_PATH: &str = "/login";

/// Admin landing endpoint
///
/// Anonymous or expired visitors are redirected to the login page with a
/// `next` parameter; authenticated users without the admin role get 403.
///
/// # Errors
///
/// Never fails; the `Result` matches the other handlers.
pub async fn admin_dashboard(
    req: HttpRequest,
    policy: web::Data<SessionPolicy>,
) -> Result<HttpResponse> {
    let Some(session) = policy.current_session(&req) else {
        return Ok(ResponseBuilder::redirect(&login_redirect(req.path())));
    };

    if !session.has_role(ADMIN_ROLE) {
        warn!(
            "User {} with role {} denied access to {}",
            session.user_id(),
            session.role(),
            req.path()
        );
        return Ok(ResponseBuilder::forbidden().build());
    }

    Ok(HttpResponse::Ok().json(json!({
        "user_id": session.user_id(),
        "role": session.role(),
    })))
}

fn login_redirect(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

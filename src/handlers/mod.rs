// HTTP request handlers for the session service
pub mod admin;
pub mod auth;
pub mod health;


use std::sync::Arc;

use actix_web::error::InternalError;
use actix_web::web;

use crate::identity::IdentityProvider;
use crate::session::SessionPolicy;
use crate::utils::ResponseBuilder;

// Re-export the main handler functions
pub use admin::{admin_dashboard, ADMIN_ROLE};
pub use auth::{login, logout, session_info};
pub use health::health;

const MAX_JSON_BODY_BYTES: usize = 8 * 1024;

/// Register shared state and routes
///
/// Pass to `App::configure`; wrap the app with
/// [`evict_expired_sessions`](crate::session::evict_expired_sessions) so
/// expired cookies are removed.
pub fn configure_app(
    policy: SessionPolicy,
    identity: Arc<dyn IdentityProvider>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(policy))
            .app_data(web::Data::from(identity));
        configure_services(cfg);
    }
}

pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        // Authentication endpoints
        .route("/auth/login", web::post().to(login))
        .route("/auth/logout", web::get().to(logout))
        .route("/auth/logout", web::post().to(logout))
        .route("/auth/session", web::get().to(session_info))
        // Role-guarded area
        .route("/admin", web::get().to(admin_dashboard))
        // Health endpoint
        .route("/ping", web::get().to(health));
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY_BYTES)
        .error_handler(|err, _req| {
            log::debug!("Rejected request body: {err}");
            let response = ResponseBuilder::bad_request()
                .with_error_code("invalid_request")
                .with_message("Request body must be a JSON object")
                .build();
            InternalError::from_response(err, response).into()
        })
}

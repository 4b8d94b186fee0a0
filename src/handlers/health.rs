use actix_web::{HttpResponse, Result};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
}

/// Health check endpoint
///
/// # Errors
///
/// Never fails; the `Result` matches the other handlers.
pub async fn health() -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok",
        message: "Aztec is running",
        version: crate::VERSION,
    };
    Ok(HttpResponse::Ok().json(response))
}

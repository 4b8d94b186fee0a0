//! HTTP response handling
//!
//! One place to build JSON error bodies and redirects so that no handler leaks
//! internal error detail. Error bodies have the shape
//! `{"error": "<code>", "error_description": "<message>"}`.

use actix_web::{cookie::Cookie, http::header, http::StatusCode, HttpResponse};
use serde_json::{json, Value};

/// Unified response builder
pub struct ResponseBuilder;

impl ResponseBuilder {
    // ===============================
    // ERROR RESPONSE METHODS
    // ===============================

    /// `BadRequest` (400)
    #[must_use]
    pub fn bad_request() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::BadRequest)
    }

    /// `Unauthorized` (401)
    #[must_use]
    pub fn unauthorized() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::Unauthorized)
    }

    /// `Forbidden` (403)
    #[must_use]
    pub fn forbidden() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::Forbidden)
    }

    /// `InternalServerError` (500)
    #[must_use]
    pub fn internal_server_error() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::InternalServerError)
    }

    /// `BadGateway` (502)
    #[must_use]
    pub fn bad_gateway() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::BadGateway)
    }

    // ===============================
    // SUCCESS RESPONSE METHODS
    // ===============================

    /// Redirect (302 Found) setting every given cookie
    #[must_use]
    pub fn redirect_with_cookies(location: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Found();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder
            .insert_header((header::LOCATION, location.to_string()))
            .finish()
    }

    /// Redirect (302 Found) without cookies
    #[must_use]
    pub fn redirect(location: &str) -> HttpResponse {
        Self::redirect_with_cookies(location, Vec::new())
    }

    /// Common validation error: invalid field
    #[must_use]
    pub fn invalid_field(field_name: &str, reason: &str) -> HttpResponse {
        Self::bad_request()
            .with_error_code("invalid_field")
            .with_message(&format!("Invalid {field_name}: {reason}"))
            .build()
    }

    /// Authentication failure
    #[must_use]
    pub fn authentication_failed(reason: &str) -> HttpResponse {
        Self::unauthorized()
            .with_error_code("authentication_failed")
            .with_message(reason)
            .build()
    }
}

/// Supported HTTP error response types
#[derive(Debug, Clone, Copy)]
enum ErrorType {
    BadRequest,
    Unauthorized,
    Forbidden,
    InternalServerError,
    BadGateway,
}

impl ErrorType {
    const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway => StatusCode::BAD_GATEWAY,
        }
    }

    const fn default_code(self) -> &'static str {
        match self {
            Self::BadRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::InternalServerError => "server_error",
            Self::BadGateway => "bad_gateway",
        }
    }

    const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "The request is malformed or invalid",
            Self::Unauthorized => "Authentication is required to access this resource",
            Self::Forbidden => "You do not have permission to access this resource",
            Self::InternalServerError => "An internal server error occurred",
            Self::BadGateway => "Failed to reach an upstream service",
        }
    }
}

/// Builder for error responses with fluent interface
pub struct ErrorResponseBuilder {
    error_type: ErrorType,
    error_code: Option<String>,
    message: Option<String>,
}

impl ErrorResponseBuilder {
    const fn new(error_type: ErrorType) -> Self {
        Self {
            error_type,
            error_code: None,
            message: None,
        }
    }

    /// Set a custom error code (e.g., "`invalid_field`")
    #[must_use]
    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = Some(code.to_string());
        self
    }

    /// Set a custom human-readable message
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn body(&self) -> Value {
        json!({
            "error": self.error_code.as_deref().unwrap_or(self.error_type.default_code()),
            "error_description": self.message.as_deref().unwrap_or(self.error_type.default_message()),
        })
    }

    #[must_use]
    pub fn build(self) -> HttpResponse {
        HttpResponse::build(self.error_type.status()).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_error_bodies() {
        let body = ResponseBuilder::unauthorized().body();
        assert_eq!(body["error"], "unauthorized");
        assert!(body["error_description"].is_string());

        let response = ResponseBuilder::forbidden().build();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_custom_error_code_and_message() {
        let body = ResponseBuilder::bad_request()
            .with_error_code("missing_field")
            .with_message("Missing required field: email")
            .body();
        assert_eq!(body["error"], "missing_field");
        assert_eq!(body["error_description"], "Missing required field: email");
    }

    #[test]
    fn test_redirect_with_cookies() {
        let response = ResponseBuilder::redirect_with_cookies(
            "/",
            vec![Cookie::new("a", "1"), Cookie::new("b", "2")],
        );
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/"
        );
        assert_eq!(response.cookies().count(), 2);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ResponseBuilder::authentication_failed("nope").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ResponseBuilder::invalid_field("email", "bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ResponseBuilder::bad_gateway().build().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ResponseBuilder::internal_server_error().build().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

//! Input validation for the login flow
//!
//! Login bodies are checked before any call to the identity backend, and the
//! post-login redirect target is reduced to a same-site path so the login
//! endpoint cannot be used as an open redirect.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::utils::ResponseBuilder;
use actix_web::HttpResponse;

/// Longest password accepted before contacting the backend
pub const MAX_PASSWORD_BYTES: usize = 1024;

const MAX_REDIRECT_LENGTH: usize = 2048;

/// Where a sanitised redirect falls back to
pub const DEFAULT_REDIRECT: &str = "/";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

// Scheme prefix such as `javascript:` or `https:`
static SCHEME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+.-]*:").expect("scheme pattern compiles"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at most 1024 bytes")]
    PasswordTooLong,
}

impl ValidationError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidEmail | Self::PasswordTooLong => "invalid_field",
        }
    }

    #[must_use]
    pub fn to_response(&self) -> HttpResponse {
        match self {
            Self::MissingField(_) => ResponseBuilder::bad_request()
                .with_error_code(self.code())
                .with_message(&self.to_string())
                .build(),
            Self::InvalidEmail => ResponseBuilder::invalid_field("email", "not a valid address"),
            Self::PasswordTooLong => ResponseBuilder::invalid_field(
                "password",
                &format!("must be at most {MAX_PASSWORD_BYTES} bytes"),
            ),
        }
    }
}

/// Login request body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Login input after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
    pub redirect_url: String,
}

/// Validate a login body
///
/// The email is trimmed; the password is passed through untouched.
///
/// # Errors
///
/// Returns a `ValidationError` naming the first offending field.
pub fn validate_login(request: &LoginRequest) -> Result<LoginCredentials, ValidationError> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if request.password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if request.password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::PasswordTooLong);
    }

    Ok(LoginCredentials {
        email: email.to_string(),
        password: request.password.clone(),
        redirect_url: sanitize_redirect(request.redirect.as_deref()),
    })
}

/// Reduce a requested redirect to a safe same-site path
///
/// Only relative paths starting with a single `/` survive. Protocol-relative
/// URLs, schemes, traversal, backslashes and control characters (raw or
/// percent-encoded) all fall back to [`DEFAULT_REDIRECT`].
#[must_use]
pub fn sanitize_redirect(requested: Option<&str>) -> String {
    let Some(target) = requested.map(str::trim).filter(|t| !t.is_empty()) else {
        return DEFAULT_REDIRECT.to_string();
    };

    if is_safe_relative_path(target) {
        let decoded = urlencoding::decode(target).map(std::borrow::Cow::into_owned);
        match decoded {
            Ok(decoded) if decoded == target || is_safe_relative_path(&decoded) => {
                return target.to_string();
            }
            _ => {}
        }
    }

    warn!("Rejected unsafe redirect target, using {DEFAULT_REDIRECT}");
    DEFAULT_REDIRECT.to_string()
}

fn is_safe_relative_path(path: &str) -> bool {
    path.len() <= MAX_REDIRECT_LENGTH
        && path.starts_with('/')
        && !path.starts_with("//")
        && !SCHEME_PATTERN.is_match(path)
        && !path.contains("..")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(email: &str, password: &str, redirect: Option<&str>) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            redirect: redirect.map(ToString::to_string),
        }
    }

    #[test]
    fn test_valid_login_trims_email() {
        let creds = validate_login(&login("  a@example.com ", "hunter2", None)).unwrap();
        assert_eq!(creds.email, "a@example.com");
        assert_eq!(creds.password, "hunter2");
        assert_eq!(creds.redirect_url, "/");
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            validate_login(&login("   ", "pw", None)),
            Err(ValidationError::MissingField("email"))
        );
        assert_eq!(
            validate_login(&login("a@example.com", "", None)),
            Err(ValidationError::MissingField("password"))
        );
    }

    #[test]
    fn test_invalid_email() {
        for email in ["plainaddress", "a@b", "a b@example.com", "@example.com"] {
            assert_eq!(
                validate_login(&login(email, "pw", None)),
                Err(ValidationError::InvalidEmail),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn test_password_length_limit() {
        let at_limit = "p".repeat(MAX_PASSWORD_BYTES);
        assert!(validate_login(&login("a@example.com", &at_limit, None)).is_ok());

        let over = "p".repeat(MAX_PASSWORD_BYTES + 1);
        assert_eq!(
            validate_login(&login("a@example.com", &over, None)),
            Err(ValidationError::PasswordTooLong)
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ValidationError::MissingField("email").code(), "missing_field");
        assert_eq!(ValidationError::InvalidEmail.code(), "invalid_field");
        assert_eq!(
            ValidationError::PasswordTooLong.to_response().status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn test_invalid_field_response_body() {
        let response = ValidationError::InvalidEmail.to_response();
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let bytes = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "invalid_field");
        assert_eq!(body["error_description"], "Invalid email: not a valid address");
    }

    #[test]
    fn test_safe_redirects_kept() {
        assert_eq!(sanitize_redirect(Some("/admin")), "/admin");
        assert_eq!(sanitize_redirect(Some("/tools?id=3#top")), "/tools?id=3#top");
        assert_eq!(sanitize_redirect(Some("/a%20b")), "/a%20b");
    }

    #[test]
    fn test_unsafe_redirects_fall_back() {
        for target in [
            "https://evil.example.com",
            "//evil.example.com",
            "javascript:alert(1)",
            "/../etc/passwd",
            "/%2e%2e/secret",
            "/\\evil.example.com",
            "/%5Cevil.example.com",
            "/line\nbreak",
            "/%0d%0aSet-Cookie:x",
            "/%2F/evil.example.com",
            "admin",
        ] {
            assert_eq!(sanitize_redirect(Some(target)), "/", "{target:?} should be rejected");
        }
    }

    #[test]
    fn test_missing_redirect() {
        assert_eq!(sanitize_redirect(None), "/");
        assert_eq!(sanitize_redirect(Some("  ")), "/");
    }

    #[test]
    fn test_overlong_redirect() {
        let long = format!("/{}", "a".repeat(MAX_REDIRECT_LENGTH));
        assert_eq!(sanitize_redirect(Some(&long)), "/");
    }
}

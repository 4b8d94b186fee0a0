//! Session error taxonomy
//!
//! `InvalidSignature` is normally absorbed by
//! [`SessionPolicy`](super::SessionPolicy) and only surfaces as a denied request.
//! Expiry is not an error here; the policy reports it as a session status.
//! `Misconfigured` is the startup-time condition that stops the process.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::utils::responses::ResponseBuilder;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Token absent, malformed, or signed with another secret
    #[error("session token failed verification")]
    InvalidSignature,

    /// Issue time too close to the edge of the representable range
    #[error("session timestamps out of range")]
    OutOfRange,

    /// Secret missing or too weak; fatal at startup
    #[error("session configuration invalid: {0}")]
    Misconfigured(String),

    /// A required claim was empty when issuing a token
    #[error("session claim `{0}` must not be empty")]
    MissingClaim(&'static str),

    #[error("failed to encode session token: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ResponseError for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::MissingClaim(_) => StatusCode::BAD_REQUEST,
            Self::Misconfigured(_) | Self::OutOfRange | Self::Encoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::InvalidSignature => ResponseBuilder::unauthorized().build(),
            Self::MissingClaim(claim) => ResponseBuilder::bad_request()
                .with_error_code("missing_claim")
                .with_message(&format!("Missing required field: {claim}"))
                .build(),
            Self::Misconfigured(_) | Self::OutOfRange | Self::Encoding(_) => {
                log::error!("Session failure: {self}");
                ResponseBuilder::internal_server_error().build()
            }
        }
    }
}

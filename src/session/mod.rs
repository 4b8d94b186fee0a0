//! Session Management Module
//!
//! Stateless sessions: the signed token stored in the `session` cookie *is* the
//! session record. There is no server-side session table and therefore no way
//! to revoke a single token before it expires.
//!
//! # Modules
//!
//! - [`token`] - Token Codec: sign and verify `{userId, role, exp}` tokens
//! - [`cookie`] - Session Store Adapter: read/write/clear the `session` cookie
//! - [`policy`] - Session Policy: validity, role and user answers per request
//! - [`clock`] - Injectable time source
//! - [`middleware`] - Response-side eviction of expired cookies
//! - [`error`] - Session error taxonomy

pub mod clock;
pub mod cookie;
pub mod error;
pub mod middleware;
pub mod policy;
pub mod token;

/// Lifetime of a session in seconds, shared by token expiry and cookie `Max-Age`
pub const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

// Re-export commonly used items for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use cookie::{is_session_removal, SessionCookies, SESSION_COOKIE_NAME};
pub use error::SessionError;
pub use middleware::evict_expired_sessions;
pub use policy::{EvictSessionCookie, SessionPolicy, SessionStatus};
pub use token::{Session, TokenCodec, MIN_SECRET_LENGTH};

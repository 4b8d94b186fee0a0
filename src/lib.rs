#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the aztec application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod handlers;
pub mod identity;
pub mod session;
pub mod settings;
pub mod utils;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use handlers::{configure_app, configure_services};
pub use identity::{HostedIdentityProvider, Identity, IdentityError, IdentityProvider};
pub use session::{
    evict_expired_sessions, Session, SessionCookies, SessionError, SessionPolicy, SessionStatus,
    TokenCodec,
};
pub use settings::AztecSettings;

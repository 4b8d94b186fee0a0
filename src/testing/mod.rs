//! Unified testing utilities for Aztec
//!
//! Shared by unit tests and the integration tests under `tests/` (enable the
//! `testing` feature for the latter).
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built policies, clocks and settings
//! - [`requests`] - HTTP request builders for testing handlers
//! - [`mock`] - Identity provider doubles
//!
//! ## Usage
//!
//! ```rust
//! use aztec::testing::TestFixtures;
//! use chrono::Duration;
//!
//! let clock = TestFixtures::manual_clock();
//! let policy = TestFixtures::session_policy_with_clock(clock.clone());
//! let cookie = policy.start_session("u1", "admin").unwrap();
//!
//! clock.advance(Duration::days(2));
//! // `cookie` now carries an expired session
//! # let _ = cookie;
//! ```

pub mod fixtures;
pub mod mock;
pub mod requests;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use mock::{FailingIdentityProvider, StaticIdentityProvider};
pub use requests::RequestBuilder;

/// Common test constants
pub mod constants {
    /// Signing secret used by fixtures (32 bytes)
    pub const TEST_SESSION_SECRET: &[u8] = b"aztec-test-session-secret-0123456789";

    /// A second valid secret, for tokens that must fail verification
    pub const OTHER_SESSION_SECRET: &[u8] = b"aztec-other-session-secret-9876543210";

    pub const TEST_USER_ID: &str = "u1";

    pub const TEST_ADMIN_ROLE: &str = "admin";

    pub const TEST_EDITOR_ROLE: &str = "editor";

    pub const TEST_EMAIL: &str = "test@example.com";

    pub const TEST_PASSWORD: &str = "correct horse battery staple";

    /// Fixed start time for manual clocks (2024-01-01T00:00:00Z)
    pub const TEST_EPOCH_SECONDS: i64 = 1_704_067_200;

    pub const TEST_IDENTITY_URL: &str = "https://project.db.example.com";
}

//! Test fixtures providing pre-built test objects

use std::sync::Arc;

use actix_web::cookie::Cookie;
use chrono::DateTime;

use crate::session::{ManualClock, SessionCookies, SessionPolicy, TokenCodec};
use crate::settings::{AztecSettings, Environment};

use super::constants::{
    TEST_ADMIN_ROLE, TEST_EPOCH_SECONDS, TEST_IDENTITY_URL, TEST_SESSION_SECRET, TEST_USER_ID,
};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Codec signing with [`TEST_SESSION_SECRET`]
    ///
    /// # Panics
    ///
    /// Panics if the test secret is rejected.
    #[must_use]
    pub fn token_codec() -> TokenCodec {
        TokenCodec::new(TEST_SESSION_SECRET).expect("test secret is long enough")
    }

    /// Policy on the wall clock with non-secure cookies
    #[must_use]
    pub fn session_policy() -> SessionPolicy {
        SessionPolicy::new(Self::token_codec(), SessionCookies::new(false))
    }

    /// Policy sharing the given manual clock
    #[must_use]
    pub fn session_policy_with_clock(clock: Arc<ManualClock>) -> SessionPolicy {
        Self::session_policy().with_clock(clock)
    }

    /// Manual clock frozen at [`TEST_EPOCH_SECONDS`]
    #[must_use]
    pub fn manual_clock() -> Arc<ManualClock> {
        let start = DateTime::from_timestamp(TEST_EPOCH_SECONDS, 0).unwrap_or_default();
        Arc::new(ManualClock::new(start))
    }

    /// Settings that pass validation, in development mode
    #[must_use]
    pub fn settings() -> AztecSettings {
        let mut settings = AztecSettings::default();
        settings.application.environment = Environment::Development;
        settings.session.session_secret = String::from_utf8_lossy(TEST_SESSION_SECRET).into_owned();
        settings.identity.api_url = TEST_IDENTITY_URL.to_string();
        settings.identity.api_key = "test-anon-key".to_string();
        settings
    }

    /// Session cookie for the default admin user
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be issued.
    #[must_use]
    pub fn admin_cookie(policy: &SessionPolicy) -> Cookie<'static> {
        policy
            .start_session(TEST_USER_ID, TEST_ADMIN_ROLE)
            .expect("fixture session issues")
    }
}

//! Identity provider doubles for handler tests

use std::collections::HashMap;

use async_trait::async_trait;

use crate::identity::{Identity, IdentityError, IdentityProvider};

/// Accepts a fixed set of email/password pairs
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityProvider {
    accounts: HashMap<String, (String, Identity)>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account
    #[must_use]
    pub fn with_account(mut self, email: &str, password: &str, user_id: &str, role: &str) -> Self {
        self.accounts.insert(
            email.to_string(),
            (password.to_string(), Identity::new(user_id, role)),
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        Ok(self
            .accounts
            .get(email)
            .filter(|(expected, _)| expected == password)
            .map(|(_, identity)| identity.clone()))
    }
}

/// Always fails as if the backend were down
#[derive(Debug, Clone, Copy)]
pub struct FailingIdentityProvider {
    status: u16,
}

impl FailingIdentityProvider {
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self { status }
    }
}

impl Default for FailingIdentityProvider {
    fn default() -> Self {
        Self::new(503)
    }
}

#[async_trait]
impl IdentityProvider for FailingIdentityProvider {
    async fn authenticate(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        Err(IdentityError::Backend(self.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_static_provider() {
        let provider =
            StaticIdentityProvider::new().with_account("a@example.com", "pw", "u1", "admin");

        assert_eq!(
            provider.authenticate("a@example.com", "pw").await.unwrap(),
            Some(Identity::new("u1", "admin"))
        );
        assert_eq!(
            provider.authenticate("a@example.com", "wrong").await.unwrap(),
            None
        );
        assert_eq!(
            provider.authenticate("b@example.com", "pw").await.unwrap(),
            None
        );
    }

    #[actix_web::test]
    async fn test_failing_provider() {
        assert!(matches!(
            FailingIdentityProvider::default()
                .authenticate("a@example.com", "pw")
                .await,
            Err(IdentityError::Backend(503))
        ));
    }
}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{Identity, IdentityError, IdentityProvider};
use crate::settings::IdentitySettings;

const TOKEN_PATH: &str = "auth/v1/token";

/// Password grant response; only the user record matters here
#[derive(Debug, Deserialize)]
struct TokenResponse {
    user: BackendUser,
}

#[derive(Debug, Deserialize)]
struct BackendUser {
    id: String,
    #[serde(default)]
    app_metadata: AppMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct AppMetadata {
    role: Option<String>,
}

/// Password login against the hosted database's auth endpoint
pub struct HostedIdentityProvider {
    http_client: Client,
    token_url: Url,
    api_key: String,
    default_role: String,
}

impl std::fmt::Debug for HostedIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedIdentityProvider")
            .field("token_url", &self.token_url.as_str())
            .field("default_role", &self.default_role)
            .finish_non_exhaustive()
    }
}

impl HostedIdentityProvider {
    /// # Errors
    ///
    /// Returns `IdentityError::Config` if the API URL does not parse.
    pub fn new(settings: &IdentitySettings) -> Result<Self, IdentityError> {
        Self::with_client(settings, Client::new())
    }

    /// # Errors
    ///
    /// Returns `IdentityError::Config` if the API URL does not parse.
    pub fn with_client(settings: &IdentitySettings, http_client: Client) -> Result<Self, IdentityError> {
        Ok(Self {
            http_client,
            token_url: token_url(&settings.api_url)?,
            api_key: settings.api_key.clone(),
            default_role: settings.default_role.clone(),
        })
    }

    #[must_use]
    pub fn token_url(&self) -> &str {
        self.token_url.as_str()
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        let response = self
            .http_client
            .post(self.token_url.clone())
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if is_rejection(status) {
            log::debug!("Identity backend rejected credentials with status {status}");
            return Ok(None);
        }
        if !status.is_success() {
            log::warn!("Identity backend returned unexpected status {status}");
            return Err(IdentityError::Backend(status.as_u16()));
        }

        let body = response.text().await?;
        identity_from_response(&body, &self.default_role).map(Some)
    }
}

/// `{api_url}/auth/v1/token?grant_type=password`
fn token_url(api_url: &str) -> Result<Url, IdentityError> {
    let mut base = Url::parse(api_url)
        .map_err(|e| IdentityError::Config(format!("invalid api_url '{api_url}': {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut url = base
        .join(TOKEN_PATH)
        .map_err(|e| IdentityError::Config(format!("cannot build token URL: {e}")))?;
    url.query_pairs_mut().append_pair("grant_type", "password");
    Ok(url)
}

const fn is_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    )
}

fn identity_from_response(body: &str, default_role: &str) -> Result<Identity, IdentityError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| IdentityError::Malformed(format!("failed to parse token response: {e}")))?;

    if parsed.user.id.is_empty() {
        return Err(IdentityError::Malformed("user id is empty".to_string()));
    }

    let role = parsed
        .user
        .app_metadata
        .role
        .filter(|role| !role.is_empty())
        .unwrap_or_else(|| default_role.to_string());

    Ok(Identity::new(parsed.user.id, role))
}

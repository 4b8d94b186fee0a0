use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::session::MIN_SECRET_LENGTH;

/// Errors raised while loading configuration
///
/// Any of these stops the process at startup.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: basic_toml::Error,
    },

    #[error("failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("invalid configuration: {0}")]
    Misconfigured(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AztecSettings {
    pub application: ApplicationSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub identity: IdentitySettings,
    pub logging: LoggingSettings,
}

/// Deployment environment; decides the `Secure` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Public base URL of the site
    pub site_url: String,
    pub environment: Environment,
    pub cors_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionSettings {
    /// HS256 signing secret, at least `MIN_SECRET_LENGTH` bytes. No fallback.
    pub session_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CookieSettings {
    /// Explicit `Secure` override; derived from the environment when unset
    pub secure: Option<bool>,
}

/// Hosted database/auth backend used to check login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub api_url: String,
    pub api_key: String,
    /// Role given to users whose account carries no role
    pub default_role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            site_url: "http://localhost:8080".to_string(),
            environment: Environment::Production,
            cors_origins: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            default_role: "user".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AztecSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// Also loads the `.env` file and initializes the logger.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A settings file cannot be read or parsed
    /// - Logger initialization fails
    /// - The resulting configuration is invalid (see [`Self::validate`])
    pub fn load() -> Result<Self, SettingsError> {
        let (settings, sources) = Self::resolve()?;

        env_logger::Builder::new()
            .parse_filters(&settings.logging.level)
            .try_init()?;

        for source in &sources {
            log::info!("Loaded settings from {}", source.display());
        }
        if sources.is_empty() {
            log::info!("No Settings.toml found, using defaults and environment");
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Merge `.env`, settings files and environment without touching the logger
    ///
    /// Returns the settings together with the files they were read from. The
    /// result is not validated.
    ///
    /// # Errors
    ///
    /// Returns an error if a present settings file cannot be read or parsed
    pub fn resolve() -> Result<(Self, Vec<PathBuf>), SettingsError> {
        load_env_file(Path::new(".env"));

        let (mut settings, sources) = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        Ok((settings, sources))
    }

    /// Load base settings from TOML file(s) or use defaults
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (applied separately)
    /// 2. Settings.toml in `AZTEC_SECRETS_DIR`
    /// 3. Settings.toml in the current directory
    /// 4. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a present settings file cannot be read or parsed
    fn load_base_settings() -> Result<(Self, Vec<PathBuf>), SettingsError> {
        let mut settings = Self::default();
        let mut sources = Vec::new();

        let default_config_path = PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_file(&default_config_path)?;
            sources.push(default_config_path);
        }

        if let Ok(secrets_dir) = std::env::var("AZTEC_SECRETS_DIR") {
            let secrets_path = Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_file(&secrets_path)?;
                sources.push(secrets_path);
            }
        }

        Ok((settings, sources))
    }

    /// Parse a settings file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        basic_toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_identity_env_overrides(&mut settings.identity);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(site_url) = std::env::var("SITE_URL") {
            app_settings.site_url = site_url;
        }
        if let Ok(environment) = std::env::var("APP_ENV") {
            match environment.parse() {
                Ok(environment) => app_settings.environment = environment,
                Err(e) => eprintln!("Ignoring APP_ENV: {e}"),
            }
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    /// Apply environment overrides for session settings
    ///
    /// An empty `SESSION_SECRET` is ignored; nothing is generated in its place.
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            if !secret.is_empty() {
                session_settings.session_secret = secret;
            }
        }
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = Some(cookie_secure);
            }
        }
    }

    fn apply_identity_env_overrides(identity_settings: &mut IdentitySettings) {
        if let Ok(api_url) = std::env::var("DATABASE_URL") {
            identity_settings.api_url = api_url;
        }
        if let Ok(api_key) = std::env::var("DATABASE_KEY") {
            identity_settings.api_key = api_key;
        }
        if let Ok(default_role) = std::env::var("DEFAULT_ROLE") {
            identity_settings.default_role = default_role;
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Check the settings the process cannot run without
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Misconfigured` if:
    /// - The session secret is missing or shorter than `MIN_SECRET_LENGTH` bytes
    /// - `site_url` is not an absolute URL
    /// - The identity backend URL is missing or not an absolute URL
    /// - The default role is empty
    pub fn validate(&self) -> Result<(), SettingsError> {
        let secret_len = self.session.session_secret.len();
        if secret_len < MIN_SECRET_LENGTH {
            return Err(SettingsError::Misconfigured(format!(
                "SESSION_SECRET must be set to at least {MIN_SECRET_LENGTH} bytes (got {secret_len}); \
                 run `aztec generate-secret` to create one"
            )));
        }

        url::Url::parse(&self.application.site_url).map_err(|e| {
            SettingsError::Misconfigured(format!(
                "site_url '{}' is not a valid URL: {e}",
                self.application.site_url
            ))
        })?;

        if self.identity.api_url.is_empty() {
            return Err(SettingsError::Misconfigured(
                "DATABASE_URL (identity.api_url) must be set".to_string(),
            ));
        }
        url::Url::parse(&self.identity.api_url).map_err(|e| {
            SettingsError::Misconfigured(format!("identity.api_url is not a valid URL: {e}"))
        })?;

        if self.identity.default_role.is_empty() {
            return Err(SettingsError::Misconfigured(
                "identity.default_role must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether session cookies carry the `Secure` attribute
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookies
            .secure
            .unwrap_or(self.application.environment == Environment::Production)
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Load environment variables from a `.env` file, keeping variables already set
fn load_env_file(path: &Path) {
    if let Ok(contents) = fs::read_to_string(path) {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if std::env::var_os(key).is_none() {
                    std::env::set_var(key, value.trim().trim_matches('"'));
                }
            }
        }
    }
}

// Settings resolution from files and environment
use std::fs;

use aztec::settings::{AztecSettings, Environment, SettingsError};
use aztec::SessionPolicy;
use serial_test::serial;

const VARS: &[&str] = &[
    "AZTEC_SECRETS_DIR",
    "SESSION_SECRET",
    "APP_ENV",
    "COOKIE_SECURE",
    "PORT",
    "DATABASE_URL",
    "DATABASE_KEY",
    "DEFAULT_ROLE",
];

fn clean_env_vars() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

fn write_settings(dir: &tempfile::TempDir, contents: &str) {
    fs::write(dir.path().join("Settings.toml"), contents).unwrap();
}

#[test]
#[serial]
fn test_secrets_dir_settings_then_env_override() {
    clean_env_vars();

    let dir = tempfile::tempdir().unwrap();
    write_settings(
        &dir,
        r#"
        [application]
        port = 9090
        environment = "development"

        [session]
        session_secret = "file-secret-0123456789abcdef-0123456789"

        [identity]
        api_url = "https://file.db.example.com"
        "#,
    );
    std::env::set_var("AZTEC_SECRETS_DIR", dir.path());
    std::env::set_var("DATABASE_URL", "https://env.db.example.com");

    let (settings, sources) = AztecSettings::resolve().unwrap();
    assert_eq!(sources, vec![dir.path().join("Settings.toml")]);
    assert_eq!(settings.application.port, 9090);
    assert_eq!(settings.application.environment, Environment::Development);
    assert_eq!(settings.identity.api_url, "https://env.db.example.com");
    assert!(settings.validate().is_ok());

    let policy = SessionPolicy::from_settings(&settings).unwrap();
    assert!(!policy.cookies().secure());

    clean_env_vars();
}

#[test]
#[serial]
fn test_missing_secret_refuses_to_start() {
    clean_env_vars();

    let dir = tempfile::tempdir().unwrap();
    write_settings(
        &dir,
        r#"
        [identity]
        api_url = "https://db.example.com"
        "#,
    );
    std::env::set_var("AZTEC_SECRETS_DIR", dir.path());

    let (settings, _) = AztecSettings::resolve().unwrap();
    assert_eq!(settings.session.session_secret, "");
    assert!(matches!(
        settings.validate(),
        Err(SettingsError::Misconfigured(_))
    ));

    clean_env_vars();
}

#[test]
#[serial]
fn test_secret_from_environment() {
    clean_env_vars();

    let dir = tempfile::tempdir().unwrap();
    write_settings(
        &dir,
        r#"
        [identity]
        api_url = "https://db.example.com"
        "#,
    );
    std::env::set_var("AZTEC_SECRETS_DIR", dir.path());
    std::env::set_var("SESSION_SECRET", "env-secret-0123456789abcdef-0123456789");

    let (settings, _) = AztecSettings::resolve().unwrap();
    assert!(settings.validate().is_ok());
    // Production by default, so cookies are Secure
    assert!(SessionPolicy::from_settings(&settings)
        .unwrap()
        .cookies()
        .secure());

    clean_env_vars();
}

#[test]
#[serial]
fn test_unparsable_settings_file() {
    clean_env_vars();

    let dir = tempfile::tempdir().unwrap();
    write_settings(&dir, "[session\nsession_secret = ");
    std::env::set_var("AZTEC_SECRETS_DIR", dir.path());

    assert!(matches!(
        AztecSettings::resolve(),
        Err(SettingsError::Parse { .. })
    ));

    clean_env_vars();
}

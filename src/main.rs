#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{from_fn, Logger};
use actix_web::{App, HttpServer};
use anyhow::Context;
use aztec::{
    configure_app, evict_expired_sessions, settings::AztecSettings,
    utils::generate_session_secret, HostedIdentityProvider, IdentityProvider, SessionPolicy,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().nth(1).as_deref() == Some("generate-secret") {
        println!("{}", generate_session_secret());
        return Ok(());
    }

    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = AztecSettings::load().context("Failed to load settings")?;

    let policy = SessionPolicy::from_settings(&settings)
        .context("Failed to initialize session policy")?;
    let identity: Arc<dyn IdentityProvider> = Arc::new(
        HostedIdentityProvider::new(&settings.identity)
            .context("Failed to initialize identity provider")?,
    );

    start_server(settings, policy, identity).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    settings: AztecSettings,
    policy: SessionPolicy,
    identity: Arc<dyn IdentityProvider>,
) -> anyhow::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    // Configure CORS for SPAs
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(from_fn(evict_expired_sessions))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_app(policy.clone(), Arc::clone(&identity)))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .run()
    .await
    .context("Server error")
}

fn print_startup_info(bind_address: &str, settings: &AztecSettings) {
    println!("Starting Aztec on http://{bind_address}");
    println!("Environment: {}", settings.application.environment);
    println!("Site URL: {}", settings.application.site_url);
    println!();
    println!("Session endpoints:");
    println!("  POST     /auth/login   - Password login, sets the session cookie");
    println!("  GET|POST /auth/logout  - Clear the session cookie");
    println!("  GET      /auth/session - Current session details");
    println!();
    println!("Protected endpoints:");
    println!("  GET  /admin - Requires role 'admin'");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping  - Health check");
}

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use multirealm_api::{create_router, AppState};
use multirealm_core::services::{OrganizationService, UserService};
use multirealm_infrastructure::{
    create_pool, run_migrations, EmailNotifier, KeycloakAdminClient, PgOrganizationRepository,
    RealmKeySource,
};
use multirealm_security::JwtService;
use multirealm_shared::{telemetry, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Configuration first: it decides how logging is set up
    let config = AppConfig::load().context("Failed to load configuration")?;
    let _log_guard = telemetry::init_telemetry(&config.logging)?;

    info!("{} starting (env={})", config.app.name, config.app.env);

    // Database
    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    if config.database.run_migrations {
        run_migrations(&pool).await.context("Failed to run migrations")?;
    }
    info!("Database connection established.");

    // Keycloak admin session, shared by every request
    let keycloak = Arc::new(KeycloakAdminClient::new(&config.keycloak)?);
    let jwt = Arc::new(build_jwt_service(&config, &keycloak).await);

    let notifier = Arc::new(EmailNotifier::new(&config.smtp)?);
    let repository = Arc::new(PgOrganizationRepository::new(pool));

    let state = AppState::new(
        Arc::new(OrganizationService::new(repository.clone(), keycloak.clone())),
        Arc::new(UserService::new(repository, keycloak, notifier)),
        jwt,
        config.required_admin_authority(),
    );
    let app = create_router(state);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn build_jwt_service(config: &AppConfig, keycloak: &Arc<KeycloakAdminClient>) -> JwtService {
    let issuer = if config.security.skip_issuer_check {
        None
    } else {
        Some(config.security.issuer.clone().unwrap_or_else(|| config.keycloak.issuer()))
    };

    if let Some(secret) = &config.security.jwt_secret {
        warn!("Verifying bearer tokens with a shared secret; not for production");
        return JwtService::with_secret(secret, issuer);
    }

    let realm = config.keycloak.token_realm();
    let jwt = JwtService::with_key_source(Arc::new(RealmKeySource::new(keycloak.clone(), realm)), issuer);
    // Warm the key cache; tokens retry the download while Keycloak is down.
    if let Err(e) = jwt.refresh_keys().await {
        warn!("Signing keys for realm {} not loaded yet: {}", realm, e);
    }
    jwt
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

use std::sync::Arc;

use trayline::{
    api::{build_router, start_api_server, ApiState},
    auth::{CredentialStore, SigningConfig, TokenService},
    config::{ApiServerConfig, AuthConfig, DatabaseConfig},
    observability::init_tracing,
    storage::create_pool,
    Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing).
    // This must happen before any config is read from environment.
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    init_tracing()?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Trayline auth service");

    // A missing or weak JWT secret fails here, at startup, never per-request.
    let auth_config = AuthConfig::from_env()?;
    let db_config = DatabaseConfig::from_env();
    let api_config = ApiServerConfig::from_env();

    info!(
        issuer = %auth_config.jwt_issuer,
        token_ttl_ms = auth_config.jwt_expire_ms,
        database = %db_config.url,
        "Loaded configuration from environment"
    );

    let pool = create_pool(&db_config).await?;

    let token_service = Arc::new(TokenService::new(&SigningConfig::from(&auth_config)));
    let credential_store = Arc::new(CredentialStore::with_sqlx(pool));

    let router = build_router(ApiState::new(credential_store, token_service));
    start_api_server(&api_config, router).await
}

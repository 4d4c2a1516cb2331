use std::net::SocketAddr;

use anyhow::Context;
use api::db::{self, PgStore};
use api::NoteCipher;
use server::settings::Settings;
use server::AppState;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::new().context("Failed to load settings")?;
    let cipher = NoteCipher::from_hex(&settings.crypto.encryption_key)
        .context("crypto.encryption_key must be 64 hex characters")?;

    let pool = db::connect(&settings.database.url(), settings.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    db::migrate(&pool)
        .await
        .context("Failed to run migrations")?;

    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .context("Failed to migrate session store")?;

    let state = AppState::new(PgStore::new(pool), cipher)
        .with_trust_forwarded_for(settings.server.trust_forwarded_for);
    let app = server::routes::app(state, session_store, &settings.session);

    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

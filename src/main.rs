//! Account authentication server.
//!
//! Loads configuration, connects storage, and serves the auth API.

use account_auth::{
    create_routes, AuthConfig, AuthService, MemoryStore, PgStore, ServerConfig, SessionStore,
    UserStore,
};

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let server = ServerConfig::from_env()?;
    let config = AuthConfig::from_env()?;
    let sweep_interval = config.session_sweep_interval;

    let (users, sessions) = connect_storage(&server).await?;
    let auth = Arc::new(AuthService::new(config, users, sessions)?);

    let _sweeper = auth.sessions().spawn_expiry_sweeper(sweep_interval);

    let app = create_routes(auth)
        .layer(cors_layer(&server)?)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(server.bind_addr()).await?;
    tracing::info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}

async fn connect_storage(
    server: &ServerConfig,
) -> anyhow::Result<(Arc<dyn UserStore>, Arc<dyn SessionStore>)> {
    match &server.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(server.database_max_connections)
                .connect(url)
                .await?;
            tracing::info!("Connected to database");

            let store = Arc::new(PgStore::new(pool));
            store.migrate().await?;

            let users: Arc<dyn UserStore> = store.clone();
            let sessions: Arc<dyn SessionStore> = store;
            Ok((users, sessions))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage; data is lost on restart");
            let store = Arc::new(MemoryStore::new());

            let users: Arc<dyn UserStore> = store.clone();
            let sessions: Arc<dyn SessionStore> = store;
            Ok((users, sessions))
        }
    }
}

fn cors_layer(server: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let Some(origin) = &server.client_url else {
        return Ok(CorsLayer::new());
    };

    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true))
}

use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use migration::MigratorTrait;
use registry::repo::SeaOrmStore;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &configs::ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect, migrate if configured, and assemble the application router.
pub async fn build_app(cfg: &configs::AppConfig) -> Result<Router, StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Migration(e.to_string()))?;
        info!("migrations applied");
    }

    let state = ServerState::new(Arc::new(SeaOrmStore::new(db)));
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = configs::AppConfig::resolve().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting client registry");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

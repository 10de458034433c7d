#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, load_config};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// A migrated connection, or `None` when database tests are disabled
/// (`SKIP_DB_TESTS` set or no `DATABASE_URL`).
pub async fn get_db() -> anyhow::Result<Option<DatabaseConnection>> {
    let _ = dotenvy::dotenv();
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }

    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&load_config()).await else { return false };
            migration::Migrator::up(&db, None).await.is_ok()
        })
        .await;
    if !migrated {
        anyhow::bail!("database migration failed");
    }

    // Fresh connection for the current test's runtime
    let mut cfg = load_config();
    cfg.min_connections = cfg.min_connections.min(1);
    let db = connect_with_config(&cfg).await?;
    Ok(Some(db))
}

//! Database module
//!
//! This module provides the SQLite-backed key-value namespace:
//! - Schema and migrations
//! - Model definitions
//! - Repository layer reading and writing whole collections

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::initialize_database;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 5;

/// Connection options: WAL journal, five second busy timeout
fn connect_options(db_path: &Path) -> std::result::Result<SqliteConnectOptions, sqlx::Error> {
    SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display())).map(|opts| {
        opts.create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
    })
}

/// Open the key-value database and bring its schema up to date.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::info!("Opening database at: {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(connect_options(db_path)?)
        .await?;

    initialize_database(&pool).await?;

    tracing::info!("Database ready");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_pool_uses_wal_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("udc.db");

        let pool = create_pool(&db_path).await.unwrap();

        assert!(db_path.exists());
        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_entries")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(entries, 0);
    }

    #[tokio::test]
    async fn test_reopening_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("udc.db");

        let pool = create_pool(&db_path).await.unwrap();
        Repository::new(pool.clone())
            .set_value("udc_user", "{}")
            .await
            .unwrap();
        pool.close().await;

        let reopened = Repository::new(create_pool(&db_path).await.unwrap());
        assert_eq!(
            reopened.get_value("udc_user").await.unwrap().as_deref(),
            Some("{}")
        );
    }
}

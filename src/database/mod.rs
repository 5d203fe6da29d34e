//! SQLite connection pool and schema migrations

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::{
    assets::MigrationAssets,
    config::DatabaseConfig,
    errors::{RepositoryError, RepositoryResult},
};

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub fn pool(&self) -> Pool<Sqlite> {
        self.pool.clone()
    }

    /// Open (creating if needed) the database named by `config.url`.
    pub async fn new(config: &DatabaseConfig) -> RepositoryResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(10))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// A private in-memory database with the schema applied.
    ///
    /// Every connection to `sqlite::memory:` is a separate database, so the pool
    /// is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> RepositoryResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.migrate().await?;
        Ok(database)
    }

    /// Apply every embedded migration not yet recorded in `_schema_migrations`.
    ///
    /// Each script runs in its own transaction together with its bookkeeping row.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS _schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                checksum TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await?;

        for migration in MigrationAssets::ordered() {
            let checksum = sql_checksum(&migration.sql);
            let recorded: Option<String> =
                sqlx::query_scalar("SELECT checksum FROM _schema_migrations WHERE version = ?")
                    .bind(migration.version)
                    .fetch_optional(&self.pool)
                    .await?;

            match recorded {
                Some(previous) if previous != checksum => {
                    warn!("Migration {} changed after it was applied", migration.name);
                    continue;
                }
                Some(_) => {
                    debug!("Migration {} already applied", migration.name);
                    continue;
                }
                None => {}
            }

            let mut tx = self.pool.begin().await?;
            sqlx::query(&migration.sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::MigrationFailed {
                    name: migration.name.clone(),
                    message: e.to_string(),
                })?;
            sqlx::query("INSERT INTO _schema_migrations (version, name, checksum) VALUES (?, ?, ?)")
                .bind(migration.version)
                .bind(&migration.name)
                .bind(&checksum)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            info!("Applied migration {}", migration.name);
        }

        Ok(())
    }
}

/// Hex digest of a migration script, used to spot edited files
fn sql_checksum(sql: &str) -> String {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    sql.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let database = Database::in_memory().await.unwrap();
        database.migrate().await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _schema_migrations")
            .fetch_one(&database.pool())
            .await
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("radio.db").display());
        let database = Database::new(&DatabaseConfig {
            url,
            max_connections: Some(2),
        })
        .await
        .unwrap();

        database.migrate().await.unwrap();

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&database.pool())
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }
}

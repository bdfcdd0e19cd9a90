//! SQLite-backed per-user preference records.

use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};

use crate::error::AppError;

pub struct PrefsStore {
    pool: SqlitePool,
}

/// One saved preference. Uniquely keyed by `(user_id, pref_type)`; saving
/// the same key again overwrites the value.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    pub user_id: String,
    pub pref_type: String,
    pub value_name: String,
    pub updated_at: Option<String>,
}

impl PrefsStore {
    pub async fn new(database_path: &str) -> Result<Self, AppError> {
        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Config(format!(
                        "failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{database_path}"))
            .map_err(|e| AppError::Config(format!("invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    async fn migrate(&self) -> Result<(), AppError> {
        let migration_sql = include_str!("../../migrations/001_init.sql");
        // Execute each statement separately (sqlx doesn't support multiple
        // statements in one call)
        for statement in migration_sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    /// Insert or overwrite the preference under `(user_id, pref_type)`.
    pub async fn save(
        &self,
        user_id: &str,
        pref_type: &str,
        value_name: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO preferences (user_id, pref_type, value_name, updated_at)
             VALUES (?, ?, ?, datetime('now'))
             ON CONFLICT(user_id, pref_type)
             DO UPDATE SET value_name = excluded.value_name, updated_at = datetime('now')",
        )
        .bind(user_id)
        .bind(pref_type)
        .bind(value_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<PreferenceRecord>, AppError> {
        let records = sqlx::query_as::<_, PreferenceRecord>(
            "SELECT * FROM preferences WHERE user_id = ? ORDER BY pref_type",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Remove every preference the user has saved. Returns how many rows
    /// went away.
    pub async fn delete_for_user(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM preferences WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

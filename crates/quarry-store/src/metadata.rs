//! `SQLite` mirror of chunk line ranges, queried by stack-trace lookups.

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use crate::error::StoreError;

/// Lightweight chunk descriptor; content lives in the vector store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChunkRow {
    pub repository_id: i64,
    pub file_path: String,
    pub start_line: i64,
    pub end_line: i64,
    pub language: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChunkMetadataStore {
    pool: SqlitePool,
}

impl ChunkMetadataStore {
    /// Open (or create) the `SQLite` database and run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let opts = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool that already has migrations applied.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Expose the underlying pool for shared access.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Record a chunk's location. Called by the indexing side; kept here so
    /// the error-trace path is exercisable end to end.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert(&self, row: &ChunkRow) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO chunk_metadata \
             (repository_id, file_path, start_line, end_line, language, name) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(row.repository_id)
        .bind(&row.file_path)
        .bind(row.start_line)
        .bind(row.end_line)
        .bind(&row.language)
        .bind(&row.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Find chunks of a repository whose file path contains `file_fragment`
    /// and whose line range covers `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_covering(
        &self,
        repository_id: i64,
        file_fragment: &str,
        line: i64,
    ) -> Result<Vec<ChunkRow>, StoreError> {
        let rows = sqlx::query_as(
            "SELECT repository_id, file_path, start_line, end_line, language, name \
             FROM chunk_metadata \
             WHERE repository_id = ? \
               AND file_path LIKE '%' || ? || '%' \
               AND start_line <= ? AND end_line >= ?",
        )
        .bind(repository_id)
        .bind(file_fragment)
        .bind(line)
        .bind(line)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Remove every chunk row belonging to a repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_repository(&self, repository_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM chunk_metadata WHERE repository_id = ?")
            .bind(repository_id)
            .execute(&self.pool)
            .await?;
        tracing::debug!(
            repository_id,
            removed = result.rows_affected(),
            "deleted chunk metadata"
        );
        Ok(result.rows_affected())
    }
}

//! Full-text search over post bodies
//!
//! The index is an external contract: anything that can upsert a document
//! keyed by post id and answer ranked keyword queries can implement
//! [`SearchIndex`]. The shipped backend is an FTS5 table living in the
//! same SQLite file as the store.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::error::{DbError, Result};
use crate::types::PostId;

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace the document for `post_id`
    async fn index_post(&self, post_id: PostId, body: &str) -> Result<()>;

    /// Post ids matching every term of `query`, best match first
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<PostId>>;
}

/// FTS5-backed index sharing the store's pool
#[derive(Clone)]
pub struct SqliteSearchIndex {
    pool: SqlitePool,
}

impl SqliteSearchIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Quote every whitespace-separated term so user input is never parsed as
/// FTS5 syntax. Adjacent quoted strings are ANDed by FTS5.
///
/// Returns `None` when the query has no terms.
pub fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

#[async_trait]
impl SearchIndex for SqliteSearchIndex {
    async fn index_post(&self, post_id: PostId, body: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::SqlxError)?;

        sqlx::query("DELETE FROM post_index WHERE rowid = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::SqlxError)?;

        sqlx::query("INSERT INTO post_index (rowid, body) VALUES (?, ?)")
            .bind(post_id)
            .bind(body)
            .execute(&mut *tx)
            .await
            .map_err(DbError::SqlxError)?;

        tx.commit().await.map_err(DbError::SqlxError)?;

        Ok(())
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<PostId>> {
        let Some(expression) = match_expression(query) else {
            return Ok(Vec::new());
        };

        tracing::debug!("FTS query: {}", expression);

        let rows = sqlx::query(
            r#"
            SELECT rowid FROM post_index
            WHERE post_index MATCH ?
            ORDER BY rank
            LIMIT ?
            "#,
        )
        .bind(&expression)
        .bind(max_results as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(|r| r.get::<i64, _>("rowid")).collect())
    }
}

//! SQLite implementation of the [`Store`] contract

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;

use crate::error::{DbError, MicroblogError, Result};
use crate::store::Store;
use crate::types::{
    Account, AccountId, NewAccount, NewPost, Post, PostId, ProfileUpdate, TimelineEntry,
};

/// Columns selected for every post + author read
const TIMELINE_COLUMNS: &str = r#"
    p.id AS post_id, p.body, p.created_at AS post_created_at, p.author_id,
    a.nickname, a.email, a.about_me, a.last_seen, a.created_at AS account_created_at
"#;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(db_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DbError::IoError)?;
        }

        // mode=rwc creates the file on first use
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(DbError::SqlxError)?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, running migrations on it
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DbError::MigrationError)?;

        Ok(Self { pool })
    }

    /// The underlying pool, shared with the search index
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_timeline(
        &self,
        filter: &str,
        id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineEntry>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM posts p
            JOIN accounts a ON a.id = p.author_id
            {}
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ? OFFSET ?
            "#,
            TIMELINE_COLUMNS, filter
        );

        let rows = sqlx::query(&sql)
            .bind(id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(timeline_entry_from_row).collect())
    }

    async fn fetch_accounts(&self, sql: &str, id: AccountId) -> Result<Vec<Account>> {
        let rows = sqlx::query(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(account_from_row).collect())
    }
}

fn account_from_row(r: &SqliteRow) -> Account {
    Account {
        id: r.get("id"),
        nickname: r.get("nickname"),
        email: r.get("email"),
        about_me: r.get("about_me"),
        last_seen: r.get("last_seen"),
        created_at: r.get("created_at"),
    }
}

fn timeline_entry_from_row(r: &SqliteRow) -> TimelineEntry {
    let author_id: AccountId = r.get("author_id");
    TimelineEntry {
        post: Post {
            id: r.get("post_id"),
            body: r.get("body"),
            created_at: r.get("post_created_at"),
            author_id,
        },
        author: Account {
            id: author_id,
            nickname: r.get("nickname"),
            email: r.get("email"),
            about_me: r.get("about_me"),
            last_seen: r.get("last_seen"),
            created_at: r.get("account_created_at"),
        },
    }
}

/// Turn unique-constraint failures into `Conflict`, everything else stays a DB error
fn conflict_or_db(err: sqlx::Error, message: &str) -> MicroblogError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            MicroblogError::Conflict(message.to_string())
        }
        _ => DbError::SqlxError(err).into(),
    }
}

#[async_trait]
impl Store for Database {
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut tx = self.pool.begin().await.map_err(DbError::SqlxError)?;

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (nickname, email, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&account.nickname)
        .bind(&account.email)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or_db(e, "nickname or email is already registered"))?;

        let id = result.last_insert_rowid();

        // Every account follows itself so its own posts land in its feed
        sqlx::query("INSERT INTO follows (follower_id, followed_id) VALUES (?, ?)")
            .bind(id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::SqlxError)?;

        tx.commit().await.map_err(DbError::SqlxError)?;

        Ok(Account {
            id,
            nickname: account.nickname,
            email: account.email,
            about_me: None,
            last_seen: None,
            created_at: account.created_at,
        })
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, nickname, email, about_me, last_seen, created_at
            FROM accounts WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn account_by_nickname(&self, nickname: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, nickname, email, about_me, last_seen, created_at
            FROM accounts WHERE nickname = ?
            "#,
        )
        .bind(nickname)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, nickname, email, about_me, last_seen, created_at
            FROM accounts WHERE email = ? COLLATE NOCASE
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn nickname_exists(&self, nickname: &str) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM accounts WHERE nickname = ?) AS present")
            .bind(nickname)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(row.get::<i64, _>("present") != 0)
    }

    async fn update_profile(&self, id: AccountId, update: &ProfileUpdate) -> Result<Account> {
        let result = sqlx::query("UPDATE accounts SET nickname = ?, about_me = ? WHERE id = ?")
            .bind(&update.nickname)
            .bind(&update.about_me)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_or_db(
                    e,
                    "This nickname is already in use. Please choose another one.",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(MicroblogError::NotFound(format!("Account {} not found.", id)));
        }

        self.account_by_id(id)
            .await?
            .ok_or_else(|| MicroblogError::NotFound(format!("Account {} not found.", id)))
    }

    async fn touch_last_seen(&self, id: AccountId, at: i64) -> Result<()> {
        sqlx::query("UPDATE accounts SET last_seen = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    async fn is_following(&self, follower: AccountId, followed: AccountId) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows WHERE follower_id = ? AND followed_id = ?
            ) AS present
            "#,
        )
        .bind(follower)
        .bind(followed)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.get::<i64, _>("present") != 0)
    }

    async fn insert_follow(&self, follower: AccountId, followed: AccountId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followed_id)
            VALUES (?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(follower)
        .bind(followed)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_follow(&self, follower: AccountId, followed: AccountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followed_id = ?")
            .bind(follower)
            .bind(followed)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(result.rows_affected() == 1)
    }

    async fn followers_of(&self, id: AccountId) -> Result<Vec<Account>> {
        self.fetch_accounts(
            r#"
            SELECT a.id, a.nickname, a.email, a.about_me, a.last_seen, a.created_at
            FROM follows f
            JOIN accounts a ON a.id = f.follower_id
            WHERE f.followed_id = ?
            ORDER BY a.nickname
            "#,
            id,
        )
        .await
    }

    async fn followed_by(&self, id: AccountId) -> Result<Vec<Account>> {
        self.fetch_accounts(
            r#"
            SELECT a.id, a.nickname, a.email, a.about_me, a.last_seen, a.created_at
            FROM follows f
            JOIN accounts a ON a.id = f.followed_id
            WHERE f.follower_id = ?
            ORDER BY a.nickname
            "#,
            id,
        )
        .await
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (body, created_at, author_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&post.body)
        .bind(post.created_at)
        .bind(post.author_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(Post {
            id: result.last_insert_rowid(),
            body: post.body,
            created_at: post.created_at,
            author_id: post.author_id,
        })
    }

    async fn followed_posts(
        &self,
        id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineEntry>> {
        self.fetch_timeline(
            "JOIN follows f ON f.followed_id = p.author_id WHERE f.follower_id = ?",
            id,
            limit,
            offset,
        )
        .await
    }

    async fn posts_by_author(
        &self,
        id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineEntry>> {
        self.fetch_timeline("WHERE p.author_id = ?", id, limit, offset)
            .await
    }

    async fn posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<TimelineEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT {}
            FROM posts p
            JOIN accounts a ON a.id = p.author_id
            WHERE p.id IN ({})
            "#,
            TIMELINE_COLUMNS, placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(timeline_entry_from_row).collect())
    }
}

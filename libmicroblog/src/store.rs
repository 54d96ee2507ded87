//! Persistence contract for accounts, posts and follow edges
//!
//! Services only ever talk to a `Store`, so the SQLite-backed
//! [`Database`](crate::db::Database) can be swapped for any backend with
//! unique constraints and ordered range queries.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Account, AccountId, NewAccount, NewPost, Post, PostId, ProfileUpdate, TimelineEntry,
};

#[async_trait]
pub trait Store: Send + Sync {
    // Accounts

    /// Insert an account and its self-follow edge in one transaction
    ///
    /// # Errors
    ///
    /// Returns `MicroblogError::Conflict` if the nickname or email is taken.
    async fn create_account(&self, account: NewAccount) -> Result<Account>;

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    async fn account_by_nickname(&self, nickname: &str) -> Result<Option<Account>>;

    /// Case-insensitive lookup
    async fn account_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn nickname_exists(&self, nickname: &str) -> Result<bool>;

    /// # Errors
    ///
    /// Returns `MicroblogError::Conflict` if the new nickname is taken.
    async fn update_profile(&self, id: AccountId, update: &ProfileUpdate) -> Result<Account>;

    async fn touch_last_seen(&self, id: AccountId, at: i64) -> Result<()>;

    // Follow edges

    async fn is_following(&self, follower: AccountId, followed: AccountId) -> Result<bool>;

    /// Insert an edge; `false` if it already existed
    async fn insert_follow(&self, follower: AccountId, followed: AccountId) -> Result<bool>;

    /// Delete an edge; `false` if there was none
    async fn delete_follow(&self, follower: AccountId, followed: AccountId) -> Result<bool>;

    /// Accounts with an edge pointing at `id`, ordered by nickname
    async fn followers_of(&self, id: AccountId) -> Result<Vec<Account>>;

    /// Accounts `id` has an edge to, ordered by nickname
    async fn followed_by(&self, id: AccountId) -> Result<Vec<Account>>;

    // Posts

    async fn create_post(&self, post: NewPost) -> Result<Post>;

    /// Posts by accounts `id` follows directly, newest first, ties by id
    async fn followed_posts(
        &self,
        id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineEntry>>;

    /// Posts written by `id`, newest first, ties by id
    async fn posts_by_author(
        &self,
        id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineEntry>>;

    /// Fetch posts by id; missing ids are skipped, order is unspecified
    async fn posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<TimelineEntry>>;
}

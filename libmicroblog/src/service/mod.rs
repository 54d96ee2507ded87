//! Service layer for Microblog
//!
//! The CLIs talk to a single facade, `MicroblogService`, which hands out
//! specialized sub-services sharing one store, one search index and one
//! notification queue:
//!
//! - `AccountService`: login, sign-in and profile editing
//! - `GraphService`: follow and unfollow, follower lists
//! - `PostingService`: publishing posts
//! - `FeedService`: home feed and profile timelines
//! - `SearchService`: keyword search over posts
//!
//! # Example
//!
//! ```no_run
//! use libmicroblog::service::MicroblogService;
//!
//! # async fn example() -> libmicroblog::Result<()> {
//! let service = MicroblogService::new().await?;
//!
//! let viewer = service.accounts().sign_in("john").await?;
//! let susan = service.accounts().find_by_nickname("susan").await?;
//! service.graph().follow(&viewer, &susan).await?;
//!
//! let feed = service.feed().home_feed(&viewer, 1).await?;
//! for entry in feed.items {
//!     println!("{}: {}", entry.author.nickname, entry.post.body);
//! }
//!
//! service.flush_notifications().await?;
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod feed;
pub mod graph;
pub mod posting;
pub mod search;
pub mod validation;

pub use accounts::LoginOutcome;

use self::accounts::AccountService;
use self::feed::FeedService;
use self::graph::GraphService;
use self::posting::PostingService;
use self::search::SearchService;
use crate::error::{ConfigError, MicroblogError};
use crate::notify::{notifier_from_config, NotificationQueue, Notifier};
use crate::search::{SearchIndex, SqliteSearchIndex};
use crate::store::Store;
use crate::{Config, Database, Result};
use std::sync::Arc;

/// Current time as Unix seconds
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Main service facade that coordinates all sub-services
pub struct MicroblogService {
    store: Arc<dyn Store>,
    accounts: AccountService,
    graph: GraphService,
    posting: PostingService,
    feed: FeedService,
    search: SearchService,
    notifications: NotificationQueue,
}

impl MicroblogService {
    /// Create a service from the configuration at the default location
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration cannot be parsed
    /// - Database cannot be opened or migrated
    /// - Mail is enabled with an invalid sender address
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config).await
    }

    /// Create a service backed by SQLite, with the notifier picked from
    /// `config.mail`
    pub async fn from_config(config: Config) -> Result<Self> {
        let db_path = crate::config::resolve_db_path(Some(&config.database.path))?;
        let db_path_str = db_path.to_str().ok_or_else(|| {
            MicroblogError::Config(ConfigError::MissingField(
                "Invalid database path".to_string(),
            ))
        })?;
        let db = Database::new(db_path_str).await?;

        let index = Arc::new(SqliteSearchIndex::new(db.pool().clone()));
        let notifier = notifier_from_config(&config.mail)?;

        Ok(Self::with_components(&config, Arc::new(db), index, notifier))
    }

    /// Assemble the service from explicit components
    ///
    /// Spawns the notification worker, so this must run inside a Tokio
    /// runtime.
    pub fn with_components(
        config: &Config,
        store: Arc<dyn Store>,
        index: Arc<dyn SearchIndex>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let notifications = NotificationQueue::spawn(notifier, config.mail.queue_capacity);

        let accounts = AccountService::new(Arc::clone(&store));
        let graph = GraphService::new(Arc::clone(&store), notifications.clone());
        let posting = PostingService::new(Arc::clone(&store), Arc::clone(&index));
        let feed = FeedService::new(Arc::clone(&store), config.feed.posts_per_page);
        let search = SearchService::new(Arc::clone(&store), index, config.search.max_results);

        Self {
            store,
            accounts,
            graph,
            posting,
            feed,
            search,
            notifications,
        }
    }

    /// Direct access to the store
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn graph(&self) -> &GraphService {
        &self.graph
    }

    pub fn posting(&self) -> &PostingService {
        &self.posting
    }

    pub fn feed(&self) -> &FeedService {
        &self.feed
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    /// Wait for queued notifications to be attempted
    ///
    /// Call before the process exits; anything still queued is lost otherwise.
    pub async fn flush_notifications(&self) -> Result<()> {
        self.notifications.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[tokio::test]
    #[serial]
    async fn test_from_config_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("microblog.db");
        let config = Config::with_database(db_path.to_str().unwrap());

        let service = MicroblogService::from_config(config).await.unwrap();
        assert!(db_path.exists());

        let outcome = service
            .accounts()
            .login("john@example.com", None)
            .await
            .unwrap();
        assert!(service
            .store()
            .is_following(outcome.account.id, outcome.account.id)
            .await
            .unwrap());

        service.flush_notifications().await.unwrap();
    }
}

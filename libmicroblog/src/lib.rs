//! Microblog - follow graph, feeds and search for a small social site
//!
//! This library holds the core of the microblog: accounts, the directed
//! follow graph, feed assembly, full-text search and follower
//! notifications. The `mb-*` command-line tools are thin wrappers over
//! [`service::MicroblogService`].

pub mod avatar;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod nickname;
pub mod notify;
pub mod search;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use avatar::avatar;
pub use config::Config;
pub use db::Database;
pub use error::{MicroblogError, Result};
pub use notify::{MockNotifier, Notification, NotificationQueue, Notifier};
pub use search::{SearchIndex, SqliteSearchIndex};
pub use service::MicroblogService;
pub use store::Store;
pub use types::{Account, FollowCounts, Page, Post, TimelineEntry, Viewer};

//! Feed assembly
//!
//! A feed is every post whose author the account follows directly, newest
//! first. Accounts follow themselves, so their own posts are included.

use std::sync::Arc;

use crate::error::Result;
use crate::store::Store;
use crate::types::{page_window, Account, Page, TimelineEntry, Viewer};

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn Store>,
    posts_per_page: u32,
}

impl FeedService {
    pub fn new(store: Arc<dyn Store>, posts_per_page: u32) -> Self {
        Self {
            store,
            posts_per_page,
        }
    }

    /// The signed-in viewer's feed at the configured page size
    pub async fn home_feed(&self, viewer: &Viewer, page: u32) -> Result<Page<TimelineEntry>> {
        let account = viewer.account()?;
        self.followed_posts(account, page, self.posts_per_page).await
    }

    /// Posts by accounts `account` follows, ordered by time then id, descending
    pub async fn followed_posts(
        &self,
        account: &Account,
        page: u32,
        per_page: u32,
    ) -> Result<Page<TimelineEntry>> {
        let (limit, offset) = page_window(page, per_page)?;
        let entries = self.store.followed_posts(account.id, limit, offset).await?;
        Ok(Page::from_overfetch(entries, page, per_page))
    }

    /// Posts written by `account`, for its profile page
    pub async fn user_posts(&self, account: &Account, page: u32) -> Result<Page<TimelineEntry>> {
        let (limit, offset) = page_window(page, self.posts_per_page)?;
        let entries = self.store.posts_by_author(account.id, limit, offset).await?;
        Ok(Page::from_overfetch(entries, page, self.posts_per_page))
    }
}

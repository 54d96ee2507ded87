//! Follow graph service

use std::sync::Arc;

use crate::error::Result;
use crate::notify::{Notification, NotificationQueue};
use crate::store::Store;
use crate::types::{Account, FollowCounts, Viewer};

/// Mutations and queries over follow edges
///
/// `follow` and `unfollow` return `Ok(None)` when the graph is already in the
/// requested state; that is a normal outcome, not an error.
#[derive(Clone)]
pub struct GraphService {
    store: Arc<dyn Store>,
    notifications: NotificationQueue,
}

impl GraphService {
    pub fn new(store: Arc<dyn Store>, notifications: NotificationQueue) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Make the viewer follow `target`
    ///
    /// Returns the follower on a new edge. A new edge to someone else queues
    /// a "new follower" notification for `target`.
    pub async fn follow(&self, viewer: &Viewer, target: &Account) -> Result<Option<Account>> {
        let follower = viewer.account()?;

        if !self.store.insert_follow(follower.id, target.id).await? {
            tracing::debug!("{} already follows {}", follower.nickname, target.nickname);
            return Ok(None);
        }

        tracing::info!(follower = %follower.nickname, followed = %target.nickname, "Follow");

        if follower.id != target.id {
            self.notifications.enqueue(Notification::NewFollower {
                recipient: target.clone(),
                follower: follower.clone(),
            });
        }

        Ok(Some(follower.clone()))
    }

    /// Remove the viewer's edge to `target`
    ///
    /// The self-edge is never removed; unfollowing oneself is a no-op.
    pub async fn unfollow(&self, viewer: &Viewer, target: &Account) -> Result<Option<Account>> {
        let follower = viewer.account()?;

        if follower.id == target.id {
            return Ok(None);
        }

        if !self.store.delete_follow(follower.id, target.id).await? {
            return Ok(None);
        }

        tracing::info!(follower = %follower.nickname, followed = %target.nickname, "Unfollow");
        Ok(Some(follower.clone()))
    }

    pub async fn is_following(&self, follower: &Account, followed: &Account) -> Result<bool> {
        self.store.is_following(follower.id, followed.id).await
    }

    /// Accounts following `account`, without `account` itself
    pub async fn followers(&self, account: &Account) -> Result<Vec<Account>> {
        let mut followers = self.store.followers_of(account.id).await?;
        followers.retain(|a| a.id != account.id);
        Ok(followers)
    }

    /// Accounts `account` follows, without `account` itself
    pub async fn following(&self, account: &Account) -> Result<Vec<Account>> {
        let mut following = self.store.followed_by(account.id).await?;
        following.retain(|a| a.id != account.id);
        Ok(following)
    }

    pub async fn follow_counts(&self, account: &Account) -> Result<FollowCounts> {
        Ok(FollowCounts {
            followers: self.followers(account).await?.len() as u64,
            following: self.following(account).await?.len() as u64,
        })
    }
}

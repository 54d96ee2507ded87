//! Core types for Microblog

use serde::{Deserialize, Serialize};

use crate::error::{MicroblogError, Result};

pub type AccountId = i64;
pub type PostId = i64;

/// Maximum post body length in characters
pub const MAX_POST_LENGTH: usize = 200;
pub const MAX_NICKNAME_LENGTH: usize = 64;
pub const MAX_EMAIL_LENGTH: usize = 120;
pub const MAX_ABOUT_ME_LENGTH: usize = 140;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub nickname: String,
    pub email: String,
    pub about_me: Option<String>,
    /// Unix timestamp of the last authenticated action
    pub last_seen: Option<i64>,
    pub created_at: i64,
}

impl Account {
    /// Gravatar URL for this account at the given pixel size
    pub fn avatar(&self, size: u32) -> String {
        crate::avatar::avatar(&self.email, size)
    }
}

/// Values needed to insert an account row
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub nickname: String,
    pub email: String,
    pub created_at: i64,
}

/// Owner-editable profile fields
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub nickname: String,
    pub about_me: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub body: String,
    /// Unix timestamp, seconds
    pub created_at: i64,
    pub author_id: AccountId,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: AccountId,
    pub body: String,
    pub created_at: i64,
}

/// A post together with the account that wrote it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub post: Post,
    pub author: Account,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

/// Who is performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated(Account),
}

impl Viewer {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }

    /// The signed-in account, or `Unauthorized` for anonymous viewers
    pub fn account(&self) -> Result<&Account> {
        match self {
            Viewer::Authenticated(account) => Ok(account),
            Viewer::Anonymous => Err(MicroblogError::Unauthorized(
                "Please log in to access this page.".to_string(),
            )),
        }
    }
}

impl From<Account> for Viewer {
    fn from(account: Account) -> Self {
        Viewer::Authenticated(account)
    }
}

/// One page of an ordered result set (pages are 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Build a page from a slice fetched with `per_page + 1` as the limit
    ///
    /// The extra row only signals that another page exists and is dropped.
    pub fn from_overfetch(mut items: Vec<T>, page: u32, per_page: u32) -> Self {
        let has_next = items.len() > per_page as usize;
        items.truncate(per_page as usize);
        Self {
            items,
            page,
            per_page,
            has_next,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.page.checked_add(1).filter(|_| self.has_next)
    }

    pub fn prev_page(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }
}

/// Validate a 1-based page request and convert it to (limit, offset)
///
/// The limit is one more than `per_page` so callers can detect a next page.
pub fn page_window(page: u32, per_page: u32) -> Result<(i64, i64)> {
    if page == 0 {
        return Err(MicroblogError::InvalidInput(
            "Page numbers start at 1".to_string(),
        ));
    }
    if per_page == 0 {
        return Err(MicroblogError::InvalidInput(
            "Page size must be at least 1".to_string(),
        ));
    }
    let offset = i64::from(page - 1)
        .checked_mul(i64::from(per_page))
        .filter(|offset| offset.checked_add(i64::from(per_page) + 1).is_some())
        .ok_or_else(|| MicroblogError::InvalidInput(format!("Page {} is out of range", page)))?;
    Ok((i64::from(per_page) + 1, offset))
}

//! Account service: login, sign-in and profile editing

use serde::Serialize;
use std::sync::Arc;

use crate::error::{MicroblogError, Result};
use crate::nickname;
use crate::service::{now, validation};
use crate::store::Store;
use crate::types::{Account, NewAccount, ProfileUpdate, Viewer};

/// Result of a login: the account and whether it was created just now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub account: Account,
    pub created: bool,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Resolve a verified identity to an account, creating it on first login
    ///
    /// New accounts take `nickname_hint` when given, otherwise the local part
    /// of the email, made unique with a numeric suffix. The account and its
    /// self-follow are created together.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the email is empty or the derived nickname is unusable
    /// - `Conflict` if a concurrent login claimed the same nickname or email
    pub async fn login(&self, email: &str, nickname_hint: Option<&str>) -> Result<LoginOutcome> {
        let email = validation::email(email)?;

        if let Some(account) = self.store.account_by_email(&email).await? {
            tracing::debug!("Existing account {} logged in", account.nickname);
            return Ok(LoginOutcome {
                account,
                created: false,
            });
        }

        let desired = match nickname_hint.map(str::trim).filter(|hint| !hint.is_empty()) {
            Some(hint) => nickname::sanitize(hint),
            None => nickname::sanitize(nickname::from_email(&email)),
        };
        let desired = validation::nickname(&desired)?;
        let nickname = nickname::unique_nickname(self.store.as_ref(), &desired).await?;

        let account = self
            .store
            .create_account(NewAccount {
                nickname,
                email,
                created_at: now(),
            })
            .await?;

        tracing::info!(id = account.id, nickname = %account.nickname, "Created account");

        Ok(LoginOutcome {
            account,
            created: true,
        })
    }

    /// Act as an existing account, recording the visit in `last_seen`
    pub async fn sign_in(&self, nickname: &str) -> Result<Viewer> {
        let mut account = self.find_by_nickname(nickname).await?;
        let seen = now();
        self.store.touch_last_seen(account.id, seen).await?;
        account.last_seen = Some(seen);
        Ok(Viewer::Authenticated(account))
    }

    /// Viewer for an optional acting nickname; `None` is anonymous
    pub async fn viewer(&self, nickname: Option<&str>) -> Result<Viewer> {
        match nickname {
            Some(nickname) => self.sign_in(nickname).await,
            None => Ok(Viewer::Anonymous),
        }
    }

    pub async fn find_by_nickname(&self, nickname: &str) -> Result<Account> {
        self.store
            .account_by_nickname(nickname)
            .await?
            .ok_or_else(|| MicroblogError::NotFound(format!("User {} not found.", nickname)))
    }

    /// Change the viewer's own nickname and about-me text
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for anonymous viewers
    /// - `InvalidInput` if either field breaks the length rules
    /// - `Conflict` if the new nickname belongs to someone else
    pub async fn edit_profile(
        &self,
        viewer: &Viewer,
        nickname: &str,
        about_me: Option<&str>,
    ) -> Result<Account> {
        let account = viewer.account()?;
        let update = ProfileUpdate {
            nickname: validation::nickname(nickname)?,
            about_me: validation::about_me(about_me)?,
        };

        if update.nickname != account.nickname
            && self.store.nickname_exists(&update.nickname).await?
        {
            return Err(MicroblogError::Conflict(
                "This nickname is already in use. Please choose another one.".to_string(),
            ));
        }

        let updated = self.store.update_profile(account.id, &update).await?;
        tracing::info!(id = updated.id, nickname = %updated.nickname, "Profile updated");
        Ok(updated)
    }
}

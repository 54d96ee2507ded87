//! Outbound notifications
//!
//! Follow events produce [`Notification`]s that are handed to a
//! [`NotificationQueue`]. The queue owns a single worker task that passes
//! each notification to the configured [`Notifier`]. Delivery is
//! best-effort and at-most-once:
//!
//! - `enqueue` never waits; a full or closed queue drops the notification
//! - failed deliveries are logged and never retried
//! - `flush` waits until everything enqueued before it has been attempted

pub mod mock;
pub mod smtp;

use askama::Template;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::config::MailConfig;
use crate::error::{NotifyError, Result};
use crate::types::Account;

pub use mock::MockNotifier;
pub use smtp::SmtpNotifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// `follower` started following `recipient`
    NewFollower { recipient: Account, follower: Account },
}

/// Subject and bodies of a notification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub plain_text: String,
    pub html: String,
}

/// Plain-text body of a new follower email
#[derive(Template)]
#[template(path = "follower_email.txt", escape = "none")]
struct FollowerEmailText<'a> {
    recipient: &'a Account,
    follower: &'a Account,
    profile_url: &'a str,
}

/// HTML body of a new follower email
#[derive(Template)]
#[template(path = "follower_email.html", escape = "html")]
struct FollowerEmailHtml<'a> {
    recipient: &'a Account,
    follower: &'a Account,
    profile_url: &'a str,
    avatar_url: &'a str,
    about_me: &'a str,
}

impl Notification {
    pub fn recipient(&self) -> &Account {
        match self {
            Notification::NewFollower { recipient, .. } => recipient,
        }
    }

    /// Render the email for this notification; `base_url` prefixes profile links
    pub fn render(&self, base_url: &str) -> Result<RenderedEmail> {
        match self {
            Notification::NewFollower {
                recipient,
                follower,
            } => {
                let profile_url = format!(
                    "{}/user/{}",
                    base_url.trim_end_matches('/'),
                    follower.nickname
                );
                let avatar_url = follower.avatar(50);

                let plain_text = FollowerEmailText {
                    recipient,
                    follower,
                    profile_url: &profile_url,
                }
                .render()
                .map_err(NotifyError::Template)?;

                let html = FollowerEmailHtml {
                    recipient,
                    follower,
                    profile_url: &profile_url,
                    avatar_url: &avatar_url,
                    about_me: follower.about_me.as_deref().unwrap_or(""),
                }
                .render()
                .map_err(NotifyError::Template)?;

                Ok(RenderedEmail {
                    subject: format!("[microblog] {} is now following you!", follower.nickname),
                    plain_text,
                    html,
                })
            }
        }
    }
}

/// Delivers a single notification
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Notifier used when mail is disabled: records the event in the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        match notification {
            Notification::NewFollower {
                recipient,
                follower,
            } => {
                tracing::info!(
                    recipient = %recipient.nickname,
                    follower = %follower.nickname,
                    "New follower (mail disabled)"
                );
            }
        }
        Ok(())
    }
}

/// Pick the notifier for a mail configuration
pub fn notifier_from_config(config: &MailConfig) -> Result<Arc<dyn Notifier>> {
    if config.enabled {
        Ok(Arc::new(SmtpNotifier::from_config(config)?))
    } else {
        Ok(Arc::new(LogNotifier))
    }
}

enum Envelope {
    Deliver(Notification),
    Flush(oneshot::Sender<()>),
}

/// Bounded handoff between request handling and the delivery worker
#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<Envelope>,
}

impl NotificationQueue {
    /// Start the delivery worker. Must be called inside a Tokio runtime.
    pub fn spawn(notifier: Arc<dyn Notifier>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_worker(notifier, receiver));
        Self { sender }
    }

    /// Queue a notification without waiting
    pub fn enqueue(&self, notification: Notification) {
        let recipient = notification.recipient().nickname.clone();
        match self.sender.try_send(Envelope::Deliver(notification)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(%recipient, "Notification queue full, dropping notification");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(%recipient, "Notification queue closed, dropping notification");
            }
        }
    }

    /// Wait until every notification enqueued so far has been attempted
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.sender
            .send(Envelope::Flush(done_tx))
            .await
            .map_err(|_| NotifyError::QueueClosed)?;
        done_rx.await.map_err(|_| NotifyError::QueueClosed)?;
        Ok(())
    }
}

async fn run_worker(notifier: Arc<dyn Notifier>, mut receiver: mpsc::Receiver<Envelope>) {
    while let Some(envelope) = receiver.recv().await {
        match envelope {
            Envelope::Deliver(notification) => {
                if let Err(e) = notifier.deliver(&notification).await {
                    tracing::warn!(
                        recipient = %notification.recipient().nickname,
                        error = %e,
                        "Failed to deliver notification"
                    );
                }
            }
            Envelope::Flush(done) => {
                // The flusher may have gone away; nothing to report then
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("Notification worker stopped");
}

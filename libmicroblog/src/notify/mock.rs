//! Recording notifier for tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{MicroblogError, Result};
use crate::notify::{Notification, Notifier};

/// Notifier that records what it was asked to deliver
///
/// Clones share the same record, so a test can keep one handle and give the
/// other to a [`NotificationQueue`](crate::notify::NotificationQueue).
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    fails: bool,
    attempts: Arc<Mutex<usize>>,
    delivered: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails
    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::default()
        }
    }

    /// Successfully delivered notifications, oldest first
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn delivery_count(&self) -> usize {
        self.delivered.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// Deliveries attempted, successful or not
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().map(|a| *a).unwrap_or(0)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        if let Ok(mut attempts) = self.attempts.lock() {
            *attempts += 1;
        }

        if self.fails {
            return Err(MicroblogError::InvalidInput(
                "mock notifier configured to fail".to_string(),
            ));
        }

        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push(notification.clone());
        }
        Ok(())
    }
}

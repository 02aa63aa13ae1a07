//! Self-expiring notification feed
//!
//! Both consoles keep one. Every push is stamped with a deadline `ttl` after
//! it was made and [`NotificationFeed::expire`] drops entries whose deadline
//! has passed. Entries stay in insertion order; there is no deduplication and
//! no cap.

use std::time::Duration;

use crate::types::{Notification, NotificationKind};

/// Default time a notification stays visible
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
struct Pending {
    notification: Notification,
    expires_at: Duration,
}

/// Ephemeral queue of console notifications
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    ttl: Duration,
    entries: Vec<Pending>,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl NotificationFeed {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Vec::new(),
        }
    }

    /// Append a notification created at virtual time `now`
    pub fn push(
        &mut self,
        id: String,
        message: impl Into<String>,
        kind: NotificationKind,
        now: Duration,
    ) {
        let message = message.into();
        tracing::debug!(id = %id, message = %message, "notification pushed");
        self.entries.push(Pending {
            notification: Notification { id, message, kind },
            expires_at: now + self.ttl,
        });
    }

    /// Drop every entry whose deadline is at or before `now`
    pub fn expire(&mut self, now: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|p| p.expires_at > now);
        before - self.entries.len()
    }

    /// Visible notifications, oldest first
    pub fn active(&self) -> Vec<Notification> {
        self.entries.iter().map(|p| p.notification.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any visible notification mentions `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .iter()
            .any(|p| p.notification.message.contains(needle))
    }
}

//! Notification delivery seam
//!
//! Mail and chat channels never talk to a network themselves. They build a
//! [`Notification`] and hand it to a [`Transport`]. A logger without an
//! injected transport uses [`Discard`]. The [`Outbox`] keeps notifications
//! in memory for tests and the CLI; applications plug in their own SMTP or
//! chat client by implementing the trait.

use crate::channels::Notification;
use calltrail_errors::{CalltrailError, LogError, Result};
use std::sync::{Arc, Mutex};

/// Delivers notifications produced by the mail and chat channels
///
/// A failed delivery never fails the logging call; the logger reports it as
/// a facility error event instead.
pub trait Transport: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Drops every notification
///
/// Default transport of a logger, so nothing accumulates when no delivery
/// client is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl Transport for Discard {
    fn deliver(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

/// In-memory transport
///
/// Clones share the same queue, so a test can keep one handle and give the
/// other to a logger.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification delivered so far, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().map(|n| n.clone()).unwrap_or_default()
    }

    /// Notifications delivered through the named channel
    pub fn for_channel(&self, channel: &str) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.envelope.channel() == channel)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().map(|n| n.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.sent.lock().map(|mut n| n.clear()).ok();
    }
}

impl Transport for Outbox {
    fn deliver(&self, notification: &Notification) -> Result<()> {
        let mut sent = self.sent.lock().map_err(|_| {
            LogError::from(CalltrailError::TransportFailed {
                channel: notification.envelope.channel().to_string(),
                message: "outbox lock poisoned".to_string(),
            })
        })?;
        sent.push(notification.clone());
        Ok(())
    }
}

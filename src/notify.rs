//! Notification dispatch boundary
//!
//! Actual delivery (system tray, mobile channel) is a platform concern, so
//! the scheduler only talks to the [`Notifier`] trait. Implementations are
//! expected to treat the reminder id as the platform notification id, which
//! makes re-delivery for the same reminder replace rather than stack.

use crate::errors::Result;
use async_trait::async_trait;
use tracing::info;

/// Delivery channel for user-facing notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Asks the platform for permission to post notifications. Returns
    /// whether permission is granted; dispatch on a denied channel is
    /// allowed to silently drop.
    async fn request_permission(&self) -> Result<bool>;

    /// Delivers one notification keyed by the reminder id.
    async fn notify(&self, id: i32, title: &str, body: &str) -> Result<()>;
}

/// Notifier that writes notifications to the log. Stands in for a platform
/// channel in the headless daemon and during development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn request_permission(&self) -> Result<bool> {
        Ok(true)
    }

    async fn notify(&self, id: i32, title: &str, body: &str) -> Result<()> {
        info!(id, title, body, "notification");
        Ok(())
    }
}

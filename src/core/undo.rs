//! Expiring undo handles for add and delete
//!
//! After adding or deleting a reminder the caller gets a short-lived chance
//! to take it back. An [`UndoEntry`] captures the exact inverse of the
//! mutation just performed and refuses to run once its window has passed,
//! so a stale handle can never clobber newer state.

use crate::{
    core::store::ReminderStore,
    entities::reminder,
    errors::{Error, Result},
};
use std::time::{Duration, Instant};
use tracing::debug;

/// How long an undo handle stays usable.
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(5);

/// The mutation an [`UndoEntry`] will reverse.
#[derive(Debug, Clone)]
pub enum UndoAction {
    /// A reminder was just created; undoing deletes it again.
    Created(reminder::Model),
    /// A reminder was just deleted; undoing restores it under its
    /// original id, exactly as it was.
    Deleted(reminder::Model),
}

/// One-shot, time-limited handle that reverses a single mutation.
#[derive(Debug)]
pub struct UndoEntry {
    action: UndoAction,
    created_at: Instant,
    window: Duration,
}

impl UndoEntry {
    /// Wraps an action with the default window.
    #[must_use]
    pub fn new(action: UndoAction) -> Self {
        Self::with_window(action, DEFAULT_UNDO_WINDOW)
    }

    /// Wraps an action with an explicit window.
    #[must_use]
    pub fn with_window(action: UndoAction, window: Duration) -> Self {
        Self {
            action,
            created_at: Instant::now(),
            window,
        }
    }

    /// Whether the window has already closed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.window
    }

    /// Applies the inverse mutation, consuming the handle.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when the window has expired; otherwise
    /// whatever the underlying store operation returns.
    pub async fn undo(self, store: &ReminderStore) -> Result<()> {
        if self.is_expired() {
            return Err(Error::Validation {
                message: "Undo window has expired".to_string(),
            });
        }

        match self.action {
            UndoAction::Created(reminder) => {
                debug!("Undoing creation of reminder {}", reminder.id);
                store.delete(&reminder).await
            }
            UndoAction::Deleted(reminder) => {
                debug!("Undoing deletion of reminder {}", reminder.id);
                store.restore(reminder).await.map(|_| ())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_reminder, setup_test_store};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_undo_create_deletes_the_inserted_row() {
        let store = setup_test_store().await.unwrap();
        let created = create_test_reminder(&store, "Rent", date(2025, 7, 14))
            .await
            .unwrap();

        let entry = UndoEntry::new(UndoAction::Created(created));
        entry.undo(&store).await.unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undo_delete_restores_the_same_id() {
        let store = setup_test_store().await.unwrap();
        let created = create_test_reminder(&store, "Rent", date(2025, 7, 14))
            .await
            .unwrap();

        store.delete(&created).await.unwrap();
        let entry = UndoEntry::new(UndoAction::Deleted(created.clone()));
        entry.undo(&store).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], created);
    }

    #[tokio::test]
    async fn test_expired_entry_refuses_to_run() {
        let store = setup_test_store().await.unwrap();
        let created = create_test_reminder(&store, "Rent", date(2025, 7, 14))
            .await
            .unwrap();

        let entry = UndoEntry::with_window(UndoAction::Created(created), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(entry.is_expired());
        let result = entry.undo(&store).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // The original mutation stands
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}

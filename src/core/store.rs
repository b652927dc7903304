//! Reminder persistence and live snapshot subscriptions
//!
//! [`ReminderStore`] is the single writer for the reminder table. Every
//! mutation validates first, persists second, and only then publishes a
//! fresh [`ReminderSnapshot`] to subscribers, so observers never see
//! uncommitted state. Multi-row transitions (settling a recurring reminder)
//! run inside one database transaction.

use crate::{
    core::lifecycle::{self, Settlement},
    entities::{
        Reminder,
        reminder::{self, PaymentStatus},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Buffered snapshots per subscriber before a slow consumer starts lagging.
/// A lagged subscriber skips to the newest snapshot, which is always a
/// complete view, so nothing is lost but intermediate states.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Post-commit view of the reminder table for live consumers.
#[derive(Debug, Clone)]
pub struct ReminderSnapshot {
    /// Every reminder, ordered by due date ascending
    pub all: Vec<reminder::Model>,
    /// Settled reminders only, ordered by due date descending
    pub received: Vec<reminder::Model>,
}

/// Handle to the persisted reminders. Cheap to clone; clones share the
/// connection pool and the subscriber channel.
#[derive(Clone)]
pub struct ReminderStore {
    db: DatabaseConnection,
    snapshots: broadcast::Sender<ReminderSnapshot>,
}

impl ReminderStore {
    /// Creates a store over an initialized database connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self { db, snapshots }
    }

    /// The underlying connection, shared with collaborating modules such as
    /// the preference reads in the scheduler.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Registers a live observer. Each effective mutation delivers one fresh
    /// snapshot; nothing is delivered for mutations that changed no rows.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReminderSnapshot> {
        self.snapshots.subscribe()
    }

    /// Inserts a new reminder and returns it with its assigned id.
    ///
    /// The name is trimmed and the month label recomputed from the due date
    /// before insert, so stored rows always satisfy the derived-field rules.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when the name is blank, the amount is
    /// not a positive finite number, or partial-payment fields are
    /// inconsistent.
    pub async fn create(&self, new_reminder: reminder::Model) -> Result<reminder::Model> {
        validate_reminder(&new_reminder)?;

        let mut new_reminder = new_reminder;
        new_reminder.name = new_reminder.name.trim().to_string();
        new_reminder.month = lifecycle::month_label(new_reminder.due_date);

        let inserted = active_reminder(new_reminder, NotSet).insert(&self.db).await?;
        info!("Created reminder '{}' (id {})", inserted.name, inserted.id);

        self.publish_snapshot().await;
        Ok(inserted)
    }

    /// Replaces a reminder row wholesale with the given value, keyed by its
    /// id. The month label is recomputed in case the due date moved.
    ///
    /// # Errors
    /// Returns [`Error::ReminderNotFound`] when no row has that id, or
    /// [`Error::Validation`] for the same field rules as [`Self::create`].
    pub async fn update(&self, updated: reminder::Model) -> Result<reminder::Model> {
        validate_reminder(&updated)?;

        Reminder::find_by_id(updated.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::ReminderNotFound { id: updated.id })?;

        let mut updated = updated;
        updated.name = updated.name.trim().to_string();
        updated.month = lifecycle::month_label(updated.due_date);

        let id = updated.id;
        let saved = active_reminder(updated, Set(id)).update(&self.db).await?;
        debug!("Updated reminder '{}' (id {})", saved.name, saved.id);

        self.publish_snapshot().await;
        Ok(saved)
    }

    /// Deletes a reminder. Deleting an id that is already gone is a no-op:
    /// it succeeds without publishing a snapshot.
    pub async fn delete(&self, reminder: &reminder::Model) -> Result<()> {
        let result = Reminder::delete_by_id(reminder.id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            debug!("Delete of reminder {} matched no rows", reminder.id);
            return Ok(());
        }

        info!("Deleted reminder '{}' (id {})", reminder.name, reminder.id);
        self.publish_snapshot().await;
        Ok(())
    }

    /// Re-inserts a previously deleted reminder under its original id,
    /// exactly as it was. Backs the undo affordance after a delete.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when a row with that id still exists,
    /// for example when the delete was already undone.
    pub async fn restore(&self, reminder: reminder::Model) -> Result<reminder::Model> {
        validate_reminder(&reminder)?;

        if Reminder::find_by_id(reminder.id)
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(Error::Validation {
                message: format!("Reminder {} already exists; nothing to restore", reminder.id),
            });
        }

        let id = reminder.id;
        let restored = active_reminder(reminder, Set(id)).insert(&self.db).await?;
        info!("Restored reminder '{}' (id {})", restored.name, restored.id);

        self.publish_snapshot().await;
        Ok(restored)
    }

    /// Settles a reminder as received on `paid_date`.
    ///
    /// Applies [`lifecycle::mark_received`] to the stored row and persists
    /// the outcome in one transaction: the settled update plus, for
    /// recurring reminders, the insert of the next occurrence. Either both
    /// rows land or neither does. One snapshot is published for the whole
    /// transition. Settled state is checked on the row fetched inside the
    /// transaction, not the caller's copy, so a stale copy cannot settle
    /// the same reminder twice.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when the stored row is already settled
    /// and [`Error::ReminderNotFound`] when it no longer exists.
    pub async fn settle(
        &self,
        reminder: &reminder::Model,
        paid_date: NaiveDate,
    ) -> Result<Settlement> {
        let txn = self.db.begin().await?;

        let stored = Reminder::find_by_id(reminder.id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::ReminderNotFound { id: reminder.id })?;

        if stored.is_received() {
            return Err(Error::Validation {
                message: format!("Reminder {} is already settled", stored.id),
            });
        }

        let outcome = lifecycle::mark_received(&stored, paid_date);

        let settled = active_reminder(outcome.settled, Set(stored.id))
            .update(&txn)
            .await?;

        let next_occurrence = match outcome.next_occurrence {
            Some(next) => Some(active_reminder(next, NotSet).insert(&txn).await?),
            None => None,
        };

        txn.commit().await?;

        match &next_occurrence {
            Some(next) => info!(
                "Settled reminder '{}' (id {}), next occurrence id {} due {}",
                settled.name, settled.id, next.id, next.due_date
            ),
            None => info!("Settled reminder '{}' (id {})", settled.name, settled.id),
        }

        self.publish_snapshot().await;
        Ok(Settlement {
            settled,
            next_occurrence,
        })
    }

    /// Records a partial payment via [`lifecycle::apply_partial_payment`]
    /// and persists the updated row.
    ///
    /// The payment is applied to the stored row rather than the caller's
    /// copy, so a reminder settled in the meantime stays settled.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for out-of-bounds amounts or a settled
    /// reminder, [`Error::ReminderNotFound`] when the row is gone.
    pub async fn record_partial_payment(
        &self,
        reminder: &reminder::Model,
        paid_amount: f64,
        next_due_date: NaiveDate,
    ) -> Result<reminder::Model> {
        let stored = Reminder::find_by_id(reminder.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::ReminderNotFound { id: reminder.id })?;

        let updated = lifecycle::apply_partial_payment(&stored, paid_amount, next_due_date)?;
        self.update(updated).await
    }

    /// Every reminder ordered by due date ascending, soonest first.
    pub async fn list_all(&self) -> Result<Vec<reminder::Model>> {
        Reminder::find()
            .order_by_asc(reminder::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Settled reminders ordered by due date descending, most recent first.
    pub async fn list_received(&self) -> Result<Vec<reminder::Model>> {
        Reminder::find()
            .filter(reminder::Column::Status.eq(PaymentStatus::Past))
            .order_by_desc(reminder::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Reminders due exactly on `date` that are not yet settled. The
    /// scheduler's notification candidates; partially paid rows count.
    pub async fn list_due_on(&self, date: NaiveDate) -> Result<Vec<reminder::Model>> {
        Reminder::find()
            .filter(reminder::Column::DueDate.eq(date))
            .filter(reminder::Column::Status.ne(PaymentStatus::Past))
            .order_by_asc(reminder::Column::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Queries and broadcasts a fresh snapshot. Runs strictly after commit;
    /// failures are logged rather than surfaced so a publish problem never
    /// masks an already-persisted mutation.
    async fn publish_snapshot(&self) {
        if self.snapshots.receiver_count() == 0 {
            return;
        }

        let all = match self.list_all().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Skipping snapshot publish, reminder query failed: {e}");
                return;
            }
        };
        let received = match self.list_received().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Skipping snapshot publish, received query failed: {e}");
                return;
            }
        };

        // Send only fails when every receiver is gone, which is fine here.
        let _ = self.snapshots.send(ReminderSnapshot { all, received });
    }
}

/// Builds a fully set `ActiveModel` from a plain model. The id slot is the
/// caller's choice: `NotSet` for inserts, `Set` for updates and restores.
fn active_reminder(model: reminder::Model, id: ActiveValue<i32>) -> reminder::ActiveModel {
    reminder::ActiveModel {
        id,
        name: Set(model.name),
        amount: Set(model.amount),
        due_date: Set(model.due_date),
        status: Set(model.status),
        person_name: Set(model.person_name),
        month: Set(model.month),
        recurring_type: Set(model.recurring_type),
        recurring_group_id: Set(model.recurring_group_id),
        note: Set(model.note),
        partial_amount_paid: Set(model.partial_amount_paid),
        partial_due_date: Set(model.partial_due_date),
        paid_date: Set(model.paid_date),
        direction: Set(model.direction),
    }
}

/// Field rules every stored reminder must satisfy.
fn validate_reminder(reminder: &reminder::Model) -> Result<()> {
    if reminder.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Reminder name cannot be empty".to_string(),
        });
    }

    if !reminder.amount.is_finite() {
        return Err(Error::Validation {
            message: format!("Reminder amount must be finite, got {}", reminder.amount),
        });
    }

    if reminder.amount <= 0.0 {
        return Err(Error::Validation {
            message: format!(
                "Reminder amount must be a positive magnitude, got {}",
                reminder.amount
            ),
        });
    }

    if reminder.status == PaymentStatus::PartiallyPaid && reminder.partial_amount_paid.is_none() {
        return Err(Error::Validation {
            message: "Partially paid reminders must record the amount paid so far".to_string(),
        });
    }

    if let Some(paid) = reminder.partial_amount_paid {
        if paid <= 0.0 || paid >= reminder.amount {
            return Err(Error::Validation {
                message: format!(
                    "Partial amount paid {paid} must be positive and below the full amount {}",
                    reminder.amount
                ),
            });
        }
    }

    Ok(())
}

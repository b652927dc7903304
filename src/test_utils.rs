//! Shared test utilities for Paidly.
//!
//! This module provides common helper functions for setting up test databases
//! and stores, creating reminders with sensible defaults, and notifier
//! doubles for scheduler tests.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{lifecycle, store::ReminderStore},
    entities::reminder::{Direction, Model as ReminderModel, PaymentStatus, RecurringType},
    errors::{Error, Result},
    notify::Notifier,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a [`ReminderStore`] over a fresh in-memory database.
pub async fn setup_test_store() -> Result<ReminderStore> {
    Ok(ReminderStore::new(setup_test_db().await?))
}

/// Builds an unsaved pending reminder with sensible defaults.
///
/// # Defaults
/// * `amount`: 100.0
/// * `direction`: `ToPay`
/// * `recurring_type`: `None`
/// * `person_name`: same as `name`
#[must_use]
pub fn reminder_fixture(name: &str, due_date: NaiveDate) -> ReminderModel {
    ReminderModel {
        id: 0,
        name: name.to_string(),
        amount: 100.0,
        due_date,
        status: PaymentStatus::Future,
        person_name: name.trim().to_string(),
        month: lifecycle::month_label(due_date),
        recurring_type: RecurringType::None,
        recurring_group_id: None,
        note: String::new(),
        partial_amount_paid: None,
        partial_due_date: None,
        paid_date: None,
        direction: Direction::ToPay,
    }
}

/// Creates and persists a test reminder with the fixture defaults.
pub async fn create_test_reminder(
    store: &ReminderStore,
    name: &str,
    due_date: NaiveDate,
) -> Result<ReminderModel> {
    store.create(reminder_fixture(name, due_date)).await
}

/// Creates and persists a test reminder with custom parameters.
/// Use this when a test needs a specific direction or recurrence.
pub async fn create_custom_reminder(
    store: &ReminderStore,
    name: &str,
    amount: f64,
    due_date: NaiveDate,
    direction: Direction,
    recurring_type: RecurringType,
) -> Result<ReminderModel> {
    let mut reminder = reminder_fixture(name, due_date);
    reminder.amount = amount;
    reminder.direction = direction;
    reminder.recurring_type = recurring_type;
    store.create(reminder).await
}

/// Notifier double that records every dispatched notification as
/// `(id, title, body)` in dispatch order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i32, String, String)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(i32, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn request_permission(&self) -> Result<bool> {
        Ok(true)
    }

    async fn notify(&self, id: i32, title: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((id, title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Notifier double whose dispatch always fails, for retry-path tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn request_permission(&self) -> Result<bool> {
        Ok(false)
    }

    async fn notify(&self, _id: i32, _title: &str, _body: &str) -> Result<()> {
        Err(Error::Notification {
            message: "dispatch refused".to_string(),
        })
    }
}

//! Notification preference business logic
//!
//! Small key-value settings persisted alongside the reminders: the daily
//! notification time and the date the last due-today batch went out. The
//! scheduler reads both at the start of every cycle, so a change takes
//! effect without restarting anything.

use crate::{
    entities::{Preference, preference},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime, Timelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use tracing::debug;

/// Preference key for the daily notification time, stored as `"HH:MM"`.
pub const NOTIFICATION_TIME_KEY: &str = "notification_time";

/// Preference key for the last date a due-today batch was dispatched,
/// stored as `"YYYY-MM-DD"`.
pub const LAST_NOTIFIED_DATE_KEY: &str = "last_notified_date";

/// Notification time used until the user picks one.
pub const DEFAULT_NOTIFICATION_HOUR: u32 = 9;
/// Minute component of the default notification time.
pub const DEFAULT_NOTIFICATION_MINUTE: u32 = 0;

/// Reads a raw preference value by key.
async fn get_value<C: ConnectionTrait>(db: &C, key: &str) -> Result<Option<String>> {
    let row = Preference::find()
        .filter(preference::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(row.map(|r| r.value))
}

/// Writes a preference value, inserting the key on first use and updating
/// it afterwards.
async fn set_value<C: ConnectionTrait>(db: &C, key: &str, value: &str) -> Result<()> {
    let existing = Preference::find()
        .filter(preference::Column::Key.eq(key))
        .one(db)
        .await?;

    match existing {
        Some(row) => {
            let mut active: preference::ActiveModel = row.into();
            active.value = Set(value.to_string());
            active.updated_at = Set(Utc::now().naive_utc());
            active.update(db).await?;
        }
        None => {
            let active = preference::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            };
            active.insert(db).await?;
        }
    }

    debug!("Preference {key} set to {value}");
    Ok(())
}

/// Reads the stored notification time without applying the default.
///
/// Returns `None` when the user has never picked a time.
///
/// # Errors
/// Returns [`Error::Config`] when the stored value does not parse as `HH:MM`.
pub async fn get_stored_notification_time(db: &DatabaseConnection) -> Result<Option<(u32, u32)>> {
    let Some(raw) = get_value(db, NOTIFICATION_TIME_KEY).await? else {
        return Ok(None);
    };

    let time = NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|e| Error::Config {
        message: format!("Stored notification time '{raw}' is not HH:MM: {e}"),
    })?;
    Ok(Some((time.hour(), time.minute())))
}

/// The daily notification time as `(hour, minute)`, falling back to
/// 09:00 when unset.
pub async fn get_notification_time(db: &DatabaseConnection) -> Result<(u32, u32)> {
    Ok(get_stored_notification_time(db)
        .await?
        .unwrap_or((DEFAULT_NOTIFICATION_HOUR, DEFAULT_NOTIFICATION_MINUTE)))
}

/// Stores the daily notification time.
///
/// # Errors
/// Returns [`Error::Validation`] when `hour` or `minute` is out of range.
pub async fn set_notification_time(db: &DatabaseConnection, hour: u32, minute: u32) -> Result<()> {
    if hour > 23 {
        return Err(Error::Validation {
            message: format!("Notification hour must be 0-23, got {hour}"),
        });
    }
    if minute > 59 {
        return Err(Error::Validation {
            message: format!("Notification minute must be 0-59, got {minute}"),
        });
    }

    set_value(db, NOTIFICATION_TIME_KEY, &format!("{hour:02}:{minute:02}")).await
}

/// The date of the most recent dispatched due-today batch, `None` when no
/// batch has ever gone out.
///
/// # Errors
/// Returns [`Error::Config`] when the stored value does not parse as a date.
pub async fn get_last_notified_date(db: &DatabaseConnection) -> Result<Option<NaiveDate>> {
    let Some(raw) = get_value(db, LAST_NOTIFIED_DATE_KEY).await? else {
        return Ok(None);
    };

    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| Error::Config {
        message: format!("Stored last-notified date '{raw}' is not YYYY-MM-DD: {e}"),
    })?;
    Ok(Some(date))
}

/// Records that a due-today batch went out on `date`. The scheduler calls
/// this only after every notification in the batch dispatched successfully.
pub async fn set_last_notified_date(db: &DatabaseConnection, date: NaiveDate) -> Result<()> {
    set_value(
        db,
        LAST_NOTIFIED_DATE_KEY,
        &date.format("%Y-%m-%d").to_string(),
    )
    .await
}

//! Database configuration module for Paidly.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Table statements are generated from the entity definitions with
//! `Schema::create_table_from_entity`, ensuring that the database schema matches the
//! Rust struct definitions without requiring manual SQL. Creation runs with
//! `IF NOT EXISTS`, so starting the daemon over an existing database file is safe.

use crate::entities::{Preference, Reminder};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Opens a connection to the database at `database_url`.
///
/// The URL is resolved by [`crate::config::settings`] from the environment,
/// the settings file, or the built-in default, in that order.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the reminder and preference tables from their entity definitions.
///
/// Uses `SeaORM`'s schema generation so the `DeriveEntityModel` macros remain
/// the single description of each table.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut reminder_table = schema.create_table_from_entity(Reminder);
    reminder_table.if_not_exists();
    let mut preference_table = schema.create_table_from_entity(Preference);
    preference_table.if_not_exists();

    db.execute(builder.build(&reminder_table)).await?;
    db.execute(builder.build(&preference_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{preference::Model as PreferenceModel, reminder::Model as ReminderModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;

        // A simple query verifies the connection is working
        let _: Vec<ReminderModel> = Reminder::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Both tables exist and are queryable
        let _: Vec<ReminderModel> = Reminder::find().limit(1).all(&db).await?;
        let _: Vec<PreferenceModel> = Preference::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_twice_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<ReminderModel> = Reminder::find().limit(1).all(&db).await?;
        Ok(())
    }
}

//! Preference entity - Stores key-value pairs for notification settings.
//! Used for the daily notification target time and the last date a
//! notification batch was delivered.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Preference database model - stores key-value settings pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "preferences")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Settings key (e.g., `"notification_time"`, `"last_notified_date"`)
    pub key: String,
    /// Settings value stored as string
    pub value: String,
    /// When this setting was last modified
    pub updated_at: DateTime,
}

/// Preferences have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

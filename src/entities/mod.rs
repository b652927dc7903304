//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod preference;
pub mod reminder;

// Re-export specific types to avoid conflicts
pub use preference::{Column as PreferenceColumn, Entity as Preference, Model as PreferenceModel};
pub use reminder::{
    Column as ReminderColumn, Direction, Entity as Reminder, Model as ReminderModel, PaymentStatus,
    RecurringType,
};

//! Unified error types for Paidly.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation
//! failures are rejected before anything touches the database; storage
//! failures surface the underlying `SeaORM` error unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before persistence: blank name, non-finite or
    /// non-positive amount, partial-payment bounds, invalid clock values,
    /// transitions out of an already settled reminder, restore over a row
    /// that still exists.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// An update or settlement referenced a reminder id that is not stored.
    #[error("Reminder not found: id {id}")]
    ReminderNotFound { id: i32 },

    /// Underlying storage failure. Mutating calls are transactional, so a
    /// database error never leaves partial row state behind.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A notification could not be dispatched during a scheduler cycle.
    #[error("Notification dispatch error: {message}")]
    Notification { message: String },

    /// Settings file problems and corrupt stored preference values.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Filesystem or signal-handling failure outside the database.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

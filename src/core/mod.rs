/// Pure reminder lifecycle rules: urgency, recurrence, partial payments
pub mod lifecycle;

/// Notification preference storage (daily time, last-notified date)
pub mod preference;

/// Reminder persistence and live snapshot subscriptions
pub mod store;

/// Expiring undo handles for add and delete
pub mod undo;

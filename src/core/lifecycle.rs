//! Reminder lifecycle business logic
//!
//! Pure functions over reminder values: urgency classification for display,
//! recurrence rollover on settlement, and partial-payment bookkeeping. No
//! function here performs I/O. Each one receives a reminder, computes a
//! transformation, and hands the result back for the store to persist.

use crate::{
    entities::reminder::{self, Direction, PaymentStatus, RecurringType},
    errors::{Error, Result},
};
use chrono::{Days, Months, NaiveDate};

/// Reminders due within this many days (exclusive of today) count as "due soon".
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

/// Display urgency tier of a reminder, deterministic given `(today, reminder)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Due date has passed and the reminder is still pending
    Overdue,
    /// Due today
    DueToday,
    /// Due within the next [`DUE_SOON_WINDOW_DAYS`] days
    DueSoon,
    /// Due later than that
    DueLater,
    /// Settled in full
    Received,
    /// Pending with a recorded partial payment
    PartiallyPaid,
}

/// Classifies a reminder into its display urgency tier.
///
/// Settled reminders always classify as [`Urgency::Received`] and
/// partially-paid ones as [`Urgency::PartiallyPaid`], regardless of the due
/// date; only plain pending reminders fall through to the date-derived tiers.
#[must_use]
pub fn urgency(reminder: &reminder::Model, today: NaiveDate) -> Urgency {
    if reminder.is_received() {
        return Urgency::Received;
    }
    if reminder.status == PaymentStatus::PartiallyPaid {
        return Urgency::PartiallyPaid;
    }

    let days_left = reminder.due_date.signed_duration_since(today).num_days();
    if days_left < 0 {
        Urgency::Overdue
    } else if days_left == 0 {
        Urgency::DueToday
    } else if days_left <= DUE_SOON_WINDOW_DAYS {
        Urgency::DueSoon
    } else {
        Urgency::DueLater
    }
}

/// Derives the display month label for a due date, e.g. `"JULY 2025"`.
///
/// The label is recomputed whenever a due date changes (creation, edits,
/// recurrence rollover) so it can never drift from the date it describes.
#[must_use]
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string().to_uppercase()
}

/// Computes the due date of the next occurrence for a recurrence setting.
///
/// Returns `None` for non-recurring reminders. Calendar-month addition clamps
/// the day-of-month to the target month's length, so a reminder due
/// 2025-01-31 rolls over to 2025-02-28.
#[must_use]
pub fn advance_due_date(due_date: NaiveDate, recurring_type: RecurringType) -> Option<NaiveDate> {
    match recurring_type {
        RecurringType::None => None,
        RecurringType::Daily => due_date.checked_add_days(Days::new(1)),
        RecurringType::Weekly => due_date.checked_add_days(Days::new(7)),
        RecurringType::Monthly => due_date.checked_add_months(Months::new(1)),
    }
}

/// Result of settling a reminder: the settled row plus, for recurring
/// reminders, the freshly derived next occurrence awaiting insertion.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// The original reminder with status `PAST` and the paid date recorded
    pub settled: reminder::Model,
    /// The next occurrence to create, `None` for non-recurring reminders
    pub next_occurrence: Option<reminder::Model>,
}

/// Marks a reminder as received and derives the next occurrence when the
/// reminder recurs.
///
/// The settled copy keeps every field except `status` and `paid_date`,
/// including any partial-payment record of how the obligation was paid. The
/// next occurrence starts a fresh lifecycle: id 0 (assigned on insert),
/// status `FUTURE`, advanced due date with a recomputed month label, cleared
/// note, paid date, and partial fields; `name`, `amount`, `direction`,
/// `person_name`, `recurring_type`, and `recurring_group_id` carry over.
///
/// This function performs no I/O; [`crate::core::store::ReminderStore::settle`]
/// persists both rows in one transaction.
#[must_use]
pub fn mark_received(reminder: &reminder::Model, paid_date: NaiveDate) -> Settlement {
    let settled = reminder::Model {
        status: PaymentStatus::Past,
        paid_date: Some(paid_date),
        ..reminder.clone()
    };

    let next_occurrence =
        advance_due_date(reminder.due_date, reminder.recurring_type).map(|next_due| {
            reminder::Model {
                id: 0,
                status: PaymentStatus::Future,
                due_date: next_due,
                month: month_label(next_due),
                note: String::new(),
                paid_date: None,
                partial_amount_paid: None,
                partial_due_date: None,
                ..reminder.clone()
            }
        });

    Settlement {
        settled,
        next_occurrence,
    }
}

/// Records a partial payment against a pending reminder.
///
/// `paid_amount` is the running total paid so far; re-applying replaces the
/// previous total (new remaining balance). The remaining balance gets the
/// rescheduled `next_due_date`.
///
/// # Errors
/// Returns [`Error::Validation`] when the reminder is already settled, when
/// `paid_amount` is non-positive or non-finite, or when it is not strictly
/// below the full amount.
pub fn apply_partial_payment(
    reminder: &reminder::Model,
    paid_amount: f64,
    next_due_date: NaiveDate,
) -> Result<reminder::Model> {
    if reminder.is_received() {
        return Err(Error::Validation {
            message: format!("Reminder {} is already settled", reminder.id),
        });
    }

    if !paid_amount.is_finite() || paid_amount <= 0.0 {
        return Err(Error::Validation {
            message: format!("Partial payment must be a positive amount, got {paid_amount}"),
        });
    }

    if paid_amount >= reminder.amount {
        return Err(Error::Validation {
            message: format!(
                "Partial payment {paid_amount} must stay below the full amount {}",
                reminder.amount
            ),
        });
    }

    Ok(reminder::Model {
        status: PaymentStatus::PartiallyPaid,
        partial_amount_paid: Some(paid_amount),
        partial_due_date: Some(next_due_date),
        ..reminder.clone()
    })
}

/// Balance still outstanding on a reminder: the full amount minus whatever
/// partial payment has been recorded.
#[must_use]
pub fn remaining_amount(reminder: &reminder::Model) -> f64 {
    reminder.amount - reminder.partial_amount_paid.unwrap_or(0.0)
}

/// Builds a fresh pending reminder value ready for
/// [`crate::core::store::ReminderStore::create`]: status `FUTURE`, derived
/// month label, empty note, no payment history.
#[must_use]
pub fn new_reminder(
    name: &str,
    amount: f64,
    due_date: NaiveDate,
    direction: Direction,
    recurring_type: RecurringType,
    person_name: &str,
) -> reminder::Model {
    reminder::Model {
        id: 0,
        name: name.to_string(),
        amount,
        due_date,
        status: PaymentStatus::Future,
        person_name: person_name.trim().to_string(),
        month: month_label(due_date),
        recurring_type,
        recurring_group_id: None,
        note: String::new(),
        partial_amount_paid: None,
        partial_due_date: None,
        paid_date: None,
        direction,
    }
}

/// Filters the pending reminders out of a list, optionally narrowed to one
/// payment direction. Mirrors the home view's ALL / TO PAY / TO RECEIVE tabs.
#[must_use]
pub fn filter_pending(
    reminders: &[reminder::Model],
    direction: Option<Direction>,
) -> Vec<&reminder::Model> {
    reminders
        .iter()
        .filter(|r| !r.is_received())
        .filter(|r| direction.is_none_or(|d| r.direction == d))
        .collect()
}

/// Searches settled reminders by name, counterparty, or amount text,
/// case-insensitively for the text fields. A blank query matches every
/// settled reminder.
#[must_use]
pub fn search_received<'a>(
    reminders: &'a [reminder::Model],
    query: &str,
) -> Vec<&'a reminder::Model> {
    let received = reminders.iter().filter(|r| r.is_received());

    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return received.collect();
    }

    received
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r.person_name.to_lowercase().contains(&needle)
                || r.amount.to_string().contains(needle.as_str())
        })
        .collect()
}

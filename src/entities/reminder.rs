//! Reminder entity - Represents one payment obligation instance.
//!
//! Each reminder has a name, an amount (stored as a positive magnitude),
//! a due date, a lifecycle status, and an optional recurrence. Column names
//! keep the original camelCase wire format so existing databases stay
//! readable, and the enum string values are the persisted representation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reminder. `Past` is terminal for a row; a recurring
/// obligation continues only through a newly created occurrence row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Pending, nothing paid yet
    #[sea_orm(string_value = "FUTURE")]
    Future,
    /// Settled in full
    #[sea_orm(string_value = "PAST")]
    Past,
    /// Pending with a recorded partial payment
    #[sea_orm(string_value = "PARTIALLY_PAID")]
    PartiallyPaid,
}

/// Whether the user owes this amount or is owed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// The user owes this amount to someone
    #[sea_orm(string_value = "TO_PAY")]
    ToPay,
    /// Someone owes this amount to the user
    #[sea_orm(string_value = "TO_RECEIVE")]
    ToReceive,
}

/// How often a settled reminder rolls over into a fresh occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum RecurringType {
    /// One-shot reminder, no rollover
    #[sea_orm(string_value = "None")]
    None,
    /// Next occurrence due one day later
    #[sea_orm(string_value = "Daily")]
    Daily,
    /// Next occurrence due one week later
    #[sea_orm(string_value = "Weekly")]
    Weekly,
    /// Next occurrence due one calendar month later (day-of-month clamped)
    #[sea_orm(string_value = "Monthly")]
    Monthly,
}

/// Reminder database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_reminders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier, assigned on insert and never reused
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Free-text label (e.g., "Rent", "Loan from Priya")
    pub name: String,
    /// Amount of the obligation as a positive magnitude; the display sign
    /// is derived from `direction` via [`Model::signed_amount`]
    pub amount: f64,
    /// Calendar date the obligation is due (no time component)
    #[sea_orm(column_name = "dueDate")]
    pub due_date: Date,
    /// Lifecycle status; settled-ness is derived via [`Model::is_received`]
    pub status: PaymentStatus,
    /// Name of the counterparty
    #[sea_orm(column_name = "personName")]
    pub person_name: String,
    /// Derived display label `"<MONTH> <YEAR>"`, recomputed with `due_date`
    pub month: String,
    /// Recurrence behavior applied when this reminder is settled
    #[sea_orm(column_name = "recurringType")]
    pub recurring_type: RecurringType,
    /// Reserved correlation id linking successive occurrences; carried
    /// through unchanged, never interpreted
    #[sea_orm(column_name = "recurringGroupId")]
    pub recurring_group_id: Option<String>,
    /// Free-text note attached to this occurrence
    pub note: String,
    /// Running total already paid; only meaningful under `PARTIALLY_PAID`
    #[sea_orm(column_name = "partialAmountPaid")]
    pub partial_amount_paid: Option<f64>,
    /// Rescheduled due date for the remaining balance
    #[sea_orm(column_name = "partialDueDate")]
    pub partial_due_date: Option<Date>,
    /// Date the obligation was settled; set exactly when status is `PAST`
    #[sea_orm(column_name = "paidDate")]
    pub paid_date: Option<Date>,
    /// Whether the amount is owed or expected
    pub direction: Direction,
}

impl Model {
    /// Whether this reminder has been settled. Derived from `status` so the
    /// settled flag and the status enum can never disagree.
    #[must_use]
    pub fn is_received(&self) -> bool {
        self.status == PaymentStatus::Past
    }

    /// Amount with the display sign applied: negative for money the user is
    /// waiting to receive, positive for money the user has to pay.
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            Direction::ToPay => self.amount,
            Direction::ToReceive => -self.amount,
        }
    }
}

/// Reminders have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_serde_round_trip_keeps_original_wire_names() {
        let model = Model {
            id: 7,
            name: "Rent".to_string(),
            amount: 1800.0,
            due_date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
            status: PaymentStatus::PartiallyPaid,
            person_name: "Landlord".to_string(),
            month: "JULY 2025".to_string(),
            recurring_type: RecurringType::Monthly,
            recurring_group_id: Some("rent".to_string()),
            note: "due at noon".to_string(),
            partial_amount_paid: Some(600.0),
            partial_due_date: Some(NaiveDate::from_ymd_opt(2025, 7, 21).unwrap()),
            paid_date: None,
            direction: Direction::ToPay,
        };

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["dueDate"], "2025-07-14");
        assert_eq!(json["personName"], "Landlord");
        assert_eq!(json["recurringType"], "Monthly");
        assert_eq!(json["recurringGroupId"], "rent");
        assert_eq!(json["partialAmountPaid"], 600.0);
        assert_eq!(json["partialDueDate"], "2025-07-21");
        assert_eq!(json["status"], "PARTIALLY_PAID");
        assert_eq!(json["direction"], "TO_PAY");
        assert!(json["paidDate"].is_null());

        let back: Model = serde_json::from_value(json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_signed_amount_and_is_received_are_derived() {
        let mut model = Model {
            id: 1,
            name: "Loan".to_string(),
            amount: 250.0,
            due_date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
            status: PaymentStatus::Future,
            person_name: "Priya".to_string(),
            month: "JULY 2025".to_string(),
            recurring_type: RecurringType::None,
            recurring_group_id: None,
            note: String::new(),
            partial_amount_paid: None,
            partial_due_date: None,
            paid_date: None,
            direction: Direction::ToReceive,
        };

        assert!(!model.is_received());
        assert!((model.signed_amount() + 250.0).abs() < f64::EPSILON);

        model.status = PaymentStatus::Past;
        model.direction = Direction::ToPay;
        assert!(model.is_received());
        assert!((model.signed_amount() - 250.0).abs() < f64::EPSILON);
    }
}

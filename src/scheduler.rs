//! Daily due-check scheduling
//!
//! The scheduler wakes once a day at the user's configured notification
//! time, finds every reminder due today, and dispatches one notification
//! per reminder, at most once per calendar day. Host scheduling is assumed
//! to be coarse: a wake may land early or late, so each cycle re-validates
//! the time window and the already-notified guard before dispatching, and
//! the next wake is always re-armed against the wall clock rather than a
//! fixed period, so timing error never accumulates.
//!
//! The cycle itself ([`run_due_check`]) takes the current time as a
//! parameter and is exercised directly in tests; the background loop is a
//! thin shell around it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    core::{preference, store::ReminderStore},
    errors::Result,
    notify::Notifier,
};

/// A wake within this many whole minutes of the target time may dispatch,
/// early or late, bounds inclusive.
pub const WAKE_TOLERANCE_MINUTES: i64 = 2;

/// Title of every due-today notification.
pub const DUE_NOTIFICATION_TITLE: &str = "Payment Due Today";

/// What one due-check cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Today's batch already went out; nothing to do.
    AlreadyNotified,
    /// The wake landed outside the tolerance window around the target time
    /// and was skipped without touching any state. `minutes_off` is the
    /// signed distance from the target, positive when late.
    OutsideWindow { minutes_off: i64 },
    /// Inside the window but no reminders are due today. State stays
    /// untouched so a later wake the same day can still dispatch.
    NoneDue,
    /// Dispatched one notification per due reminder and recorded today as
    /// the last notified date.
    Notified { count: usize },
}

/// Runs one due-check cycle at time `now`.
///
/// Order matters: the per-day guard comes first, then the window check,
/// then the due query. The last-notified date advances only after every
/// notification in the batch dispatched successfully; a failed dispatch
/// leaves it untouched so a later wake retries the whole batch.
///
/// # Errors
/// Returns the first preference, query, or dispatch error encountered.
pub async fn run_due_check(
    store: &ReminderStore,
    notifier: &dyn Notifier,
    now: NaiveDateTime,
) -> Result<CycleOutcome> {
    let db = store.connection();
    let today = now.date();

    if preference::get_last_notified_date(db).await? == Some(today) {
        debug!("Due check already ran today, skipping");
        return Ok(CycleOutcome::AlreadyNotified);
    }

    let (hour, minute) = preference::get_notification_time(db).await?;
    // Values come validated out of the preference store
    let target = today.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default());
    let minutes_off = now.signed_duration_since(target).num_minutes();
    if minutes_off.abs() > WAKE_TOLERANCE_MINUTES {
        debug!("Wake landed {minutes_off} minutes from target, outside tolerance");
        return Ok(CycleOutcome::OutsideWindow { minutes_off });
    }

    let due = store.list_due_on(today).await?;
    if due.is_empty() {
        debug!("No reminders due on {today}");
        return Ok(CycleOutcome::NoneDue);
    }

    info!("Dispatching {} due-today notification(s)", due.len());
    for reminder in &due {
        notifier
            .notify(
                reminder.id,
                DUE_NOTIFICATION_TITLE,
                &format!("Reminder: {}", reminder.name),
            )
            .await?;
    }

    preference::set_last_notified_date(db, today).await?;
    Ok(CycleOutcome::Notified { count: due.len() })
}

/// Time to sleep from `now` until the next occurrence of `hour:minute` on
/// the wall clock: later today if the target is still ahead, otherwise the
/// same time tomorrow.
#[must_use]
pub fn delay_until_target(now: NaiveDateTime, hour: u32, minute: u32) -> Duration {
    let target_time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    let mut target = now.date().and_time(target_time);
    if target <= now {
        target += chrono::Duration::days(1);
    }

    target
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Owns the background wake task. At most one schedule is active at a
/// time: arming a new one replaces and cancels the previous one.
pub struct DueCheckScheduler {
    store: ReminderStore,
    notifier: Arc<dyn Notifier>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DueCheckScheduler {
    /// Creates a scheduler; nothing runs until [`Self::start`].
    #[must_use]
    pub fn new(store: ReminderStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            task: Mutex::new(None),
        }
    }

    /// Arms the daily wake at the stored notification time (or the default
    /// when the user never picked one).
    ///
    /// # Errors
    /// Returns an error when the stored preference cannot be read.
    pub async fn start(&self) -> Result<()> {
        let (hour, minute) = preference::get_notification_time(self.store.connection()).await?;
        self.arm(hour, minute);
        Ok(())
    }

    /// Persists a new notification time and re-arms the wake against it.
    /// The previous pending wake is cancelled; nothing fires twice.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Validation`] for an out-of-range
    /// time, leaving the existing schedule in place.
    pub async fn reschedule(&self, hour: u32, minute: u32) -> Result<()> {
        preference::set_notification_time(self.store.connection(), hour, minute).await?;
        self.arm(hour, minute);
        Ok(())
    }

    /// Cancels the pending wake, if any.
    pub fn stop(&self) {
        let Ok(mut slot) = self.task.lock() else {
            warn!("Scheduler task slot poisoned, skipping stop");
            return;
        };
        if let Some(task) = slot.take() {
            task.abort();
            info!("Due-check schedule cancelled");
        }
    }

    /// Replaces the active schedule with a fresh one for `hour:minute`.
    /// Holding the slot lock across abort-and-spawn keeps replacement
    /// atomic when two reconfigurations race.
    fn arm(&self, hour: u32, minute: u32) {
        let Ok(mut slot) = self.task.lock() else {
            warn!("Scheduler task slot poisoned, skipping arm");
            return;
        };

        if let Some(previous) = slot.take() {
            previous.abort();
        }

        info!("Arming daily due check for {hour:02}:{minute:02}");
        *slot = Some(tokio::spawn(wake_loop(
            self.store.clone(),
            Arc::clone(&self.notifier),
            hour,
            minute,
        )));
    }
}

impl Drop for DueCheckScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleeps until each next wall-clock target, then runs one cycle. Cycle
/// errors are logged and the loop keeps going; the next wake retries.
async fn wake_loop(store: ReminderStore, notifier: Arc<dyn Notifier>, hour: u32, minute: u32) {
    loop {
        let delay = delay_until_target(Local::now().naive_local(), hour, minute);
        debug!("Next due check in {} seconds", delay.as_secs());
        tokio::time::sleep(delay).await;

        let now = Local::now().naive_local();
        match run_due_check(&store, notifier.as_ref(), now).await {
            Ok(outcome) => info!("Due check finished: {outcome:?}"),
            Err(e) => error!("Due check failed: {e}"),
        }
    }
}

//! Periodic reminder sweeper.
//!
//! The body is idempotent and re-entrant: the compare-and-set claim on
//! `reminder_sent` is the gate, so overlapping runs (a slow sweep, or two
//! process instances) still dispatch each reminder at most once.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};

use crate::db::Database;
use crate::error::Error;
use crate::notify::{Event, EventKind, Notifier};
use crate::scheduling::Interval;

pub const SWEEP_INTERVAL_SECS: u64 = 60;
/// How far back the candidate scan reaches; prevents unbounded walks over
/// historical rows that never had their reminder fired.
pub const LOOKBACK_HOURS: i64 = 24;

/// Run the sweeper on a fixed cadence until the process exits.
pub async fn run(db: Database, notifier: Arc<dyn Notifier>) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
    loop {
        ticker.tick().await;
        let now = Local::now().naive_local();
        match sweep(&db, notifier.as_ref(), now) {
            Ok(0) => {}
            Ok(sent) => tracing::debug!("dispatched {} reminders", sent),
            Err(e) => tracing::error!("reminder sweep failed: {}", e),
        }
    }
}

/// One sweep pass: claim and dispatch every reminder due at `now`.
/// Returns the number dispatched. Per-appointment problems are logged and
/// the sweep continues with the remaining candidates.
pub fn sweep(db: &Database, notifier: &dyn Notifier, now: NaiveDateTime) -> Result<usize, Error> {
    let lookback = (now - Duration::hours(LOOKBACK_HOURS)).date().to_string();
    let candidates = db.due_reminder_candidates(&lookback)?;

    let mut dispatched = 0;
    for appointment in candidates {
        let interval = match Interval::from_parts(
            &appointment.date,
            &appointment.time,
            appointment.duration_hours,
        ) {
            Ok(iv) => iv,
            Err(e) => {
                tracing::warn!(
                    appointment = %appointment.id,
                    "skipping reminder with unreadable schedule: {}",
                    e
                );
                continue;
            }
        };

        // Stored rows predate offset validation, so the subtraction must
        // not be allowed to panic the sweeper.
        let due_at = Duration::try_minutes(appointment.reminder_offset_minutes)
            .and_then(|offset| interval.start.checked_sub_signed(offset));
        let Some(due_at) = due_at else {
            tracing::warn!(
                appointment = %appointment.id,
                "skipping reminder with out-of-range offset"
            );
            continue;
        };
        if now < due_at {
            continue;
        }

        // claim before dispatching so a concurrent sweep cannot double-send
        match db.claim_reminder(appointment.id) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                tracing::error!(appointment = %appointment.id, "reminder claim failed: {}", e);
                continue;
            }
        }

        let event = Event::new(
            EventKind::Reminder,
            appointment.id,
            format!(
                "Reminder: appointment at {} on {}",
                appointment.time, appointment.date
            ),
        );
        for assignment in &appointment.assignments {
            notifier.publish(&assignment.staff_id, event.clone());
        }
        if appointment.assignments.is_empty() {
            if let Some(staff_id) = &appointment.staff_id {
                notifier.publish(staff_id, event.clone());
            }
        }
        if let Some(customer_id) = &appointment.customer_id {
            notifier.publish(customer_id, event.clone());
        }
        dispatched += 1;
    }

    Ok(dispatched)
}

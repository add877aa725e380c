//! The booking workflow: validate the request, resolve assignees, run the
//! per-staff conflict checks, persist, then emit side effects. Conflict
//! checking and persistence happen as one unit of work inside the database
//! layer; everything after a successful persist (history entry, notifier
//! events) is best-effort and never fails the booking.

pub mod assignments;

use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::Error;
use crate::models::*;
use crate::notify::{Event, EventKind, Notifier};
use crate::scheduling::Interval;

pub const DEFAULT_DURATION_HOURS: f64 = 1.0;
/// Longest bookable visit.
pub const MAX_DURATION_HOURS: f64 = 24.0;
/// Largest accepted reminder offset: one week before the start.
pub const MAX_REMINDER_OFFSET_MINUTES: i64 = 7 * 24 * 60;

/// History category used for booking entries on a customer's trail.
pub const HISTORY_CATEGORY: &str = "appointment";

pub fn create(
    db: &Database,
    notifier: &dyn Notifier,
    input: CreateAppointmentInput,
) -> Result<Appointment, Error> {
    let time = required(input.time, "time")?;
    let date = required(input.date, "date")?;
    let reason = required(input.reason, "reason")?;
    let duration = input.duration.unwrap_or(DEFAULT_DURATION_HOURS);
    validate_duration(duration)?;
    validate_reminder(input.reminder)?;

    let interval = Interval::from_parts(&date, &time, duration)?;
    let resolved = assignments::resolve(db, input.assigned_to.as_ref(), input.employe_id.as_deref())?;

    let id = Uuid::new_v4();
    let appointment = Appointment {
        id,
        customer_id: input.customer_id,
        customer_name: input.customer_name,
        date: interval.date_string(),
        time: interval.time_string(),
        duration_hours: duration,
        reason,
        details: input.details,
        staff_id: resolved.primary_staff_id.clone(),
        assigned_to_label: resolved.label.clone(),
        assignments: assignment_rows(id, &resolved.entries),
        reminder_offset_minutes: input.reminder,
        reminder_sent: false,
        is_client_visit: input.is_client,
        created_at: Utc::now(),
    };

    db.book(&appointment)?;

    record_client_visit(db, &appointment);
    notify_assignees(notifier, &appointment, EventKind::AppointmentBooked);

    Ok(appointment)
}

pub fn update(
    db: &Database,
    notifier: &dyn Notifier,
    id: Uuid,
    input: UpdateAppointmentInput,
) -> Result<Appointment, Error> {
    let existing = db.get_appointment(id)?.ok_or(Error::NotFound("appointment"))?;

    let date = input.date.unwrap_or(existing.date);
    let time = input.time.unwrap_or(existing.time);
    let duration = input.duration.unwrap_or(existing.duration_hours);
    validate_duration(duration)?;
    let reminder = input.reminder.unwrap_or(existing.reminder_offset_minutes);
    validate_reminder(reminder)?;
    let interval = Interval::from_parts(&date, &time, duration)?;

    // Supplying either assignee field replaces the whole assignment set;
    // otherwise the existing set (or legacy assignee) is kept as-is.
    let assignee_change = input.assigned_to.is_some() || input.employe_id.is_some();
    let (assignments, staff_id, label) = if assignee_change {
        let resolved =
            assignments::resolve(db, input.assigned_to.as_ref(), input.employe_id.as_deref())?;
        (
            assignment_rows(id, &resolved.entries),
            resolved.primary_staff_id,
            resolved.label,
        )
    } else {
        (
            existing.assignments,
            existing.staff_id,
            existing.assigned_to_label,
        )
    };

    let appointment = Appointment {
        id,
        customer_id: input.customer_id.or(existing.customer_id),
        customer_name: input.customer_name.or(existing.customer_name),
        date: interval.date_string(),
        time: interval.time_string(),
        duration_hours: duration,
        reason: input.reason.unwrap_or(existing.reason),
        details: input.details.or(existing.details),
        staff_id,
        assigned_to_label: label,
        assignments,
        reminder_offset_minutes: reminder,
        reminder_sent: existing.reminder_sent,
        is_client_visit: input.is_client.unwrap_or(existing.is_client_visit),
        created_at: existing.created_at,
    };

    db.rebook(&appointment, assignee_change)?;

    notify_assignees(notifier, &appointment, EventKind::AppointmentUpdated);

    Ok(appointment)
}

pub fn delete(db: &Database, notifier: &dyn Notifier, id: Uuid) -> Result<(), Error> {
    let existing = db.get_appointment(id)?.ok_or(Error::NotFound("appointment"))?;
    if !db.delete_appointment(id)? {
        return Err(Error::NotFound("appointment"));
    }
    notify_assignees(notifier, &existing, EventKind::AppointmentCancelled);
    Ok(())
}

fn required(value: Option<String>, field: &str) -> Result<String, Error> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Validation(format!("{field} is required"))),
    }
}

fn validate_duration(duration: f64) -> Result<(), Error> {
    if duration > 0.0 && duration.is_finite() && duration <= MAX_DURATION_HOURS {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "duration must be between 0 and {MAX_DURATION_HOURS} hours"
        )))
    }
}

fn validate_reminder(offset: i64) -> Result<(), Error> {
    if (0..=MAX_REMINDER_OFFSET_MINUTES).contains(&offset) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "reminder offset must be between 0 and {MAX_REMINDER_OFFSET_MINUTES} minutes"
        )))
    }
}

fn assignment_rows(appointment_id: Uuid, entries: &[ResolvedAssignment]) -> Vec<StaffAssignment> {
    entries
        .iter()
        .map(|entry| StaffAssignment {
            id: Uuid::new_v4(),
            appointment_id,
            staff_id: entry.staff_id.clone(),
            display_name: entry.display_name.clone(),
        })
        .collect()
}

/// Append a customer-history entry for client visits. Best-effort: a
/// missing customer or a failed write is logged and the booking stands.
fn record_client_visit(db: &Database, appointment: &Appointment) {
    if !appointment.is_client_visit {
        return;
    }
    let Some(customer_id) = &appointment.customer_id else {
        return;
    };
    match db.get_customer(customer_id) {
        Ok(Some(_)) => {
            let note = format!(
                "Appointment on {} at {}: {}",
                appointment.date, appointment.time, appointment.reason
            );
            if let Err(e) = db.append_customer_history(
                customer_id,
                HISTORY_CATEGORY,
                &note,
                Some(&appointment.id.to_string()),
            ) {
                tracing::warn!(
                    customer = customer_id,
                    appointment = %appointment.id,
                    "failed to append customer history: {}",
                    e
                );
            }
        }
        Ok(None) => {
            tracing::warn!(
                customer = customer_id,
                appointment = %appointment.id,
                "customer not found, skipping history entry"
            );
        }
        Err(e) => {
            tracing::warn!(
                customer = customer_id,
                "customer lookup failed, skipping history entry: {}",
                e
            );
        }
    }
}

fn notify_assignees(notifier: &dyn Notifier, appointment: &Appointment, kind: EventKind) {
    let message = match kind {
        EventKind::AppointmentBooked => format!(
            "Appointment booked on {} at {}",
            appointment.date, appointment.time
        ),
        EventKind::AppointmentUpdated => format!(
            "Appointment moved to {} at {}",
            appointment.date, appointment.time
        ),
        EventKind::AppointmentCancelled => format!(
            "Appointment on {} at {} was cancelled",
            appointment.date, appointment.time
        ),
        EventKind::Reminder => return,
    };
    let event = Event::new(kind, appointment.id, message);
    for assignment in &appointment.assignments {
        notifier.publish(&assignment.staff_id, event.clone());
    }
    if appointment.assignments.is_empty() {
        if let Some(staff_id) = &appointment.staff_id {
            notifier.publish(staff_id, event.clone());
        }
    }
}

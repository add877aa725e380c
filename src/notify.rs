use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

/// Outbound event fan-out keyed by recipient id.
///
/// The scheduling core publishes here instead of talking to a transport
/// directly. Delivery is fire-and-forget: a failing or absent transport
/// never fails a booking.
pub trait Notifier: Send + Sync {
    fn publish(&self, recipient_id: &str, event: Event);
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub kind: EventKind,
    pub appointment_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AppointmentBooked,
    AppointmentUpdated,
    AppointmentCancelled,
    Reminder,
}

impl Event {
    pub fn new(kind: EventKind, appointment_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            kind,
            appointment_id,
            message: message.into(),
        }
    }
}

/// Default notifier: writes events to the log. Stands in for the real-time
/// delivery channel, which is out of scope for the scheduler.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn publish(&self, recipient_id: &str, event: Event) {
        tracing::info!(
            recipient = recipient_id,
            kind = ?event.kind,
            appointment = %event.appointment_id,
            "{}",
            event.message
        );
    }
}

/// Notifier that records every published event, for tests and dry runs.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, Event)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Event)> {
        self.events.lock().expect("notifier lock poisoned").clone()
    }

    pub fn count_for(&self, recipient_id: &str, kind: EventKind) -> usize {
        self.events()
            .iter()
            .filter(|(r, e)| r.as_str() == recipient_id && e.kind == kind)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, recipient_id: &str, event: Event) {
        self.events
            .lock()
            .expect("notifier lock poisoned")
            .push((recipient_id.to_string(), event));
    }
}

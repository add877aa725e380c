use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StaffAssignment;

/// A booked visit against one or more staff calendars.
///
/// `date` (`YYYY-MM-DD`) and `time` (`HH:MM`) are local wall-clock values,
/// normalized when the booking is accepted. Rows written by the previous
/// system may still carry `H:MM AM/PM` times, so anything turning a stored
/// appointment back into an interval goes through
/// [`crate::scheduling::Interval::from_parts`] rather than trusting the
/// stored format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Option<String>,
    /// Free-text name used for walk-in bookings without a customer record.
    pub customer_name: Option<String>,
    pub date: String,
    pub time: String,
    #[serde(rename = "duration")]
    pub duration_hours: f64,
    pub reason: String,
    pub details: Option<String>,
    /// Legacy denormalized single assignee, kept for old read paths.
    /// New bookings also set it to the first resolved assignment.
    #[serde(rename = "employeId")]
    pub staff_id: Option<String>,
    /// Comma-joined display names of the assignments. Derived, never
    /// independently authored when assignment rows exist.
    #[serde(rename = "assignedTo")]
    pub assigned_to_label: Option<String>,
    pub assignments: Vec<StaffAssignment>,
    /// Minutes before the start at which a reminder fires. 0 disables it.
    #[serde(rename = "reminder")]
    pub reminder_offset_minutes: i64,
    pub reminder_sent: bool,
    #[serde(rename = "isClient")]
    pub is_client_visit: bool,
    pub created_at: DateTime<Utc>,
}

/// Assignee forms accepted on the wire: a list of staff references, or a
/// bare display label for bookings that do not map to staff records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssignedTo {
    Entries(Vec<AssignmentInput>),
    Label(String),
}

/// One staff reference inside an `assignedTo` list. The display name is
/// optional; missing names are filled from the staff table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub staff_id: String,
    pub display_name: Option<String>,
}

/// Body of `POST /appointments`.
///
/// `time`, `date` and `reason` are required but declared optional here so
/// their absence surfaces as a 400 validation error rather than a
/// deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentInput {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub reason: Option<String>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<AssignedTo>,
    /// Legacy single-assignee form, equivalent to a one-element list.
    #[serde(rename = "employeId")]
    pub employe_id: Option<String>,
    pub duration: Option<f64>,
    pub details: Option<String>,
    #[serde(rename = "isClient", default)]
    pub is_client: bool,
    #[serde(rename = "reminder", default)]
    pub reminder: i64,
}

/// Body of `PUT /appointments/{id}`. All fields optional for partial
/// updates; supplying either assignee field replaces the whole set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentInput {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub reason: Option<String>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<AssignedTo>,
    #[serde(rename = "employeId")]
    pub employe_id: Option<String>,
    pub duration: Option<f64>,
    pub details: Option<String>,
    #[serde(rename = "isClient")]
    pub is_client: Option<bool>,
    #[serde(rename = "reminder")]
    pub reminder: Option<i64>,
}

// ============================================================
// Response envelopes
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentEnvelope {
    pub success: bool,
    pub message: String,
    pub appointment: Appointment,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListEnvelope {
    pub success: bool,
    pub appointments: Vec<Appointment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// Response of `GET /appointments/available-slots`: the free slot labels
/// plus the day's existing bookings for client display.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsEnvelope {
    pub success: bool,
    pub available_slots: Vec<String>,
    pub appointments: Vec<DayAppointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAppointment {
    pub id: Uuid,
    pub time: String,
    #[serde(rename = "duration")]
    pub duration_hours: f64,
    pub customer_name: Option<String>,
    pub reason: String,
}

impl From<&Appointment> for DayAppointment {
    fn from(a: &Appointment) -> Self {
        Self {
            id: a.id,
            time: a.time.clone(),
            duration_hours: a.duration_hours,
            customer_name: a.customer_name.clone(),
            reason: a.reason.clone(),
        }
    }
}

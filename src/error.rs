use crate::models::Appointment;

/// Error taxonomy for the scheduling core.
///
/// Validation and conflict variants are recoverable by the caller adjusting
/// input; `Database` and `Internal` are logged server-side and surfaced to
/// clients as a generic message. The HTTP mapping lives in `api::error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("an appointment must name at least one assignee")]
    MissingAssignee,

    #[error("unknown staff: {}", .0.join(", "))]
    UnknownStaff(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A candidate booking overlaps an existing appointment for one of the
    /// assigned staff members. Carries the first conflict found.
    #[error("{message}")]
    Conflict {
        staff_id: String,
        staff_name: String,
        message: String,
        appointment: Box<Appointment>,
    },

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// The appointment a `Conflict` collided with, if this is one.
    pub fn conflict_appointment(&self) -> Option<&Appointment> {
        match self {
            Error::Conflict { appointment, .. } => Some(appointment),
            _ => None,
        }
    }
}

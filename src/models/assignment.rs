use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Join row between an appointment and a staff member.
///
/// Invariant: at most one row per (appointment, staff) pair, enforced by a
/// unique index. The set is replaced wholesale when a booking's assignees
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub staff_id: String,
    pub display_name: String,
}

/// A validated, deduplicated assignee produced by the assignment resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssignment {
    pub staff_id: String,
    pub display_name: String,
}

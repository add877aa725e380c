use crate::db::Database;
use crate::error::Error;
use crate::models::{AssignedTo, AssignmentInput, ResolvedAssignment};

/// The normalized outcome of resolving a booking's assignee input.
#[derive(Debug, Clone)]
pub struct ResolvedAssignees {
    /// Deduplicated, existence-checked staff entries in input order.
    pub entries: Vec<ResolvedAssignment>,
    /// Display label; comma-joined names when entries exist, or the raw
    /// label for label-only bookings.
    pub label: Option<String>,
    /// First resolved staff id, kept on the appointment's denormalized
    /// column for legacy read paths.
    pub primary_staff_id: Option<String>,
}

/// Drop repeated staff ids, keeping the first occurrence of each.
pub fn dedup_entries(entries: &[AssignmentInput]) -> Vec<AssignmentInput> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for entry in entries {
        if seen.contains(&entry.staff_id) {
            continue;
        }
        seen.push(entry.staff_id.clone());
        out.push(entry.clone());
    }
    out
}

/// Normalize a booking's assignee input into validated assignments.
///
/// Accepts the list form, a bare label string, or the legacy single
/// `employeId` (treated as a one-element list). Every referenced staff id
/// must exist; all missing ids are reported together. Display names absent
/// from the input are filled from the staff table.
pub fn resolve(
    db: &Database,
    assigned_to: Option<&AssignedTo>,
    employe_id: Option<&str>,
) -> Result<ResolvedAssignees, Error> {
    match assigned_to {
        Some(AssignedTo::Entries(raw)) if !raw.is_empty() => {
            resolve_entries(db, &dedup_entries(raw))
        }
        Some(AssignedTo::Label(label)) if !label.trim().is_empty() => Ok(ResolvedAssignees {
            entries: Vec::new(),
            label: Some(label.trim().to_string()),
            primary_staff_id: None,
        }),
        _ => match employe_id {
            Some(id) if !id.trim().is_empty() => {
                let single = [AssignmentInput {
                    staff_id: id.trim().to_string(),
                    display_name: None,
                }];
                resolve_entries(db, &single)
            }
            _ => Err(Error::MissingAssignee),
        },
    }
}

fn resolve_entries(
    db: &Database,
    entries: &[AssignmentInput],
) -> Result<ResolvedAssignees, Error> {
    let mut resolved = Vec::with_capacity(entries.len());
    let mut missing = Vec::new();

    for entry in entries {
        match db.get_staff(&entry.staff_id)? {
            Some(staff) => resolved.push(ResolvedAssignment {
                staff_id: entry.staff_id.clone(),
                display_name: entry
                    .display_name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(staff.display_name),
            }),
            None => missing.push(entry.staff_id.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(Error::UnknownStaff(missing));
    }

    let label = resolved
        .iter()
        .map(|r| r.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let primary_staff_id = resolved.first().map(|r| r.staff_id.clone());

    Ok(ResolvedAssignees {
        entries: resolved,
        label: Some(label),
        primary_staff_id,
    })
}

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::Error;
use crate::models::*;
use crate::scheduling::{intervals_conflict, ConflictCheck, Interval};

const APPOINTMENT_COLUMNS: &str = "id, customer_id, customer_name, date, time, duration_hours, \
     reason, details, staff_id, assigned_to_label, reminder_offset_minutes, reminder_sent, \
     is_client_visit, created_at";

/// Handle over the SQLite store. Cheap to clone; all access funnels through
/// one connection behind a mutex, which is also what serializes the
/// conflict-check-then-persist unit of work in [`Database::book`].
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self, Error> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent).map_err(anyhow::Error::from)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self, Error> {
        let dirs = directories::ProjectDirs::from("", "", "orthodesk")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("orthodesk.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<(), Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn).map_err(Error::Internal)
    }

    // ============================================================
    // Staff (collaborator, read side only plus test seeding)
    // ============================================================

    pub fn create_staff(&self, id: &str, display_name: &str) -> Result<Staff, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        conn.execute(
            "INSERT INTO staff (id, display_name, created_at) VALUES (?, ?, ?)",
            (id, display_name, now.to_rfc3339()),
        )?;
        Ok(Staff {
            id: id.to_string(),
            display_name: display_name.to_string(),
            created_at: now,
        })
    }

    pub fn get_staff(&self, id: &str) -> Result<Option<Staff>, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare("SELECT id, display_name, created_at FROM staff WHERE id = ?")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Staff {
                id: row.get(0)?,
                display_name: row.get(1)?,
                created_at: parse_datetime(row.get::<_, String>(2)?),
            }))
        } else {
            Ok(None)
        }
    }

    // ============================================================
    // Customers (collaborator: existence check + history append)
    // ============================================================

    pub fn create_customer(&self, id: &str, name: &str) -> Result<Customer, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        conn.execute(
            "INSERT INTO customers (id, name, created_at) VALUES (?, ?, ?)",
            (id, name, now.to_rfc3339()),
        )?;
        Ok(Customer {
            id: id.to_string(),
            name: name.to_string(),
            created_at: now,
        })
    }

    pub fn get_customer(&self, id: &str) -> Result<Option<Customer>, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM customers WHERE id = ?")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Customer {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_datetime(row.get::<_, String>(2)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn append_customer_history(
        &self,
        customer_id: &str,
        category: &str,
        note: &str,
        event_id: Option<&str>,
    ) -> Result<CustomerHistoryEntry, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO customer_history (id, customer_id, category, note, event_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                customer_id,
                category,
                note,
                event_id,
                now.to_rfc3339(),
            ),
        )?;
        Ok(CustomerHistoryEntry {
            id,
            customer_id: customer_id.to_string(),
            category: category.to_string(),
            note: note.to_string(),
            event_id: event_id.map(str::to_string),
            created_at: now,
        })
    }

    pub fn customer_history(&self, customer_id: &str) -> Result<Vec<CustomerHistoryEntry>, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, customer_id, category, note, event_id, created_at
             FROM customer_history WHERE customer_id = ? ORDER BY created_at DESC",
        )?;
        let entries = stmt
            .query_map([customer_id], |row| {
                Ok(CustomerHistoryEntry {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    customer_id: row.get(1)?,
                    category: row.get(2)?,
                    note: row.get(3)?,
                    event_id: row.get(4)?,
                    created_at: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ============================================================
    // Appointment reads
    // ============================================================

    pub fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut appointment = map_appointment(row)?;
            appointment.assignments = load_assignments(&conn, appointment.id)?;
            Ok(Some(appointment))
        } else {
            Ok(None)
        }
    }

    pub fn get_all_appointments(&self) -> Result<Vec<Appointment>, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date, time");
        let mut stmt = conn.prepare(&sql)?;
        let mut appointments = stmt
            .query_map([], map_appointment)?
            .collect::<Result<Vec<_>, _>>()?;
        for appointment in &mut appointments {
            appointment.assignments = load_assignments(&conn, appointment.id)?;
        }
        Ok(appointments)
    }

    /// Day-bucketed view of one staff member's calendar, via either the
    /// legacy denormalized column or assignment rows.
    pub fn appointments_for_staff_day(
        &self,
        staff_id: &str,
        date: &str,
    ) -> Result<Vec<Appointment>, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        staff_day_appointments(&conn, staff_id, date, None)
    }

    /// Scoped listing with pagination and free-text search over customer
    /// name, details, reason, assignee label and time.
    pub fn search_appointments(
        &self,
        staff_id: &str,
        term: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Appointment>, u64), Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let pattern = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", t));

        const SCOPE: &str = "WHERE (staff_id = ?1 \
             OR id IN (SELECT appointment_id FROM staff_assignments WHERE staff_id = ?1)) \
             AND (?2 IS NULL OR customer_name LIKE ?2 OR details LIKE ?2 OR reason LIKE ?2 \
                  OR assigned_to_label LIKE ?2 OR time LIKE ?2)";

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM appointments {SCOPE}"),
            params![staff_id, pattern],
            |row| row.get(0),
        )?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments {SCOPE}
             ORDER BY date DESC, time DESC LIMIT ?3 OFFSET ?4"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut appointments = stmt
            .query_map(params![staff_id, pattern, limit, offset], map_appointment)?
            .collect::<Result<Vec<_>, _>>()?;
        for appointment in &mut appointments {
            appointment.assignments = load_assignments(&conn, appointment.id)?;
        }
        Ok((appointments, total as u64))
    }

    // ============================================================
    // Conflict checking and the booking unit of work
    // ============================================================

    /// Probe one staff member's day for a conflict with `candidate`,
    /// excluding `exclude` (the appointment being updated, if any).
    pub fn check_overlap(
        &self,
        staff_id: &str,
        candidate: &Interval,
        exclude: Option<Uuid>,
    ) -> Result<ConflictCheck, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let display_name = staff_display_name(&conn, staff_id)?;
        match conflict_for_staff(&conn, staff_id, &display_name, candidate, exclude)? {
            Some(Error::Conflict {
                message,
                appointment,
                ..
            }) => Ok(ConflictCheck {
                conflict: true,
                conflicting: Some(*appointment),
                message: Some(message),
            }),
            _ => Ok(ConflictCheck::default()),
        }
    }

    /// Persist a new appointment and its assignment rows, re-checking every
    /// assignee's calendar first. The whole sequence runs with the
    /// connection lock held inside one transaction, so two concurrent
    /// overlapping bookings cannot both pass the check.
    pub fn book(&self, appointment: &Appointment) -> Result<(), Error> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let candidate = Interval::from_parts(
            &appointment.date,
            &appointment.time,
            appointment.duration_hours,
        )?;

        for (staff_id, display_name) in conflict_targets(appointment) {
            if let Some(conflict) =
                conflict_for_staff(&tx, &staff_id, &display_name, &candidate, None)?
            {
                return Err(conflict);
            }
        }

        insert_appointment_row(&tx, appointment)?;
        for assignment in &appointment.assignments {
            insert_assignment_row(&tx, assignment)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Persist an updated appointment under the same unit-of-work rules as
    /// [`Database::book`], excluding the appointment itself from the
    /// conflict probe. When `replace_assignments` is set the assignment set
    /// is swapped wholesale (delete all, insert the new rows) rather than
    /// diffed.
    pub fn rebook(
        &self,
        appointment: &Appointment,
        replace_assignments: bool,
    ) -> Result<(), Error> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let candidate = Interval::from_parts(
            &appointment.date,
            &appointment.time,
            appointment.duration_hours,
        )?;

        for (staff_id, display_name) in conflict_targets(appointment) {
            if let Some(conflict) = conflict_for_staff(
                &tx,
                &staff_id,
                &display_name,
                &candidate,
                Some(appointment.id),
            )? {
                return Err(conflict);
            }
        }

        update_appointment_row(&tx, appointment)?;
        if replace_assignments {
            tx.execute(
                "DELETE FROM staff_assignments WHERE appointment_id = ?",
                [appointment.id.to_string()],
            )?;
            for assignment in &appointment.assignments {
                insert_assignment_row(&tx, assignment)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete_appointment(&self, id: Uuid) -> Result<bool, Error> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM staff_assignments WHERE appointment_id = ?",
            [id.to_string()],
        )?;
        let rows = tx.execute("DELETE FROM appointments WHERE id = ?", [id.to_string()])?;
        tx.commit()?;
        Ok(rows > 0)
    }

    // ============================================================
    // Reminders
    // ============================================================

    /// Appointments that may still need a reminder, bounded by a look-back
    /// date so the scan never walks unbounded history.
    pub fn due_reminder_candidates(
        &self,
        lookback_date: &str,
    ) -> Result<Vec<Appointment>, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE reminder_sent = 0 AND reminder_offset_minutes > 0 AND date >= ?
             ORDER BY date, time"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut appointments = stmt
            .query_map([lookback_date], map_appointment)?
            .collect::<Result<Vec<_>, _>>()?;
        for appointment in &mut appointments {
            appointment.assignments = load_assignments(&conn, appointment.id)?;
        }
        Ok(appointments)
    }

    /// Compare-and-set claim on the reminder flag. Returns true only for
    /// the caller that actually flipped it, so concurrent sweeps stay
    /// at-most-once.
    pub fn claim_reminder(&self, id: Uuid) -> Result<bool, Error> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE appointments SET reminder_sent = 1 WHERE id = ? AND reminder_sent = 0",
            [id.to_string()],
        )?;
        Ok(rows > 0)
    }
}

// ============================================================
// Connection-level helpers, shared by the locked unit of work
// ============================================================

fn map_appointment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: parse_uuid(row.get::<_, String>(0)?),
        customer_id: row.get(1)?,
        customer_name: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        duration_hours: row.get(5)?,
        reason: row.get(6)?,
        details: row.get(7)?,
        staff_id: row.get(8)?,
        assigned_to_label: row.get(9)?,
        reminder_offset_minutes: row.get(10)?,
        reminder_sent: row.get::<_, i64>(11)? != 0,
        is_client_visit: row.get::<_, i64>(12)? != 0,
        created_at: parse_datetime(row.get::<_, String>(13)?),
        assignments: Vec::new(),
    })
}

fn load_assignments(
    conn: &Connection,
    appointment_id: Uuid,
) -> Result<Vec<StaffAssignment>, Error> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, staff_id, display_name
         FROM staff_assignments WHERE appointment_id = ? ORDER BY rowid",
    )?;
    let assignments = stmt
        .query_map([appointment_id.to_string()], |row| {
            Ok(StaffAssignment {
                id: parse_uuid(row.get::<_, String>(0)?),
                appointment_id: parse_uuid(row.get::<_, String>(1)?),
                staff_id: row.get(2)?,
                display_name: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(assignments)
}

fn staff_day_appointments(
    conn: &Connection,
    staff_id: &str,
    date: &str,
    exclude: Option<Uuid>,
) -> Result<Vec<Appointment>, Error> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE date = ?1
           AND (staff_id = ?2
                OR id IN (SELECT appointment_id FROM staff_assignments WHERE staff_id = ?2))
           AND (?3 IS NULL OR id != ?3)
         ORDER BY time"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut appointments = stmt
        .query_map(
            params![date, staff_id, exclude.map(|u| u.to_string())],
            map_appointment,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    for appointment in &mut appointments {
        appointment.assignments = load_assignments(conn, appointment.id)?;
    }
    Ok(appointments)
}

fn staff_display_name(conn: &Connection, staff_id: &str) -> Result<String, Error> {
    let mut stmt = conn.prepare("SELECT display_name FROM staff WHERE id = ?")?;
    let mut rows = stmt.query([staff_id])?;
    if let Some(row) = rows.next()? {
        Ok(row.get(0)?)
    } else {
        Ok(staff_id.to_string())
    }
}

/// Scan one staff member's same-day bookings for the first conflict with
/// `candidate`. Existing intervals are rebuilt from their stored time and
/// duration; rows the parser cannot read are logged and skipped rather
/// than blocking the booking.
fn conflict_for_staff(
    conn: &Connection,
    staff_id: &str,
    display_name: &str,
    candidate: &Interval,
    exclude: Option<Uuid>,
) -> Result<Option<Error>, Error> {
    let date = candidate.start.date().to_string();
    let existing = staff_day_appointments(conn, staff_id, &date, exclude)?;
    for other in existing {
        let other_interval =
            match Interval::from_parts(&other.date, &other.time, other.duration_hours) {
                Ok(iv) => iv,
                Err(e) => {
                    tracing::warn!(
                        appointment = %other.id,
                        "skipping unreadable appointment in conflict check: {}",
                        e
                    );
                    continue;
                }
            };
        if intervals_conflict(candidate, &other_interval) {
            let message = format!(
                "{} already has an appointment from {} to {} on {}",
                display_name,
                other_interval.start.format("%H:%M"),
                other_interval.end.format("%H:%M"),
                other.date,
            );
            return Ok(Some(Error::Conflict {
                staff_id: staff_id.to_string(),
                staff_name: display_name.to_string(),
                message,
                appointment: Box::new(other),
            }));
        }
    }
    Ok(None)
}

/// The staff calendars a booking must clear: its assignment rows, or the
/// legacy denormalized assignee when no rows exist. Label-only bookings
/// have neither and skip conflict checking entirely.
fn conflict_targets(appointment: &Appointment) -> Vec<(String, String)> {
    if !appointment.assignments.is_empty() {
        return appointment
            .assignments
            .iter()
            .map(|a| (a.staff_id.clone(), a.display_name.clone()))
            .collect();
    }
    match &appointment.staff_id {
        Some(staff_id) => {
            let name = appointment
                .assigned_to_label
                .clone()
                .unwrap_or_else(|| staff_id.clone());
            vec![(staff_id.clone(), name)]
        }
        None => Vec::new(),
    }
}

fn insert_appointment_row(conn: &Connection, a: &Appointment) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO appointments (id, customer_id, customer_name, date, time, duration_hours,
             reason, details, staff_id, assigned_to_label, reminder_offset_minutes,
             reminder_sent, is_client_visit, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            a.id.to_string(),
            a.customer_id,
            a.customer_name,
            a.date,
            a.time,
            a.duration_hours,
            a.reason,
            a.details,
            a.staff_id,
            a.assigned_to_label,
            a.reminder_offset_minutes,
            a.reminder_sent as i64,
            a.is_client_visit as i64,
            a.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn update_appointment_row(conn: &Connection, a: &Appointment) -> Result<(), Error> {
    conn.execute(
        "UPDATE appointments SET customer_id = ?, customer_name = ?, date = ?, time = ?,
             duration_hours = ?, reason = ?, details = ?, staff_id = ?, assigned_to_label = ?,
             reminder_offset_minutes = ?, reminder_sent = ?, is_client_visit = ?
         WHERE id = ?",
        params![
            a.customer_id,
            a.customer_name,
            a.date,
            a.time,
            a.duration_hours,
            a.reason,
            a.details,
            a.staff_id,
            a.assigned_to_label,
            a.reminder_offset_minutes,
            a.reminder_sent as i64,
            a.is_client_visit as i64,
            a.id.to_string(),
        ],
    )?;
    Ok(())
}

fn insert_assignment_row(conn: &Connection, assignment: &StaffAssignment) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO staff_assignments (id, appointment_id, staff_id, display_name)
         VALUES (?, ?, ?, ?)",
        params![
            assignment.id.to_string(),
            assignment.appointment_id.to_string(),
            assignment.staff_id,
            assignment.display_name,
        ],
    )?;
    Ok(())
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

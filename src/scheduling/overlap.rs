use crate::models::Appointment;

use super::Interval;

/// Outcome of probing one staff member's day for a conflicting booking.
#[derive(Debug, Clone, Default)]
pub struct ConflictCheck {
    pub conflict: bool,
    pub conflicting: Option<Appointment>,
    pub message: Option<String>,
}

/// The overlap policy.
///
/// Two intervals conflict when they share an instant
/// (`candidate.start < existing.end && candidate.end > existing.start`),
/// or when they start at the exact same instant even if the spans are
/// otherwise disjoint. The equal-start clause is deliberately stricter
/// than plain interval intersection and is kept as observed policy.
pub fn intervals_conflict(candidate: &Interval, existing: &Interval) -> bool {
    if candidate.start == existing.start {
        return true;
    }
    candidate.start < existing.end && candidate.end > existing.start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(time: &str, duration: f64) -> Interval {
        Interval::from_parts("2026-03-14", time, duration).unwrap()
    }

    #[test]
    fn partial_overlap_conflicts() {
        // 10:30-11:30 against 10:00-11:00
        assert!(intervals_conflict(&iv("10:30", 1.0), &iv("10:00", 1.0)));
        // and the mirror image
        assert!(intervals_conflict(&iv("09:30", 1.0), &iv("10:00", 1.0)));
    }

    #[test]
    fn containment_conflicts() {
        assert!(intervals_conflict(&iv("10:15", 0.5), &iv("10:00", 2.0)));
        assert!(intervals_conflict(&iv("09:00", 4.0), &iv("10:00", 1.0)));
    }

    #[test]
    fn adjacent_intervals_do_not_conflict() {
        // back-to-back bookings are fine: [10,11) then [11,12)
        assert!(!intervals_conflict(&iv("11:00", 1.0), &iv("10:00", 1.0)));
        assert!(!intervals_conflict(&iv("09:00", 1.0), &iv("10:00", 1.0)));
    }

    #[test]
    fn disjoint_intervals_do_not_conflict() {
        assert!(!intervals_conflict(&iv("14:00", 1.0), &iv("10:00", 1.0)));
    }

    #[test]
    fn equal_start_conflicts_regardless_of_duration() {
        // 10:00 for 15 minutes vs 10:00 for an hour still collides
        assert!(intervals_conflict(&iv("10:00", 0.25), &iv("10:00", 1.0)));
        assert!(intervals_conflict(&iv("10:00", 1.0), &iv("10:00", 0.25)));
    }
}

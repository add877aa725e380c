use chrono::{Duration, NaiveDate, NaiveTime};

use super::Interval;

/// Default bookable day: 08:00 to 18:00 in 30-minute steps.
pub const DEFAULT_DAY_START_MINUTE: u32 = 8 * 60;
pub const DEFAULT_DAY_END_MINUTE: u32 = 18 * 60;
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

/// Bookable-hours policy bounding slot generation. Business configuration,
/// injected through router state rather than read from constants at the
/// point of use.
#[derive(Debug, Clone, Copy)]
pub struct WorkingWindow {
    /// Minutes after midnight at which the working day opens.
    pub start_minute: u32,
    /// Minutes after midnight at which the working day closes.
    pub end_minute: u32,
    pub slot_minutes: u32,
}

impl Default for WorkingWindow {
    fn default() -> Self {
        Self {
            start_minute: DEFAULT_DAY_START_MINUTE,
            end_minute: DEFAULT_DAY_END_MINUTE,
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

/// Generate the free slot labels for one staff member's day.
///
/// A slot is excluded when its start instant falls inside the `[start, end)`
/// of any existing booking. Pure function of the window, day and bookings;
/// output is ascending `HH:MM` labels.
pub fn generate_slots(window: &WorkingWindow, day: NaiveDate, booked: &[Interval]) -> Vec<String> {
    let midnight = day.and_time(NaiveTime::MIN);
    let mut slots = Vec::new();
    let mut minute = window.start_minute;
    while minute < window.end_minute {
        let slot_start = midnight + Duration::minutes(i64::from(minute));
        let taken = booked
            .iter()
            .any(|b| slot_start >= b.start && slot_start < b.end);
        if !taken {
            slots.push(format!("{:02}:{:02}", minute / 60, minute % 60));
        }
        minute += window.slot_minutes;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn empty_day_yields_the_whole_window() {
        let slots = generate_slots(&WorkingWindow::default(), day(), &[]);
        assert_eq!(slots.len(), 20);
        assert_eq!(slots.first().map(String::as_str), Some("08:00"));
        assert_eq!(slots.last().map(String::as_str), Some("17:30"));
    }

    #[test]
    fn booking_masks_the_slots_it_covers() {
        let booked = [Interval::from_parts("2026-03-14", "10:00", 1.0).unwrap()];
        let slots = generate_slots(&WorkingWindow::default(), day(), &booked);
        assert_eq!(slots.len(), 18);
        assert!(!slots.contains(&"10:00".to_string()));
        assert!(!slots.contains(&"10:30".to_string()));
        assert!(slots.contains(&"09:30".to_string()));
        assert!(slots.contains(&"11:00".to_string()));
    }

    #[test]
    fn half_hour_booking_masks_a_single_slot() {
        let booked = [Interval::from_parts("2026-03-14", "10:00", 0.5).unwrap()];
        let slots = generate_slots(&WorkingWindow::default(), day(), &booked);
        assert!(!slots.contains(&"10:00".to_string()));
        assert!(slots.contains(&"10:30".to_string()));
    }

    #[test]
    fn custom_window_is_honored() {
        let window = WorkingWindow {
            start_minute: 9 * 60,
            end_minute: 12 * 60,
            slot_minutes: 60,
        };
        let slots = generate_slots(&window, day(), &[]);
        assert_eq!(slots, vec!["09:00", "10:00", "11:00"]);
    }

    #[test]
    fn output_is_chronological() {
        let booked = [Interval::from_parts("2026-03-14", "09:00", 1.0).unwrap()];
        let slots = generate_slots(&WorkingWindow::default(), day(), &booked);
        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
    }
}

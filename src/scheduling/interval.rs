use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::Error;

/// A half-open `[start, end)` span of local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    /// Build an interval from a stored or submitted (date, time, duration)
    /// triple. Fractional durations are supported (0.5 = 30 minutes) and
    /// rounded to whole seconds. Durations the calendar arithmetic cannot
    /// represent are a validation error, not a panic.
    pub fn from_parts(date: &str, time: &str, duration_hours: f64) -> Result<Self, Error> {
        let day = parse_date(date)?;
        let clock = parse_clock_time(time)?;
        let start = day.and_time(clock);
        let out_of_range =
            || Error::Validation(format!("duration out of range: {duration_hours}"));
        let seconds = (duration_hours * 3600.0).round();
        if !seconds.is_finite() {
            return Err(out_of_range());
        }
        let span = Duration::try_seconds(seconds as i64).ok_or_else(out_of_range)?;
        let end = start.checked_add_signed(span).ok_or_else(out_of_range)?;
        Ok(Self { start, end })
    }

    /// The calendar day the interval starts on, as stored (`YYYY-MM-DD`).
    pub fn date_string(&self) -> String {
        self.start.date().to_string()
    }

    /// Normalized 24-hour `HH:MM` start label.
    pub fn time_string(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

/// Parse a clock time in either 24-hour `HH:MM` or 12-hour `H:MM AM/PM`
/// form into a typed time-of-day.
///
/// 12-hour arithmetic: `12:xx AM` is hour 0, `12:xx PM` stays hour 12, any
/// other PM hour gains 12.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, Error> {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();

    let (body, meridiem) = if let Some(stripped) = upper.strip_suffix("AM") {
        (stripped.trim_end(), Some(Meridiem::Am))
    } else if let Some(stripped) = upper.strip_suffix("PM") {
        (stripped.trim_end(), Some(Meridiem::Pm))
    } else {
        (upper.as_str(), None)
    };

    let invalid = || Error::InvalidTimeFormat(raw.to_string());

    let (hour_part, minute_part) = body.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour_part.trim().parse().map_err(|_| invalid())?;
    let minute: u32 = minute_part.trim().parse().map_err(|_| invalid())?;

    let hour = match meridiem {
        Some(Meridiem::Am) if hour == 12 => 0,
        Some(Meridiem::Pm) if hour != 12 => hour + 12,
        _ => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

/// Parse a calendar date as `YYYY-MM-DD`, falling back to the date part of
/// an RFC 3339 timestamp for clients that send full datetimes.
pub fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn parses_24_hour_times() {
        assert_eq!(parse_clock_time("14:30").unwrap(), hm(14, 30));
        assert_eq!(parse_clock_time("00:05").unwrap(), hm(0, 5));
        assert_eq!(parse_clock_time("9:00").unwrap(), hm(9, 0));
    }

    #[test]
    fn parses_12_hour_times() {
        assert_eq!(parse_clock_time("2:30 PM").unwrap(), hm(14, 30));
        assert_eq!(parse_clock_time("2:30 AM").unwrap(), hm(2, 30));
        assert_eq!(parse_clock_time("2:30pm").unwrap(), hm(14, 30));
    }

    #[test]
    fn noon_and_midnight_edge_cases() {
        assert_eq!(parse_clock_time("12:00 AM").unwrap(), hm(0, 0));
        assert_eq!(parse_clock_time("12:15 PM").unwrap(), hm(12, 15));
    }

    #[test]
    fn rejects_garbage_times() {
        assert!(matches!(
            parse_clock_time("half past two"),
            Err(Error::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            parse_clock_time("ab:cd"),
            Err(Error::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            parse_clock_time("25:00"),
            Err(Error::InvalidTimeFormat(_))
        ));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(matches!(
            parse_date("yesterday"),
            Err(Error::InvalidDate(_))
        ));
        assert!(matches!(
            parse_date("2026-13-40"),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn accepts_rfc3339_dates() {
        assert_eq!(
            parse_date("2026-03-14T09:00:00Z").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
        );
    }

    #[test]
    fn interval_spans_the_duration() {
        let iv = Interval::from_parts("2026-03-14", "10:00", 1.0).unwrap();
        assert_eq!(iv.time_string(), "10:00");
        assert_eq!(iv.end - iv.start, Duration::hours(1));

        let half = Interval::from_parts("2026-03-14", "10:00", 0.5).unwrap();
        assert_eq!(half.end - half.start, Duration::minutes(30));
    }

    #[test]
    fn out_of_range_duration_is_an_error_not_a_panic() {
        assert!(matches!(
            Interval::from_parts("2026-03-14", "10:00", 1.0e16),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            Interval::from_parts("2026-03-14", "10:00", f64::INFINITY),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn interval_normalizes_am_pm_input() {
        let iv = Interval::from_parts("2026-03-14", "2:30 PM", 1.0).unwrap();
        assert_eq!(iv.time_string(), "14:30");
        assert_eq!(iv.date_string(), "2026-03-14");
    }
}

//! # Calendar Codec
//! Turns the date and time typed by the operator into a [`DateTime`].
//!
//! The text is positional ASCII, `yy-mm-dd DDD HH:MM:SS`, where `DDD` is the first three letters of the
//! day name in any case. The separators inside the date and the time are not checked, only their
//! positions matter. Between the date, the day name and the time any run of spaces or punctuation is
//! accepted (including none at all), so `23-08-30SAT12:30:45` parses as well.
//!
//! Validation only checks upper bounds. There is no leap year handling and no cross check between the
//! day name and the date.

use crate::datetime::{
    DateTime, MAX_DATE, MAX_HOURS, MAX_MINUTES, MAX_MONTH, MAX_SECONDS, MAX_YEAR, Weekday,
};
use core::fmt;

/// Help text shown before every date and time entry.
pub const CALENDAR_FORMAT_HELP: &str =
    "Enter the Date And time in the Following Form\nyy-mm-dd (First 3 Letters of Day Name) HH:MM:SS\n";

/// Length of the date part, `yy-mm-dd`.
const DATE_LEN: usize = 8;
/// Length of the time part, `HH:MM:SS`.
const TIME_LEN: usize = 8;
/// Length of the day name abbreviation.
const DAY_LEN: usize = 3;

/// Field of a [`DateTime`] that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalendarField {
    /// Two-digit year
    Year,
    /// Month
    Month,
    /// Day of the month
    Date,
    /// Hour
    Hour,
    /// Minute
    Minute,
    /// Second
    Second,
}

/// The operator entered a date or time the clock cannot take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidCalendar {
    /// The text is too short, or the parts are not where they should be
    BadLayout,
    /// A digit position holds something else
    NotADigit,
    /// The day name is not one of the seven known abbreviations
    UnknownWeekday,
    /// A field is above its upper bound
    OutOfRange(CalendarField),
}

impl fmt::Display for InvalidCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLayout => f.write_str("date and time do not follow yy-mm-dd DDD HH:MM:SS"),
            Self::NotADigit => f.write_str("expected a digit"),
            Self::UnknownWeekday => f.write_str("unknown day name"),
            Self::OutOfRange(field) => write!(f, "{field:?} out of range"),
        }
    }
}

/// Parser state for the set date and time dialogue.
#[derive(Debug, Default)]
pub struct CalendarCodec {
    /// Whether the welcome line of the set date and time mode was already shown
    has_shown_welcome: bool,
}

impl CalendarCodec {
    /// Create a codec that has not shown its welcome line yet.
    pub const fn new() -> Self {
        Self {
            has_shown_welcome: false,
        }
    }

    /// Returns `true` exactly once, the first time the set date and time mode is entered.
    pub const fn take_welcome(&mut self) -> bool {
        let first = !self.has_shown_welcome;
        self.has_shown_welcome = true;
        first
    }

    /// Whether the welcome line was already shown.
    pub const fn has_shown_welcome(&self) -> bool {
        self.has_shown_welcome
    }

    /// Parse and validate operator text. This is a pure function of `text`.
    ///
    /// # Errors
    /// [`InvalidCalendar`] if the layout is wrong, a digit is missing, the day name is unknown or a
    /// field is above its bound.
    pub fn parse(text: &[u8]) -> Result<DateTime, InvalidCalendar> {
        let text = text.trim_ascii_end();
        let date = text.get(..DATE_LEN).ok_or(InvalidCalendar::BadLayout)?;

        let rest = skip_separators(&text[DATE_LEN..]);
        let day = rest.get(..DAY_LEN).ok_or(InvalidCalendar::BadLayout)?;
        let weekday = Weekday::from_abbreviation(day).ok_or(InvalidCalendar::UnknownWeekday)?;

        let time = skip_separators(&rest[DAY_LEN..]);
        if time.len() != TIME_LEN {
            return Err(InvalidCalendar::BadLayout);
        }

        let date_time = DateTime {
            year: two_digits(date[0], date[1])?,
            month: two_digits(date[3], date[4])?,
            date: two_digits(date[6], date[7])?,
            hour: two_digits(time[0], time[1])?,
            minute: two_digits(time[3], time[4])?,
            second: two_digits(time[6], time[7])?,
            weekday,
        };
        check_calendar(&date_time)?;
        Ok(date_time)
    }
}

/// Check the upper bounds of every field.
///
/// # Errors
/// [`InvalidCalendar::OutOfRange`] naming the first offending field.
pub const fn check_calendar(dt: &DateTime) -> Result<(), InvalidCalendar> {
    let field = if dt.date > MAX_DATE {
        CalendarField::Date
    } else if dt.hour > MAX_HOURS {
        CalendarField::Hour
    } else if dt.minute > MAX_MINUTES {
        CalendarField::Minute
    } else if dt.month > MAX_MONTH {
        CalendarField::Month
    } else if dt.second > MAX_SECONDS {
        CalendarField::Second
    } else if dt.year > MAX_YEAR {
        CalendarField::Year
    } else {
        return Ok(());
    };
    Err(InvalidCalendar::OutOfRange(field))
}

/// Decode two ASCII digits into their value.
const fn two_digits(tens: u8, ones: u8) -> Result<u8, InvalidCalendar> {
    if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
        return Err(InvalidCalendar::NotADigit);
    }
    Ok((tens - b'0') * 10 + (ones - b'0'))
}

/// Drop leading bytes that are neither letters nor digits.
fn skip_separators(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(u8::is_ascii_alphanumeric)
        .unwrap_or(bytes.len());
    &bytes[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_literal() {
        let dt = CalendarCodec::parse(b"23-08-30SAT12:30:45").unwrap();
        assert_eq!(
            dt,
            DateTime {
                year: 23,
                month: 8,
                date: 30,
                hour: 12,
                minute: 30,
                second: 45,
                weekday: Weekday::Saturday,
            }
        );
    }

    #[test]
    fn parses_spaced_and_bracketed_forms() {
        let expected = CalendarCodec::parse(b"23-08-30SAT12:30:45").unwrap();
        assert_eq!(CalendarCodec::parse(b"23-08-30 SAT 12:30:45").unwrap(), expected);
        assert_eq!(CalendarCodec::parse(b"23-08-30 (sat) 12:30:45\r\n").unwrap(), expected);
    }

    #[test]
    fn parse_is_a_pure_function() {
        let text = b"24-02-29 thu 23:59:59";
        assert_eq!(CalendarCodec::parse(text), CalendarCodec::parse(text));
    }

    #[test]
    fn unknown_weekday_is_invalid() {
        assert_eq!(
            CalendarCodec::parse(b"23-08-30 XXX 12:30:45"),
            Err(InvalidCalendar::UnknownWeekday)
        );
    }

    #[test]
    fn hour_above_23_is_invalid() {
        assert_eq!(
            CalendarCodec::parse(b"23-08-30 SAT 25:30:45"),
            Err(InvalidCalendar::OutOfRange(CalendarField::Hour))
        );
    }

    #[test]
    fn every_bound_is_checked() {
        let cases: [(&[u8], CalendarField); 5] = [
            (b"23-13-30 SAT 12:30:45", CalendarField::Month),
            (b"23-08-32 SAT 12:30:45", CalendarField::Date),
            (b"23-08-30 SAT 12:60:45", CalendarField::Minute),
            (b"23-08-30 SAT 12:30:60", CalendarField::Second),
            (b"23-08-30 SAT 24:00:00", CalendarField::Hour),
        ];
        for (text, field) in cases {
            assert_eq!(CalendarCodec::parse(text), Err(InvalidCalendar::OutOfRange(field)));
        }
    }

    #[test]
    fn no_normalisation_is_applied() {
        // 30th of February on a Monday is accepted as typed
        let dt = CalendarCodec::parse(b"23-02-30 MON 00:00:00").unwrap();
        assert_eq!((dt.month, dt.date, dt.weekday), (2, 30, Weekday::Monday));
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert_eq!(CalendarCodec::parse(b"23-08"), Err(InvalidCalendar::BadLayout));
        assert_eq!(CalendarCodec::parse(b"23-08-30 SAT 12:30"), Err(InvalidCalendar::BadLayout));
        assert_eq!(
            CalendarCodec::parse(b"2x-08-30 SAT 12:30:45"),
            Err(InvalidCalendar::NotADigit)
        );
    }

    #[test]
    fn welcome_is_shown_once() {
        let mut codec = CalendarCodec::new();
        assert!(!codec.has_shown_welcome());
        assert!(codec.take_welcome());
        assert!(!codec.take_welcome());
        assert!(codec.has_shown_welcome());
    }
}

//! # Date and time
//! The structured clock reading shared by the clock source, the calendar codec and the alarm engine.

use core::fmt;

/// Largest two-digit year the clock accepts.
pub const MAX_YEAR: u8 = 99;
/// Largest month number.
pub const MAX_MONTH: u8 = 12;
/// Largest day of the month.
pub const MAX_DATE: u8 = 31;
/// Largest hour in 24 hour format.
pub const MAX_HOURS: u8 = 23;
/// Largest minute.
pub const MAX_MINUTES: u8 = 59;
/// Largest second.
pub const MAX_SECONDS: u8 = 59;

/// Day of the week, in the order the operator abbreviations are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    /// SAT
    Saturday,
    /// SUN
    Sunday,
    /// MON
    Monday,
    /// TUE
    Tuesday,
    /// WED
    Wednesday,
    /// THU
    Thursday,
    /// FRI
    Friday,
}

impl Weekday {
    /// All days, in abbreviation matching order.
    pub const ALL: [Self; 7] = [
        Self::Saturday,
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    /// Upper case three letter abbreviation.
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Saturday => "SAT",
            Self::Sunday => "SUN",
            Self::Monday => "MON",
            Self::Tuesday => "TUE",
            Self::Wednesday => "WED",
            Self::Thursday => "THU",
            Self::Friday => "FRI",
        }
    }

    /// Match three letters against the known abbreviations, ignoring case.
    /// Returns `None` for anything that is not exactly one of the seven days.
    pub fn from_abbreviation(letters: &[u8]) -> Option<Self> {
        if letters.len() != 3 {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|day| day.abbreviation().as_bytes().eq_ignore_ascii_case(letters))
    }

    /// Byte used for the weekday in notification frames, SAT = 1 through FRI = 7.
    pub const fn to_wire(self) -> u8 {
        match self {
            Self::Saturday => 1,
            Self::Sunday => 2,
            Self::Monday => 3,
            Self::Tuesday => 4,
            Self::Wednesday => 5,
            Self::Thursday => 6,
            Self::Friday => 7,
        }
    }

    /// Inverse of [`Weekday::to_wire`].
    pub const fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Saturday),
            2 => Some(Self::Sunday),
            3 => Some(Self::Monday),
            4 => Some(Self::Tuesday),
            5 => Some(Self::Wednesday),
            6 => Some(Self::Thursday),
            7 => Some(Self::Friday),
            _ => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// A snapshot of the clock, either read from the RTC or entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Two-digit year, 0-99
    pub year: u8,
    /// Month, 1-12
    pub month: u8,
    /// Day of the month, 1-31
    pub date: u8,
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Second, 0-59
    pub second: u8,
    /// Day of the week
    pub weekday: Weekday,
}

impl DateTime {
    /// The time of day as (hour, minute, second).
    pub const fn hms(&self) -> (u8, u8, u8) {
        (self.hour, self.minute, self.second)
    }
}

impl fmt::Display for DateTime {
    /// Canonical operator form, `yy-mm-dd DDD HH:MM:SS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:02} {} {:02}:{:02}:{:02}",
            self.year, self.month, self.date, self.weekday, self.hour, self.minute, self.second
        )
    }
}

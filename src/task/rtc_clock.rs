//! # RTC clock source
//! The RP2040 real time clock behind the library's [`ClockSource`].
//!
//! The RTC keeps a four digit year, the terminal a two digit one within 2000-2099.

use clock_terminal::clock::ClockSource;
use clock_terminal::datetime::{DateTime, Weekday};
use defmt::{Debug2Format, info, warn};
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{self, DayOfWeek, Rtc, RtcError};

/// The century the two digit year lives in.
const CENTURY: u16 = 2000;

/// Time the RTC starts from after power up, 2000-01-01 was a Saturday.
const POWER_UP_TIME: DateTime = DateTime {
    year: 0,
    month: 1,
    date: 1,
    hour: 0,
    minute: 0,
    second: 0,
    weekday: Weekday::Saturday,
};

/// The RP2040 RTC as the clock source of the terminal.
pub struct RtcClock {
    rtc: Rtc<'static, RTC>,
}

impl RtcClock {
    /// Wrap the RTC. It does not run until it was set once, so a stopped RTC starts at [`POWER_UP_TIME`].
    pub fn new(rtc: Rtc<'static, RTC>) -> Self {
        let mut clock = Self { rtc };
        if !clock.rtc.is_running() {
            info!("rtc not running, starting at power up time");
            if let Err(e) = clock.set(&POWER_UP_TIME) {
                warn!("rtc could not be started: {:?}", Debug2Format(&e));
            }
        }
        clock
    }
}

impl ClockSource for RtcClock {
    type Error = RtcError;

    fn read(&mut self) -> Result<DateTime, Self::Error> {
        self.rtc.now().map(|now| from_rtc(&now))
    }

    fn set(&mut self, dt: &DateTime) -> Result<(), Self::Error> {
        self.rtc.set_datetime(to_rtc(dt))
    }
}

fn to_rtc(dt: &DateTime) -> rtc::DateTime {
    rtc::DateTime {
        year: CENTURY + u16::from(dt.year),
        month: dt.month,
        day: dt.date,
        day_of_week: match dt.weekday {
            Weekday::Saturday => DayOfWeek::Saturday,
            Weekday::Sunday => DayOfWeek::Sunday,
            Weekday::Monday => DayOfWeek::Monday,
            Weekday::Tuesday => DayOfWeek::Tuesday,
            Weekday::Wednesday => DayOfWeek::Wednesday,
            Weekday::Thursday => DayOfWeek::Thursday,
            Weekday::Friday => DayOfWeek::Friday,
        },
        hour: dt.hour,
        minute: dt.minute,
        second: dt.second,
    }
}

fn from_rtc(dt: &rtc::DateTime) -> DateTime {
    DateTime {
        // below 100 after the remainder, the fallback never applies
        year: u8::try_from(dt.year % 100).unwrap_or_default(),
        month: dt.month,
        date: dt.day,
        hour: dt.hour,
        minute: dt.minute,
        second: dt.second,
        weekday: match dt.day_of_week {
            DayOfWeek::Saturday => Weekday::Saturday,
            DayOfWeek::Sunday => Weekday::Sunday,
            DayOfWeek::Monday => Weekday::Monday,
            DayOfWeek::Tuesday => Weekday::Tuesday,
            DayOfWeek::Wednesday => Weekday::Wednesday,
            DayOfWeek::Thursday => Weekday::Thursday,
            DayOfWeek::Friday => Weekday::Friday,
        },
    }
}

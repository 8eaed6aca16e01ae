//! # StringUtils
//! Text the terminal puts on the operator line that needs formatting.

use crate::alarm::AlarmTime;
use crate::datetime::DateTime;
use core::fmt::Write;
use heapless::String;

/// Width of the text between the dashes of a banner.
pub const BANNER_WIDTH: usize = 30;

/// Length of a banner line, the text plus one dash on either side.
pub const BANNER_LEN: usize = BANNER_WIDTH + 2;

const DATE_TIME_PREFIX: &str = "Date & Time : ";

/// Longest date and time line, every `u8` field at three digits: six fields, a weekday and six
/// separators after the prefix.
pub const DATE_TIME_LINE_LEN: usize = DATE_TIME_PREFIX.len() + 6 * 3 + 3 + 6;

/// Formatting helpers for the operator line.
pub struct StringUtils;

impl StringUtils {
    /// Frame `text` as a banner line, centered between two dashes.
    /// Text longer than [`BANNER_WIDTH`] is cut.
    /// one example being `"-  Welcome To My Clock System  -"`
    pub fn banner(text: &str) -> String<BANNER_LEN> {
        let text = text.get(..BANNER_WIDTH).unwrap_or(text);
        let padding = BANNER_WIDTH.saturating_sub(text.len());
        let padding_left = padding / 2;
        let padding_right = padding - padding_left;

        let mut banner: String<BANNER_LEN> = String::new();
        // fits by construction, 1 + BANNER_WIDTH + 1 characters
        let _ = write!(banner, "-{:padding_left$}{}{:padding_right$}-", "", text, "");
        banner
    }

    /// The clock reading shown by the display option.
    /// one example being `"Date & Time : 23-08-30 SAT 12:30:45"`
    pub fn date_time_line(dt: &DateTime) -> String<DATE_TIME_LINE_LEN> {
        let mut s: String<DATE_TIME_LINE_LEN> = String::new();
        // fits for any field values, see DATE_TIME_LINE_LEN
        let _ = write!(s, "{DATE_TIME_PREFIX}{dt}");
        s
    }

    /// Confirmation after an alarm was armed.
    /// one example being `"Alarm 3 set to 07:30:00"`
    pub fn alarm_set_line(slot: u8, time: &AlarmTime) -> String<32> {
        let mut s: String<32> = String::new();
        let _ = write!(
            s,
            "Alarm {} set to {:02}:{:02}:{:02}",
            slot, time.hour, time.minute, time.second
        );
        s
    }
}

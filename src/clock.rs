//! # Clock Source
//! The real time clock the terminal reads and sets. On the board this is the RP2040 RTC, in tests a
//! settable fake.

use crate::datetime::DateTime;
use core::fmt;

/// A device that keeps calendar time.
pub trait ClockSource {
    /// Error of the underlying device
    type Error;

    /// Current date and time.
    ///
    /// # Errors
    /// The device could not be read.
    fn read(&mut self) -> Result<DateTime, Self::Error>;

    /// Replace the current date and time.
    ///
    /// # Errors
    /// The device rejected the value.
    fn set(&mut self, dt: &DateTime) -> Result<(), Self::Error>;
}

/// The clock source failed. The device error is logged where it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockUnavailable;

impl fmt::Display for ClockUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("clock source unavailable")
    }
}

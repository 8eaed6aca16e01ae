//! # Terminal configuration
//! The values come from `config/terminal_config.json`, which `build.rs` turns into constants.
//! Make sure the file looks like this (missing keys fall back to the defaults shown):
//!```json
//! {
//!     "tries": 3,
//!     "pulse_ms": 500,
//!     "tick_ms": 1000,
//!     "uart_baud": 9600,
//!     "spi_freq_hz": 62500
//! }
//! ```

/// Constants generated by `build.rs`.
mod generated {
    include!(concat!(env!("OUT_DIR"), "/terminal_config.rs"));
}

pub use generated::{PULSE_MS, SPI_FREQ_HZ, TICK_MS, TRIES, UART_BAUD};

/// Runtime view of the configuration, handed to the components that need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TerminalConfig {
    /// Login attempts before the terminal locks out
    pub tries: u8,
    /// High time of the peer notification pin pulse in milliseconds
    pub pulse_ms: u32,
    /// Period of the alarm comparison tick in milliseconds
    pub tick_ms: u64,
    /// Baud rate of the operator line
    pub uart_baud: u32,
    /// Clock frequency of the peer link
    pub spi_freq_hz: u32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            tries: TRIES,
            pulse_ms: PULSE_MS,
            tick_ms: TICK_MS,
            uart_baud: UART_BAUD,
            spi_freq_hz: SPI_FREQ_HZ,
        }
    }
}

impl TerminalConfig {
    /// Same configuration with a different number of login attempts.
    #[must_use]
    pub const fn with_tries(mut self, tries: u8) -> Self {
        self.tries = tries;
        self
    }
}

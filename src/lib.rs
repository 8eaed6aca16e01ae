//! # Clock Terminal
//! Control core of a dual-board clock terminal. An operator logs in over a character line, reads or sets
//! the real time clock and arms up to five alarms. A peer board is notified over a single-slot link
//! whenever the login succeeds, the terminal locks out, or an alarm fires.
//!
//! Everything in this library is written against `embedded-hal`, `embedded-hal-async` and
//! `embedded-io-async` traits, so it runs on the RP2040 firmware (`src/main.rs`) as well as on the host
//! under `cargo test`.
#![cfg_attr(not(test), no_std)]

// must come first, the logging macros are used by every module below
#[macro_use]
mod fmt;

pub mod alarm;
pub mod calendar;
pub mod clock;
pub mod clock_core;
pub mod config;
pub mod datetime;
pub mod guard;
pub mod line;
pub mod menu;
pub mod notification;
pub mod peer_link;
pub mod utility;

#[cfg(test)]
mod testing;

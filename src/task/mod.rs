//! Tasks that make up the firmware, and the concrete types they share.
use crate::task::peer_link::SignalTransport;
use crate::task::rtc_clock::RtcClock;
use clock_terminal::clock_core::ClockCore;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

pub mod alarm_tick;
pub mod operator;
pub mod peer_link;
pub mod rtc_clock;

/// The control core as built on the board.
pub type TerminalCore = ClockCore<RtcClock, SignalTransport>;

/// The control core behind the mutex every task locks.
pub type SharedClockCore = Mutex<CriticalSectionRawMutex, TerminalCore>;

//! # Test doubles
//! Host side stand-ins for the board peripherals. The recording doubles are cheap handles onto shared
//! state, so a test keeps a clone to inspect after handing the double to the code under test.

use crate::clock::ClockSource;
use crate::datetime::{DateTime, Weekday};
use crate::notification::NotificationFrame;
use crate::peer_link::FrameTransport;
use core::convert::Infallible;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

/// Operator line fed from a script. Reports end of input once the script is used up.
pub struct ScriptedLine {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl ScriptedLine {
    /// Line that reads `script` byte by byte.
    pub fn new(script: &[u8]) -> Self {
        Self {
            input: script.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    /// Everything written to the operator so far.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl embedded_io_async::ErrorType for ScriptedLine {
    type Error = Infallible;
}

impl embedded_io_async::Read for ScriptedLine {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // a real UART is never ready immediately, give the other futures a turn
        embassy_futures::yield_now().await;
        match (self.input.pop_front(), buf.first_mut()) {
            (Some(byte), Some(slot)) => {
                *slot = byte;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

impl embedded_io_async::Write for ScriptedLine {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Transport that records every frame it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    frames: Rc<RefCell<Vec<NotificationFrame>>>,
    refuse: Rc<Cell<bool>>,
}

impl RecordingTransport {
    /// Frames handed to the bus, oldest first.
    pub fn frames(&self) -> Vec<NotificationFrame> {
        self.frames.borrow().clone()
    }

    /// Make the bus refuse transfers.
    pub fn refuse(&self, refuse: bool) {
        self.refuse.set(refuse);
    }
}

impl FrameTransport for RecordingTransport {
    type Error = ();

    fn begin(&mut self, frame: &NotificationFrame) -> Result<(), Self::Error> {
        if self.refuse.get() {
            return Err(());
        }
        self.frames.borrow_mut().push(frame.clone());
        Ok(())
    }
}

/// Output pin that records every level it is driven to.
#[derive(Clone, Default)]
pub struct RecordingPin {
    levels: Rc<RefCell<Vec<bool>>>,
}

impl RecordingPin {
    /// Levels driven so far, `true` for high.
    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }
}

impl embedded_hal::digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

/// Delay that returns at once and sums up what it was asked to wait.
#[derive(Clone, Default)]
pub struct NoDelay {
    total_ns: Rc<Cell<u64>>,
}

impl NoDelay {
    /// Requested waiting time in milliseconds.
    pub fn total_ms(&self) -> u32 {
        u32::try_from(self.total_ns.get() / 1_000_000).unwrap()
    }
}

impl embedded_hal_async::delay::DelayNs for NoDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ns
            .set(self.total_ns.get() + u64::from(ms) * 1_000_000);
    }
}

/// Delay that never ends, for catching work stuck behind a pulse.
pub struct Stall;

impl embedded_hal_async::delay::DelayNs for Stall {
    async fn delay_ns(&mut self, _ns: u32) {
        core::future::pending::<()>().await;
    }
}

#[derive(Debug)]
struct ClockState {
    now: DateTime,
    broken: bool,
    writes: Vec<DateTime>,
}

/// Clock that reports whatever the test sets.
#[derive(Clone)]
pub struct FakeClock {
    state: Rc<RefCell<ClockState>>,
}

impl FakeClock {
    /// Clock standing at `now`.
    pub fn new(now: DateTime) -> Self {
        Self {
            state: Rc::new(RefCell::new(ClockState {
                now,
                broken: false,
                writes: Vec::new(),
            })),
        }
    }

    /// Move the clock to `hour:minute:second`, keeping the date.
    pub fn set_time(&self, hour: u8, minute: u8, second: u8) {
        let mut state = self.state.borrow_mut();
        state.now.hour = hour;
        state.now.minute = minute;
        state.now.second = second;
    }

    /// Make every access fail.
    pub fn break_down(&self) {
        self.state.borrow_mut().broken = true;
    }

    /// Values written through [`ClockSource::set`].
    pub fn writes(&self) -> Vec<DateTime> {
        self.state.borrow().writes.clone()
    }
}

impl ClockSource for FakeClock {
    type Error = ();

    fn read(&mut self) -> Result<DateTime, Self::Error> {
        let state = self.state.borrow();
        if state.broken { Err(()) } else { Ok(state.now) }
    }

    fn set(&mut self, dt: &DateTime) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.broken {
            return Err(());
        }
        state.now = *dt;
        state.writes.push(*dt);
        Ok(())
    }
}

/// `23-08-30 SAT 12:00:00`.
pub const fn noon() -> DateTime {
    DateTime {
        year: 23,
        month: 8,
        date: 30,
        hour: 12,
        minute: 0,
        second: 0,
        weekday: Weekday::Saturday,
    }
}

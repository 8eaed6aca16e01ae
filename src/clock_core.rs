//! # Clock core
//! The state shared between the operator session and the periodic alarm tick: the clock source, the alarm
//! engine and the peer link. On the board it sits behind an `embassy_sync` mutex and both sides reach it
//! through [`SharedCore`].

use crate::alarm::{ALARM_TEXT_LEN, AlarmEngine, AlarmError, AlarmTime};
use crate::clock::{ClockSource, ClockUnavailable};
use crate::datetime::DateTime;
use crate::notification::NotificationFrame;
use crate::peer_link::{Completion, FrameTransport, LinkError, LinkEvent, PeerLink};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;

/// Clock, alarms and peer link.
pub struct ClockCore<C, T> {
    clock: C,
    alarms: AlarmEngine,
    link: PeerLink<T>,
    /// Set while an operator holds a granted login
    checks_enabled: bool,
    /// Time of day seen by the previous tick
    last_sample: Option<(u8, u8, u8)>,
}

impl<C, T> ClockCore<C, T>
where
    C: ClockSource,
    T: FrameTransport,
{
    /// Empty alarm table, alarm checks off.
    pub fn new(clock: C, link: PeerLink<T>) -> Self {
        Self {
            clock,
            alarms: AlarmEngine::new(),
            link,
            checks_enabled: false,
            last_sample: None,
        }
    }

    /// Let [`ClockCore::tick`] compare alarms from now on.
    pub fn start_alarm_checks(&mut self) {
        info!("alarm checks started");
        self.checks_enabled = true;
    }

    /// Stop comparing alarms until the next [`ClockCore::start_alarm_checks`].
    pub fn stop_alarm_checks(&mut self) {
        if self.checks_enabled {
            info!("alarm checks stopped");
        }
        self.checks_enabled = false;
        self.last_sample = None;
    }

    /// Whether ticks compare alarms.
    pub const fn alarm_checks_enabled(&self) -> bool {
        self.checks_enabled && !self.link.is_halted()
    }

    /// Whether the terminal halted.
    pub const fn is_halted(&self) -> bool {
        self.link.is_halted()
    }

    /// The alarm table.
    pub const fn alarms(&self) -> &AlarmEngine {
        &self.alarms
    }

    /// The peer link.
    pub const fn link(&self) -> &PeerLink<T> {
        &self.link
    }

    /// Read the clock source.
    ///
    /// # Errors
    /// [`ClockUnavailable`] if the device failed.
    pub fn read_clock(&mut self) -> Result<DateTime, ClockUnavailable> {
        self.clock.read().map_err(|_| {
            error!("clock read failed");
            ClockUnavailable
        })
    }

    /// Commit a new date and time to the clock source.
    ///
    /// # Errors
    /// [`ClockUnavailable`] if the device failed.
    pub fn set_clock(&mut self, dt: &DateTime) -> Result<(), ClockUnavailable> {
        self.clock.set(dt).map_err(|_| {
            error!("clock write failed");
            ClockUnavailable
        })?;
        info!("clock set to {:?}", dt);
        // the next tick must compare against the new time even if it repeats the old one
        self.last_sample = None;
        Ok(())
    }

    /// Arm an alarm slot, see [`AlarmEngine::set_alarm`].
    ///
    /// # Errors
    /// [`AlarmError::OutOfRangeAlarmSlot`] if `slot` is not 1-5.
    pub fn set_alarm(
        &mut self,
        slot: u8,
        hhmmss: &[u8; ALARM_TEXT_LEN],
        label: &[u8],
    ) -> Result<AlarmTime, AlarmError> {
        self.alarms.set_alarm(slot, hhmmss, label)
    }

    /// Offer a frame to the peer link.
    ///
    /// # Errors
    /// See [`PeerLink::send`].
    pub fn notify(
        &mut self,
        frame: NotificationFrame,
        completion: Completion,
    ) -> Result<(), LinkError<T::Error>> {
        self.link.send(frame, completion)
    }

    /// Halt the terminal. No more alarm checks, no more frames.
    pub fn enter_terminal_state(&mut self) {
        self.link.enter_terminal_state();
    }

    /// One alarm check. Samples the clock once and sends an `ALARM_FIRED` frame for every slot that
    /// matches, each asking for a notify pin pulse when it is out. Returns the number of frames sent.
    ///
    /// Does nothing while no login is granted, after the terminal halted, and when the time of day did
    /// not change since the previous check.
    ///
    /// # Errors
    /// [`ClockUnavailable`] if the clock could not be read.
    pub fn tick(&mut self) -> Result<usize, ClockUnavailable> {
        if !self.alarm_checks_enabled() {
            return Ok(0);
        }
        let now = self.read_clock()?;
        if self.last_sample == Some(now.hms()) {
            return Ok(0);
        }
        self.last_sample = Some(now.hms());

        let mut sent = 0;
        for fired in self.alarms.compare(&now) {
            info!("alarm {} fired", fired.slot);
            match self
                .link
                .send(self.alarms.fired_frame(fired), Completion::PulsePin)
            {
                Ok(()) => sent += 1,
                Err(_) => warn!("alarm {} notification dropped", fired.slot),
            }
        }
        Ok(sent)
    }

    /// The transport finished, see [`PeerLink::on_transfer_complete`].
    pub fn on_transfer_complete(&mut self) -> LinkEvent {
        self.link.on_transfer_complete()
    }
}

/// Access to the clock core from the operator session. Each call holds the core only for its own
/// duration, never across operator input.
#[allow(async_fn_in_trait)]
pub trait SharedCore {
    /// Error of the frame transport
    type TransportError;

    /// See [`ClockCore::notify`].
    async fn notify(
        &self,
        frame: NotificationFrame,
        completion: Completion,
    ) -> Result<(), LinkError<Self::TransportError>>;

    /// Like [`SharedCore::notify`], but waits for the frame in flight to finish instead of dropping
    /// `frame`. Lets other tasks at the core while waiting.
    ///
    /// # Errors
    /// [`LinkError::Halted`] or [`LinkError::Transport`], see [`ClockCore::notify`].
    async fn notify_when_idle(
        &self,
        frame: NotificationFrame,
        completion: Completion,
    ) -> Result<(), LinkError<Self::TransportError>>;

    /// See [`ClockCore::start_alarm_checks`].
    async fn start_alarm_checks(&self);

    /// See [`ClockCore::stop_alarm_checks`].
    async fn stop_alarm_checks(&self);

    /// See [`ClockCore::enter_terminal_state`].
    async fn enter_terminal_state(&self);

    /// See [`ClockCore::read_clock`].
    async fn read_clock(&self) -> Result<DateTime, ClockUnavailable>;

    /// See [`ClockCore::set_clock`].
    async fn set_clock(&self, dt: &DateTime) -> Result<(), ClockUnavailable>;

    /// See [`ClockCore::set_alarm`].
    async fn set_alarm(
        &self,
        slot: u8,
        hhmmss: &[u8; ALARM_TEXT_LEN],
        label: &[u8],
    ) -> Result<AlarmTime, AlarmError>;
}

impl<M, C, T> SharedCore for Mutex<M, ClockCore<C, T>>
where
    M: RawMutex,
    C: ClockSource,
    T: FrameTransport,
{
    type TransportError = T::Error;

    async fn notify(
        &self,
        frame: NotificationFrame,
        completion: Completion,
    ) -> Result<(), LinkError<T::Error>> {
        self.lock().await.notify(frame, completion)
    }

    async fn notify_when_idle(
        &self,
        frame: NotificationFrame,
        completion: Completion,
    ) -> Result<(), LinkError<T::Error>> {
        loop {
            {
                let mut core = self.lock().await;
                if !core.link().is_busy() {
                    return core.notify(frame, completion);
                }
            }
            yield_now().await;
        }
    }

    async fn start_alarm_checks(&self) {
        self.lock().await.start_alarm_checks();
    }

    async fn stop_alarm_checks(&self) {
        self.lock().await.stop_alarm_checks();
    }

    async fn enter_terminal_state(&self) {
        self.lock().await.enter_terminal_state();
    }

    async fn read_clock(&self) -> Result<DateTime, ClockUnavailable> {
        self.lock().await.read_clock()
    }

    async fn set_clock(&self, dt: &DateTime) -> Result<(), ClockUnavailable> {
        self.lock().await.set_clock(dt)
    }

    async fn set_alarm(
        &self,
        slot: u8,
        hhmmss: &[u8; ALARM_TEXT_LEN],
        label: &[u8],
    ) -> Result<AlarmTime, AlarmError> {
        self.lock().await.set_alarm(slot, hhmmss, label)
    }
}

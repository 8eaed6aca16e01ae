//! # Peer Link
//! Single slot transmitter towards the peer board. At most one frame is in flight. The transport starts a
//! transfer and reports its end later, at which point the completion action that was registered with the
//! frame is due:
//! - [`Completion::Nothing`]: no side effect
//! - [`Completion::PulsePin`]: the notify pin goes high for `pulse_ms`, then low again
//! - [`Completion::EnterTerminalState`]: the link halts and accepts no further frames
//!
//! A frame offered while another one is in flight is rejected with [`LinkError::Busy`] and dropped.
//!
//! [`PeerLink::on_transfer_complete`] is synchronous and applies the halt itself. The pin pulse is left to
//! [`NotifyPulse`], which the completion side owns, so nothing waits on the pulse while holding the link.

use crate::config::TerminalConfig;
use crate::notification::{Command, NotificationFrame};
use core::fmt;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

/// Starts the transfer of a frame. The end of the transfer is reported back through
/// [`PeerLink::on_transfer_complete`].
pub trait FrameTransport {
    /// Error of the underlying bus
    type Error;

    /// Hand the frame to the bus.
    ///
    /// # Errors
    /// The bus refused to start the transfer.
    fn begin(&mut self, frame: &NotificationFrame) -> Result<(), Self::Error>;
}

/// What happens once a frame has left the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// Nothing
    Nothing,
    /// Pulse the notify pin so the peer reads the frame
    PulsePin,
    /// Halt the terminal
    EnterTerminalState,
}

/// A frame was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Another frame is still in flight, the new one was dropped
    Busy,
    /// The terminal halted, the link takes no more frames
    Halted,
    /// The transport refused to start the transfer
    Transport(E),
}

impl<E: fmt::Debug> fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("peer link busy"),
            Self::Halted => f.write_str("peer link halted"),
            Self::Transport(e) => write!(f, "peer link transport error: {e:?}"),
        }
    }
}

/// What [`PeerLink::on_transfer_complete`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// No transfer was in flight
    Idle,
    /// The frame with this command finished and its completion action is due
    Completed(Option<Command>, Completion),
}

#[derive(Debug)]
struct InFlight {
    frame: NotificationFrame,
    completion: Completion,
}

/// The transmitter. Owns the transport.
pub struct PeerLink<T> {
    transport: T,
    in_flight: Option<InFlight>,
    halted: bool,
}

impl<T: FrameTransport> PeerLink<T> {
    /// Create an idle link.
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            in_flight: None,
            halted: false,
        }
    }

    /// Whether a frame is in flight.
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the terminal halted.
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// The frame currently in flight.
    pub fn in_flight(&self) -> Option<&NotificationFrame> {
        self.in_flight.as_ref().map(|entry| &entry.frame)
    }

    /// Start sending `frame` and remember what to do once it is out.
    ///
    /// # Errors
    /// [`LinkError::Busy`] while another frame is in flight, [`LinkError::Halted`] after the terminal
    /// halted, [`LinkError::Transport`] if the bus refused the frame. In every case the frame is dropped.
    pub fn send(
        &mut self,
        frame: NotificationFrame,
        completion: Completion,
    ) -> Result<(), LinkError<T::Error>> {
        if self.halted {
            return Err(LinkError::Halted);
        }
        if self.in_flight.is_some() {
            warn!("peer link busy, dropping frame {:?}", frame.code());
            return Err(LinkError::Busy);
        }
        self.transport.begin(&frame).map_err(LinkError::Transport)?;
        debug!("frame {:?} in flight", frame.code());
        self.in_flight = Some(InFlight { frame, completion });
        Ok(())
    }

    /// The transport finished the current transfer. Frees the link and applies a halt. A pin pulse is
    /// returned as due and left to [`NotifyPulse::follow`].
    pub fn on_transfer_complete(&mut self) -> LinkEvent {
        let Some(InFlight { frame, completion }) = self.in_flight.take() else {
            return LinkEvent::Idle;
        };
        if completion == Completion::EnterTerminalState {
            self.enter_terminal_state();
        }
        LinkEvent::Completed(Command::from_code(frame.code()), completion)
    }

    /// Halt the link. Used by the lockout completion and by the guard itself.
    pub fn enter_terminal_state(&mut self) {
        if !self.halted {
            error!("terminal halted");
        }
        self.halted = true;
    }
}

/// Drives the notify pin towards the peer.
pub struct NotifyPulse<P, D> {
    pin: P,
    delay: D,
    pulse_ms: u32,
}

impl<P: OutputPin, D: DelayNs> NotifyPulse<P, D> {
    /// Pulse of `config.pulse_ms` on `pin`. The pin is expected to idle low.
    pub const fn new(pin: P, delay: D, config: &TerminalConfig) -> Self {
        Self {
            pin,
            delay,
            pulse_ms: config.pulse_ms,
        }
    }

    /// Run the pin side of a completion. Pulses for [`Completion::PulsePin`], ignores everything else.
    /// Returns whether it pulsed.
    pub async fn follow(&mut self, event: LinkEvent) -> bool {
        if !matches!(event, LinkEvent::Completed(_, Completion::PulsePin)) {
            return false;
        }
        if self.pin.set_high().is_err() {
            warn!("could not raise the notify pin");
            return false;
        }
        self.delay.delay_ms(self.pulse_ms).await;
        if self.pin.set_low().is_err() {
            warn!("could not lower the notify pin");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmLabel;
    use crate::testing::{NoDelay, RecordingPin, RecordingTransport};
    use embassy_futures::block_on;

    fn link() -> (PeerLink<RecordingTransport>, RecordingTransport) {
        let transport = RecordingTransport::default();
        (PeerLink::new(transport.clone()), transport)
    }

    fn pulse() -> (NotifyPulse<RecordingPin, NoDelay>, RecordingPin, NoDelay) {
        let pin = RecordingPin::default();
        let delay = NoDelay::default();
        let pulse = NotifyPulse::new(pin.clone(), delay.clone(), &TerminalConfig::default());
        (pulse, pin, delay)
    }

    #[test]
    fn second_send_while_in_flight_is_dropped() {
        let (mut link, transport) = link();
        assert_eq!(link.send(NotificationFrame::login_ok(), Completion::Nothing), Ok(()));
        assert!(link.is_busy());
        assert_eq!(
            link.send(NotificationFrame::lockout(), Completion::Nothing),
            Err(LinkError::Busy)
        );
        assert_eq!(transport.frames(), [NotificationFrame::login_ok()]);
        assert_eq!(link.in_flight(), Some(&NotificationFrame::login_ok()));
    }

    #[test]
    fn completion_frees_the_link() {
        let (mut link, transport) = link();
        link.send(NotificationFrame::login_ok(), Completion::Nothing).unwrap();
        assert_eq!(
            link.on_transfer_complete(),
            LinkEvent::Completed(Some(Command::LoginOk), Completion::Nothing)
        );
        assert!(!link.is_busy());
        link.send(NotificationFrame::lockout(), Completion::Nothing).unwrap();
        assert_eq!(transport.frames().len(), 2);
    }

    #[test]
    fn alarm_completion_pulses_the_pin() {
        let (mut link, _) = link();
        let (mut pulse, pin, delay) = pulse();
        let frame = NotificationFrame::alarm_fired(2, &AlarmLabel::from_bytes(b"tea"));
        link.send(frame, Completion::PulsePin).unwrap();
        let event = link.on_transfer_complete();
        assert!(pin.levels().is_empty());
        assert!(block_on(pulse.follow(event)));
        assert_eq!(pin.levels(), [true, false]);
        assert_eq!(delay.total_ms(), TerminalConfig::default().pulse_ms);
    }

    #[test]
    fn other_completions_leave_the_pin_alone() {
        let (mut pulse, pin, _) = pulse();
        for event in [
            LinkEvent::Idle,
            LinkEvent::Completed(Some(Command::LoginOk), Completion::Nothing),
            LinkEvent::Completed(Some(Command::Lockout), Completion::EnterTerminalState),
        ] {
            assert!(!block_on(pulse.follow(event)));
        }
        assert!(pin.levels().is_empty());
    }

    #[test]
    fn lockout_completion_halts_the_link() {
        let (mut link, _) = link();
        link.send(NotificationFrame::lockout(), Completion::EnterTerminalState)
            .unwrap();
        assert!(!link.is_halted());
        link.on_transfer_complete();
        assert!(link.is_halted());
        assert_eq!(
            link.send(NotificationFrame::login_ok(), Completion::Nothing),
            Err(LinkError::Halted)
        );
    }

    #[test]
    fn completion_without_transfer_is_idle() {
        let (mut link, _) = link();
        assert_eq!(link.on_transfer_complete(), LinkEvent::Idle);
    }

    #[test]
    fn refused_transfer_leaves_the_link_free() {
        let (mut link, transport) = link();
        transport.refuse(true);
        assert_eq!(
            link.send(NotificationFrame::login_ok(), Completion::Nothing),
            Err(LinkError::Transport(()))
        );
        assert!(!link.is_busy());
    }
}

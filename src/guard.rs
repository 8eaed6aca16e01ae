//! # Access Guard
//! Bounded login before the menu opens. The operator types a 4 digit ID (echoed) and a 4 digit password
//! (masked). The pair is valid when the ID is the password reversed.
//!
//! Every wrong pair clears the screen and costs one try. When the tries run out the guard sends `LOCKOUT`
//! to the peer and halts the terminal. A valid pair sends `LOGIN_OK` and opens the menu.
//!
//! Alarm checks are off while the guard prompts. Its frames wait for a frame still in flight rather than
//! being dropped.

use crate::clock_core::SharedCore;
use crate::config::TerminalConfig;
use crate::line::{Line, LineResult};
use crate::notification::NotificationFrame;
use crate::peer_link::Completion;
use embedded_io_async::{Read, Write};

/// Digits in the ID and in the password.
pub const CREDENTIAL_DIGITS: usize = 4;

const ID_PROMPT: &str = "Enter 4 Digits ID : ";
const PASSWORD_PROMPT: &str = "Enter Password : ";

/// One login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    /// ID digits as typed
    pub id: [u8; CREDENTIAL_DIGITS],
    /// Password digits as typed
    pub password: [u8; CREDENTIAL_DIGITS],
}

impl Credential {
    /// Valid iff the ID is the password read backwards.
    pub fn is_valid(&self) -> bool {
        self.id.iter().eq(self.password.iter().rev())
    }
}

/// Where the guard stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuardState {
    /// Waiting for a credential, with this many tries left
    Prompting {
        /// Tries left, never 0
        remaining: u8,
    },
    /// Access granted
    Granted,
    /// Tries exhausted
    Locked,
}

/// How the login ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuardOutcome {
    /// The operator may use the menu
    Granted,
    /// The terminal halted
    Locked,
}

/// The login state machine.
#[derive(Debug)]
pub struct AccessGuard {
    state: GuardState,
}

impl AccessGuard {
    /// Guard allowing `config.tries` attempts. With no tries at all it starts locked.
    pub const fn new(config: &TerminalConfig) -> Self {
        let state = match config.tries {
            0 => GuardState::Locked,
            remaining => GuardState::Prompting { remaining },
        };
        Self { state }
    }

    /// Current state.
    pub const fn state(&self) -> GuardState {
        self.state
    }

    /// Feed one credential. Granted and Locked are final, further credentials are ignored.
    pub fn submit(&mut self, credential: &Credential) -> GuardState {
        if let GuardState::Prompting { remaining } = self.state {
            self.state = if credential.is_valid() {
                info!("login granted");
                GuardState::Granted
            } else {
                match remaining - 1 {
                    0 => {
                        error!("login tries exhausted");
                        GuardState::Locked
                    }
                    remaining => {
                        warn!("login rejected, {} tries left", remaining);
                        GuardState::Prompting { remaining }
                    }
                }
            };
        }
        self.state
    }

    /// Prompt for credentials until access is granted or the tries run out, then tell the peer.
    /// Stops the alarm checks first, starting them again is up to the caller.
    ///
    /// A lockout halts the terminal right away. The `LOCKOUT` frame carries the same halt as its
    /// completion action, so the peer learns about it even if the frame was still queued.
    ///
    /// # Errors
    /// The operator line failed.
    pub async fn authenticate<IO, S>(
        &mut self,
        line: &mut Line<IO>,
        core: &S,
    ) -> LineResult<GuardOutcome, IO>
    where
        IO: Read + Write,
        S: SharedCore,
    {
        core.stop_alarm_checks().await;
        while let GuardState::Prompting { .. } = self.state {
            let credential = read_credential(line).await?;
            self.submit(&credential);
            if !matches!(self.state, GuardState::Granted) {
                line.clear().await?;
            }
        }

        if self.state == GuardState::Granted {
            if core
                .notify_when_idle(NotificationFrame::login_ok(), Completion::Nothing)
                .await
                .is_err()
            {
                warn!("LOGIN_OK not sent");
            }
            Ok(GuardOutcome::Granted)
        } else {
            if core
                .notify_when_idle(NotificationFrame::lockout(), Completion::EnterTerminalState)
                .await
                .is_err()
            {
                warn!("LOCKOUT not sent");
            }
            core.enter_terminal_state().await;
            Ok(GuardOutcome::Locked)
        }
    }
}

async fn read_credential<IO: Read + Write>(line: &mut Line<IO>) -> LineResult<Credential, IO> {
    line.write_str(ID_PROMPT).await?;
    let id = line.read_echoed().await?;
    line.newline().await?;
    line.write_str(PASSWORD_PROMPT).await?;
    let password = line.read_masked().await?;
    line.newline().await?;
    Ok(Credential { id, password })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock_core::ClockCore;
    use crate::line::{CLEAR_TERMINAL, LineError};
    use crate::notification::Notification;
    use crate::peer_link::PeerLink;
    use crate::testing::{FakeClock, RecordingTransport, ScriptedLine, noon};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::mutex::Mutex;

    const VALID: Credential = Credential {
        id: *b"4321",
        password: *b"1234",
    };
    const WRONG: Credential = Credential {
        id: *b"1234",
        password: *b"1234",
    };

    type TestCore = Mutex<NoopRawMutex, ClockCore<FakeClock, RecordingTransport>>;

    fn core(transport: &RecordingTransport) -> TestCore {
        Mutex::new(ClockCore::new(FakeClock::new(noon()), PeerLink::new(transport.clone())))
    }

    fn guard(tries: u8) -> AccessGuard {
        AccessGuard::new(&TerminalConfig::default().with_tries(tries))
    }

    #[test]
    fn id_must_be_the_reversed_password() {
        assert!(VALID.is_valid());
        assert!(!WRONG.is_valid());
        let palindrome = Credential {
            id: *b"1221",
            password: *b"1221",
        };
        assert!(palindrome.is_valid());
    }

    #[test]
    fn locks_after_exactly_tries_failures() {
        for tries in 1..=5 {
            let mut guard = guard(tries);
            for attempt in 1..tries {
                assert_eq!(
                    guard.submit(&WRONG),
                    GuardState::Prompting {
                        remaining: tries - attempt
                    }
                );
            }
            assert_eq!(guard.submit(&WRONG), GuardState::Locked);
        }
    }

    #[test]
    fn granted_iff_valid_within_tries() {
        let tries = 3;
        for valid_at in 0..5 {
            let mut guard = guard(tries);
            for attempt in 0..5 {
                let credential = if attempt == valid_at { VALID } else { WRONG };
                guard.submit(&credential);
            }
            let expected = if valid_at < tries {
                GuardState::Granted
            } else {
                GuardState::Locked
            };
            assert_eq!(guard.state(), expected, "valid pair at attempt {valid_at}");
        }
    }

    #[test]
    fn no_tries_starts_locked() {
        assert_eq!(guard(0).state(), GuardState::Locked);
    }

    #[test]
    fn login_sends_login_ok() {
        let transport = RecordingTransport::default();
        let core = core(&transport);
        let mut line = Line::new(ScriptedLine::new(b"12344321"));
        let outcome = block_on(guard(3).authenticate(&mut line, &core));
        assert_eq!(outcome, Ok(GuardOutcome::Granted));
        assert_eq!(transport.frames()[0].decode(), Ok(Notification::LoginOk));
        let output = line.into_inner().output();
        assert!(output.contains("Enter 4 Digits ID : 1234"));
        assert!(output.contains("Enter Password : ****"));
        assert!(!output.contains(CLEAR_TERMINAL));
    }

    #[test]
    fn wrong_pair_clears_and_prompts_again() {
        let transport = RecordingTransport::default();
        let core = core(&transport);
        let mut line = Line::new(ScriptedLine::new(b"1111222243211234"));
        let outcome = block_on(guard(3).authenticate(&mut line, &core));
        assert_eq!(outcome, Ok(GuardOutcome::Granted));
        let output = line.into_inner().output();
        assert_eq!(output.matches(CLEAR_TERMINAL).count(), 1);
        assert_eq!(output.matches(ID_PROMPT).count(), 2);
    }

    #[test]
    fn exhausted_tries_send_lockout_and_halt() {
        let transport = RecordingTransport::default();
        let core = core(&transport);
        let mut line = Line::new(ScriptedLine::new(b"1111222211112222"));
        let outcome = block_on(guard(2).authenticate(&mut line, &core));
        assert_eq!(outcome, Ok(GuardOutcome::Locked));
        assert_eq!(transport.frames()[0].decode(), Ok(Notification::Lockout));
        assert!(block_on(core.lock()).is_halted());
    }

    #[test]
    fn zero_tries_lock_without_prompting() {
        let transport = RecordingTransport::default();
        let core = core(&transport);
        let mut line = Line::new(ScriptedLine::new(b""));
        let outcome = block_on(guard(0).authenticate(&mut line, &core));
        assert_eq!(outcome, Ok(GuardOutcome::Locked));
        assert!(line.into_inner().output().is_empty());
    }

    #[test]
    fn closed_line_ends_the_login() {
        let transport = RecordingTransport::default();
        let core = core(&transport);
        let mut line = Line::new(ScriptedLine::new(b"12"));
        let outcome = block_on(guard(3).authenticate(&mut line, &core));
        assert_eq!(outcome, Err(LineError::Closed));
        assert!(transport.frames().is_empty());
    }

    #[test]
    fn prompting_stops_alarm_checks() {
        let transport = RecordingTransport::default();
        let core = core(&transport);
        block_on(core.lock()).start_alarm_checks();
        let mut line = Line::new(ScriptedLine::new(b"4321"));
        let outcome = block_on(guard(3).authenticate(&mut line, &core));
        assert_eq!(outcome, Err(LineError::Closed));
        assert!(!block_on(core.lock()).alarm_checks_enabled());
    }
}

//! # Menu Shell
//! The operator session. After the guard grants access the operator picks one of three options, and
//! after every option decides whether to go on:
//!
//! 1. display the date and time, on the line and on the peer board
//! 2. arm an alarm slot
//! 3. set the date and time
//!
//! Mistyped options and invalid entries are reported on the line and asked again. Only a failing line, or a
//! clock that cannot be read, ends the session with an error.

use crate::alarm::AlarmEngine;
use crate::calendar::{CALENDAR_FORMAT_HELP, CalendarCodec};
use crate::clock::ClockUnavailable;
use crate::clock_core::SharedCore;
use crate::config::TerminalConfig;
use crate::guard::{AccessGuard, GuardOutcome};
use crate::line::{Line, LineError};
use crate::notification::{LABEL_CAPACITY, NotificationFrame};
use crate::peer_link::Completion;
use crate::utility::string_utils::StringUtils;
use core::fmt;
use embedded_io_async::{Read, Write};
use heapless::Vec;

const WELCOME: &str = "Welcome To My Clock System";
const FAREWELL: &str = "Bye Bye :)";
const SHUT_DOWN: &str = "System Shut Down";

const MENU: &str = "1- Display Date & Time\r\n2- Set Alarm\r\n3- Set Date & Time\r\n";
const OPTION_PROMPT: &str = "[+] select option (1-3) : ";
const WRONG_OPTION: &str = "  Wrong Option , Enter Option (1-3) ";
const CONTINUE_PROMPT: &str = "[+] Do you want to continue? [y/n] ";

const SLOT_PROMPT: &str = "Please Choose Alarm Number From ( 1 ~ 5 )\r\nYour Choice: ";
const LABEL_PROMPT: &str = "Please Enter Alarm Name: ";
const WRONG_SLOT: &str = " Wrong Choice ";
const ALARM_PROMPT: &str = "Please Enter Your Alarm in this sequence xx:xx:xx\r\n";

const CALENDAR_WELCOME: &str = "\r\nWELCOME To Set Date and Time Mode\r\n";
const CALENDAR_SET: &str = "Date & Time Set Successfully";
const CALENDAR_INVALID: &str = "Invalid Date & Time, Try Again";
const CALENDAR_REFUSED: &str = "The Clock Refused This Date & Time, Try Again";
/// Longest date and time entry kept, anything beyond ends the entry.
const CALENDAR_ENTRY_LEN: usize = 32;

/// The options of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuOption {
    /// `1`
    DisplayDateTime,
    /// `2`
    SetAlarm,
    /// `3`
    SetDateTime,
}

impl MenuOption {
    /// Option for the key the operator pressed.
    ///
    /// # Errors
    /// [`MenuError::WrongMenuOption`] for anything but `1`, `2` or `3`.
    pub const fn from_key(key: u8) -> Result<Self, MenuError> {
        match key {
            b'1' => Ok(Self::DisplayDateTime),
            b'2' => Ok(Self::SetAlarm),
            b'3' => Ok(Self::SetDateTime),
            _ => Err(MenuError::WrongMenuOption(key)),
        }
    }
}

/// The operator pressed a key that is not a menu option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuError {
    /// The key that was pressed
    WrongMenuOption(u8),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongMenuOption(key) => write!(f, "key {key:#04x} is not a menu option"),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEnd {
    /// The login tries ran out, the terminal halted
    Locked,
    /// The operator chose not to continue. Alarms keep firing.
    ShutDown,
}

/// The session could not go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TerminalError<E> {
    /// The operator line failed
    Line(LineError<E>),
    /// The clock source failed
    Clock(ClockUnavailable),
}

impl<E> From<LineError<E>> for TerminalError<E> {
    fn from(e: LineError<E>) -> Self {
        Self::Line(e)
    }
}

impl<E> From<ClockUnavailable> for TerminalError<E> {
    fn from(e: ClockUnavailable) -> Self {
        Self::Clock(e)
    }
}

impl<E: fmt::Debug> fmt::Display for TerminalError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(e) => write!(f, "{e}"),
            Self::Clock(e) => write!(f, "{e}"),
        }
    }
}

type TerminalResult<T, IO> = Result<T, TerminalError<<IO as embedded_io_async::ErrorType>::Error>>;

/// One operator session over a line, working on the shared clock core.
pub struct Terminal<'a, IO, S> {
    line: Line<IO>,
    core: &'a S,
    guard: AccessGuard,
    calendar: CalendarCodec,
}

impl<'a, IO, S> Terminal<'a, IO, S>
where
    IO: Read + Write,
    S: SharedCore,
{
    /// Session on `io` that logs in with `config.tries` attempts.
    pub const fn new(io: IO, core: &'a S, config: &TerminalConfig) -> Self {
        Self {
            line: Line::new(io),
            core,
            guard: AccessGuard::new(config),
            calendar: CalendarCodec::new(),
        }
    }

    /// Give the line back.
    pub fn into_inner(self) -> IO {
        self.line.into_inner()
    }

    /// Log in, then serve menu options until the operator quits.
    ///
    /// # Errors
    /// [`TerminalError`] if the line or the clock failed.
    pub async fn run(&mut self) -> TerminalResult<SessionEnd, IO> {
        let outcome = self.guard.authenticate(&mut self.line, self.core).await?;
        if outcome == GuardOutcome::Locked {
            self.line.clear().await?;
            self.banner(SHUT_DOWN).await?;
            self.line.flush().await?;
            return Ok(SessionEnd::Locked);
        }
        self.core.start_alarm_checks().await;

        loop {
            let option = self.choose_option().await?;
            info!("menu option {:?}", option);
            match option {
                MenuOption::DisplayDateTime => self.display_date_time().await?,
                MenuOption::SetAlarm => self.set_alarm().await?,
                MenuOption::SetDateTime => self.set_date_time().await?,
            }
            if !self.wants_to_continue().await? {
                self.line.clear().await?;
                self.banner(FAREWELL).await?;
                self.line.flush().await?;
                info!("operator session ended");
                return Ok(SessionEnd::ShutDown);
            }
        }
    }

    async fn banner(&mut self, text: &str) -> TerminalResult<(), IO> {
        self.line.write_str(&StringUtils::banner(text)).await?;
        self.line.newline().await?;
        Ok(())
    }

    async fn choose_option(&mut self) -> TerminalResult<MenuOption, IO> {
        self.line.clear().await?;
        self.banner(WELCOME).await?;
        loop {
            self.line.write_str(MENU).await?;
            self.line.write_str(OPTION_PROMPT).await?;
            self.line.flush().await?;
            let key = self.line.read_key().await?;
            self.line.newline().await?;
            match MenuOption::from_key(key) {
                Ok(option) => return Ok(option),
                Err(e) => {
                    warn!("{:?}", e);
                    self.line.write_str(WRONG_OPTION).await?;
                    self.line.newline().await?;
                }
            }
        }
    }

    async fn display_date_time(&mut self) -> TerminalResult<(), IO> {
        let now = self.core.read_clock().await?;
        self.line.newline().await?;
        self.line
            .write_str(&StringUtils::date_time_line(&now))
            .await?;
        self.line.newline().await?;
        if self
            .core
            .notify(NotificationFrame::display(&now), Completion::Nothing)
            .await
            .is_err()
        {
            warn!("DISPLAY not sent");
        }
        Ok(())
    }

    async fn set_alarm(&mut self) -> TerminalResult<(), IO> {
        let (slot, label) = loop {
            self.line.newline().await?;
            self.line.write_str(SLOT_PROMPT).await?;
            self.line.flush().await?;
            let key = self.line.read_key().await?;
            self.line.newline().await?;
            self.line.write_str(LABEL_PROMPT).await?;
            self.line.flush().await?;
            let label: Vec<u8, LABEL_CAPACITY> = self.line.read_entry().await?;
            self.line.newline().await?;

            let slot = key.wrapping_sub(b'0');
            match AlarmEngine::slot_index(slot) {
                Ok(_) => break (slot, label),
                Err(e) => {
                    warn!("{:?}", e);
                    self.line.write_str(WRONG_SLOT).await?;
                    self.line.newline().await?;
                }
            }
        };

        self.line.write_str(ALARM_PROMPT).await?;
        self.line.flush().await?;
        let text = self.line.read_echoed().await?;
        self.line.newline().await?;
        match self.core.set_alarm(slot, &text, &label).await {
            Ok(time) => {
                self.line
                    .write_str(&StringUtils::alarm_set_line(slot, &time))
                    .await?;
            }
            Err(e) => {
                warn!("{:?}", e);
                self.line.write_str(WRONG_SLOT).await?;
            }
        }
        self.line.newline().await?;
        Ok(())
    }

    async fn set_date_time(&mut self) -> TerminalResult<(), IO> {
        if self.calendar.take_welcome() {
            self.line.write_str(CALENDAR_WELCOME).await?;
        }
        loop {
            self.line.write_str(CALENDAR_FORMAT_HELP).await?;
            self.line.flush().await?;
            let text: Vec<u8, CALENDAR_ENTRY_LEN> = self.line.read_entry().await?;
            self.line.newline().await?;
            match CalendarCodec::parse(&text) {
                Ok(dt) => {
                    // the RTC may still refuse what the codec accepts, month 0 for example
                    if self.core.set_clock(&dt).await.is_ok() {
                        self.line.write_str(CALENDAR_SET).await?;
                        self.line.newline().await?;
                        return Ok(());
                    }
                    self.line.write_str(CALENDAR_REFUSED).await?;
                    self.line.newline().await?;
                }
                Err(e) => {
                    warn!("invalid calendar entry {:?}", e);
                    self.line.write_str(CALENDAR_INVALID).await?;
                    self.line.newline().await?;
                }
            }
        }
    }

    async fn wants_to_continue(&mut self) -> TerminalResult<bool, IO> {
        self.line.newline().await?;
        self.line.write_str(CONTINUE_PROMPT).await?;
        self.line.flush().await?;
        let key = self.line.read_key().await?;
        self.line.newline().await?;
        Ok(matches!(key, b'y' | b'Y'))
    }
}

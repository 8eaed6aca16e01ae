//! # Notification frames
//! Fixed size messages sent to the peer board. Byte 0 is the command code, the remaining 29 bytes are the
//! command specific payload, zero filled where unused.
//!
//! | command       | payload                                                              |
//! |---------------|----------------------------------------------------------------------|
//! | `DISPLAY`     | seconds, minutes, hours, weekday, month, year, date                  |
//! | `ALARM_FIRED` | 1-based slot index, then the alarm label                             |
//! | `LOCKOUT`     | unused                                                               |
//! | `LOGIN_OK`    | unused                                                               |

use crate::alarm::AlarmLabel;
use crate::datetime::{DateTime, Weekday};
use core::fmt;

/// Size of every frame on the wire.
pub const FRAME_LEN: usize = 30;

/// Bytes available behind the slot index of an alarm frame.
pub const LABEL_CAPACITY: usize = FRAME_LEN - 2;

/// The closed set of command codes understood by the peer board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Show the attached date and time
    Display = 0x01,
    /// An alarm slot matched the clock
    AlarmFired = 0x02,
    /// Login attempts are exhausted, red signal
    Lockout = 0x03,
    /// Login succeeded, green signal
    LoginOk = 0x04,
}

impl Command {
    /// Command for a received code byte.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Display),
            0x02 => Some(Self::AlarmFired),
            0x03 => Some(Self::Lockout),
            0x04 => Some(Self::LoginOk),
            _ => None,
        }
    }

    /// Code byte sent on the wire.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// A received frame could not be understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Byte 0 is not a known command code, the value is the code
    UnknownCommand(u8),
    /// A display frame carries a weekday byte outside 1-7
    BadWeekday(u8),
    /// An alarm frame carries slot index 0
    BadSlot,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand(code) => write!(f, "unknown command code {code:#04x}"),
            Self::BadWeekday(day) => write!(f, "weekday byte {day} out of range"),
            Self::BadSlot => f.write_str("alarm slot index 0"),
        }
    }
}

/// The raw 30 byte frame.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotificationFrame {
    /// Command code followed by the payload
    bytes: [u8; FRAME_LEN],
}

impl NotificationFrame {
    /// Empty frame carrying only a command code.
    const fn with_command(command: Command) -> Self {
        let mut bytes = [0; FRAME_LEN];
        bytes[0] = command.code();
        Self { bytes }
    }

    /// Frame asking the peer to show `dt`.
    pub const fn display(dt: &DateTime) -> Self {
        let mut frame = Self::with_command(Command::Display);
        frame.bytes[1] = dt.second;
        frame.bytes[2] = dt.minute;
        frame.bytes[3] = dt.hour;
        frame.bytes[4] = dt.weekday.to_wire();
        frame.bytes[5] = dt.month;
        frame.bytes[6] = dt.year;
        frame.bytes[7] = dt.date;
        frame
    }

    /// Frame reporting that the 1-based `slot` fired, carrying the shared alarm label.
    pub fn alarm_fired(slot: u8, label: &AlarmLabel) -> Self {
        let mut frame = Self::with_command(Command::AlarmFired);
        frame.bytes[1] = slot;
        let label = label.as_bytes();
        frame.bytes[2..2 + label.len()].copy_from_slice(label);
        frame
    }

    /// Frame telling the peer the terminal locked out.
    pub const fn lockout() -> Self {
        Self::with_command(Command::Lockout)
    }

    /// Frame telling the peer the operator logged in.
    pub const fn login_ok() -> Self {
        Self::with_command(Command::LoginOk)
    }

    /// The bytes to put on the wire.
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// The command code byte.
    pub const fn code(&self) -> u8 {
        self.bytes[0]
    }

    /// Wrap bytes received from the wire.
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Interpret the frame, as the peer board does.
    ///
    /// # Errors
    /// [`FrameError`] if the command code or a payload field is not valid.
    pub fn decode(&self) -> Result<Notification<'_>, FrameError> {
        let b = &self.bytes;
        match Command::from_code(b[0]).ok_or(FrameError::UnknownCommand(b[0]))? {
            Command::Display => Ok(Notification::Display(DateTime {
                second: b[1],
                minute: b[2],
                hour: b[3],
                weekday: Weekday::from_wire(b[4]).ok_or(FrameError::BadWeekday(b[4]))?,
                month: b[5],
                year: b[6],
                date: b[7],
            })),
            Command::AlarmFired => {
                if b[1] == 0 {
                    return Err(FrameError::BadSlot);
                }
                let label = &b[2..];
                let end = label.iter().position(|&c| c == 0).unwrap_or(label.len());
                Ok(Notification::AlarmFired {
                    slot: b[1],
                    label: &label[..end],
                })
            }
            Command::Lockout => Ok(Notification::Lockout),
            Command::LoginOk => Ok(Notification::LoginOk),
        }
    }
}

impl fmt::Debug for NotificationFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationFrame")
            .field("command", &Command::from_code(self.code()))
            .field("payload", &&self.bytes[1..])
            .finish()
    }
}

/// A decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification<'a> {
    /// Show this date and time
    Display(DateTime),
    /// The 1-based slot fired, with the label that was current when it fired
    AlarmFired {
        /// 1-based slot index
        slot: u8,
        /// Label bytes, without the zero fill
        label: &'a [u8],
    },
    /// The terminal locked out
    Lockout,
    /// The operator logged in
    LoginOk,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_payload_byte_order() {
        let dt = DateTime {
            year: 23,
            month: 8,
            date: 30,
            hour: 12,
            minute: 30,
            second: 45,
            weekday: Weekday::Saturday,
        };
        let frame = NotificationFrame::display(&dt);
        assert_eq!(&frame.as_bytes()[..8], &[0x01, 45, 30, 12, 1, 8, 23, 30]);
        assert!(frame.as_bytes()[8..].iter().all(|&b| b == 0));
        assert_eq!(frame.decode(), Ok(Notification::Display(dt)));
    }

    #[test]
    fn alarm_frame_carries_slot_and_label() {
        let label = AlarmLabel::from_bytes(b"wake up");
        let frame = NotificationFrame::alarm_fired(3, &label);
        assert_eq!(frame.code(), Command::AlarmFired.code());
        assert_eq!(frame.as_bytes()[1], 3);
        assert_eq!(&frame.as_bytes()[2..9], b"wake up");
        assert_eq!(
            frame.decode(),
            Ok(Notification::AlarmFired {
                slot: 3,
                label: b"wake up"
            })
        );
    }

    #[test]
    fn signal_frames_have_no_payload() {
        for (frame, expected) in [
            (NotificationFrame::lockout(), Notification::Lockout),
            (NotificationFrame::login_ok(), Notification::LoginOk),
        ] {
            assert!(frame.as_bytes()[1..].iter().all(|&b| b == 0));
            assert_eq!(frame.decode(), Ok(expected));
        }
    }

    #[test]
    fn rejects_unknown_codes_and_bad_fields() {
        let mut bytes = [0; FRAME_LEN];
        bytes[0] = 0x7f;
        assert_eq!(
            NotificationFrame::from_bytes(bytes).decode(),
            Err(FrameError::UnknownCommand(0x7f))
        );

        bytes[0] = Command::Display.code();
        bytes[4] = 9;
        assert_eq!(
            NotificationFrame::from_bytes(bytes).decode(),
            Err(FrameError::BadWeekday(9))
        );

        let mut bytes = [0; FRAME_LEN];
        bytes[0] = Command::AlarmFired.code();
        assert_eq!(NotificationFrame::from_bytes(bytes).decode(), Err(FrameError::BadSlot));
    }
}

//! # Alarm Engine
//! Five alarm slots and the comparison against the sampled clock.
//!
//! A slot is either empty or holds a complete `{hour, minute, second}` triple. Setting a slot replaces the
//! whole triple in one assignment, so the comparison never sees half of an update.
//!
//! There is only one alarm label. Every `set_alarm` overwrites it, so a fired notification always carries
//! the name of the most recently configured alarm, whichever slot fired. A label per slot would be the
//! obvious fix, but the peer board expects the current behaviour.

use crate::datetime::DateTime;
use crate::notification::{LABEL_CAPACITY, NotificationFrame};
use core::fmt;
use heapless::Vec;

/// Number of alarm slots.
pub const SLOT_COUNT: usize = 5;

/// Length of the operator alarm text, `HH:MM:SS`.
pub const ALARM_TEXT_LEN: usize = 8;

/// The slot number the operator typed is not 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// Slot number outside 1-5, the value is what was given
    OutOfRangeAlarmSlot(u8),
}

impl fmt::Display for AlarmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRangeAlarmSlot(slot) => write!(f, "alarm slot {slot} is not 1-5"),
        }
    }
}

/// Time of day an alarm is set for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    /// Hour
    pub hour: u8,
    /// Minute
    pub minute: u8,
    /// Second
    pub second: u8,
}

impl AlarmTime {
    /// Decode `HH:MM:SS` from positions 0-1, 3-4 and 6-7.
    ///
    /// Nothing is validated here, the operator is trusted. Digits are decoded with wrapping byte
    /// arithmetic, so garbage input gives a time that simply never matches the clock.
    pub const fn from_text(text: &[u8; ALARM_TEXT_LEN]) -> Self {
        Self {
            hour: decode_pair(text[0], text[1]),
            minute: decode_pair(text[3], text[4]),
            second: decode_pair(text[6], text[7]),
        }
    }

    /// The fields in comparison order.
    const fn fields(self) -> [u8; 3] {
        [self.hour, self.minute, self.second]
    }
}

/// `(tens - '0') * 10 + (ones - '0')` on wrapping bytes.
const fn decode_pair(tens: u8, ones: u8) -> u8 {
    tens.wrapping_sub(b'0')
        .wrapping_mul(10)
        .wrapping_add(ones.wrapping_sub(b'0'))
}

/// One of the five alarm storage positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmSlot {
    /// Never set since power up
    #[default]
    Empty,
    /// Fires when the clock shows exactly this time
    Armed(AlarmTime),
}

/// A slot whose time equals the clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FiredAlarm {
    /// 1-based slot index
    pub slot: u8,
}

/// All slots that matched in one comparison pass.
pub type FiredAlarms = Vec<FiredAlarm, SLOT_COUNT>;

/// The shared alarm name, as many bytes as fit behind the slot index of a frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmLabel {
    /// Label bytes
    bytes: Vec<u8, LABEL_CAPACITY>,
}

impl AlarmLabel {
    /// Label from raw bytes, cut at the frame capacity.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let len = bytes.len().min(LABEL_CAPACITY);
        let mut label = Vec::new();
        // cannot fail, len is capped at the capacity
        let _ = label.extend_from_slice(&bytes[..len]);
        Self { bytes: label }
    }

    /// The label bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether no name was given.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Owns the alarm table and the shared label.
#[derive(Debug, Default)]
pub struct AlarmEngine {
    /// The five slots, index 0 is slot 1
    slots: [AlarmSlot; SLOT_COUNT],
    /// Name of the most recently set alarm
    label: AlarmLabel,
}

impl AlarmEngine {
    /// All slots empty, no label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `slot` is 1-5 and return its table index.
    ///
    /// # Errors
    /// [`AlarmError::OutOfRangeAlarmSlot`] for anything else.
    pub const fn slot_index(slot: u8) -> Result<usize, AlarmError> {
        match slot {
            1..=5 => Ok(slot as usize - 1),
            _ => Err(AlarmError::OutOfRangeAlarmSlot(slot)),
        }
    }

    /// Arm `slot` (1-5) with the `HH:MM:SS` text and replace the shared label.
    ///
    /// # Errors
    /// [`AlarmError::OutOfRangeAlarmSlot`] if `slot` is not 1-5. Nothing changes in that case.
    pub fn set_alarm(
        &mut self,
        slot: u8,
        hhmmss: &[u8; ALARM_TEXT_LEN],
        label: &[u8],
    ) -> Result<AlarmTime, AlarmError> {
        let index = Self::slot_index(slot)?;
        let time = AlarmTime::from_text(hhmmss);
        self.slots[index] = AlarmSlot::Armed(time);
        self.label = AlarmLabel::from_bytes(label);
        info!(
            "alarm {} set to {}:{}:{}",
            slot, time.hour, time.minute, time.second
        );
        Ok(time)
    }

    /// Compare every armed slot against `now`. Only an exact match of hour, minute and second fires.
    /// Several slots may fire in the same pass, each is reported.
    pub fn compare(&self, now: &DateTime) -> FiredAlarms {
        let (hour, minute, second) = now.hms();
        let current = [hour, minute, second];
        let mut fired = FiredAlarms::new();

        for (index, slot) in self.slots.iter().enumerate() {
            let AlarmSlot::Armed(time) = slot else {
                continue;
            };
            // every slot starts unmatched, a break on the previous slot must not leak into this one
            let mut matched = false;
            for (set, current) in time.fields().iter().zip(current.iter()) {
                if set != current {
                    matched = false;
                    break;
                }
                matched = true;
            }
            if matched {
                #[allow(clippy::cast_possible_truncation)]
                let slot = index as u8 + 1;
                // cannot overflow, there are exactly SLOT_COUNT slots
                let _ = fired.push(FiredAlarm { slot });
            }
        }
        fired
    }

    /// Notification frame for a fired alarm, with the current shared label.
    pub fn fired_frame(&self, fired: FiredAlarm) -> NotificationFrame {
        NotificationFrame::alarm_fired(fired.slot, &self.label)
    }

    /// Contents of the 1-based `slot`.
    ///
    /// # Errors
    /// [`AlarmError::OutOfRangeAlarmSlot`] if `slot` is not 1-5.
    pub const fn slot(&self, slot: u8) -> Result<AlarmSlot, AlarmError> {
        match Self::slot_index(slot) {
            Ok(index) => Ok(self.slots[index]),
            Err(e) => Err(e),
        }
    }

    /// The shared label.
    pub const fn label(&self) -> &AlarmLabel {
        &self.label
    }
}

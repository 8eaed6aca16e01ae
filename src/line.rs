//! # Operator line
//! Byte oriented helpers over the character channel the operator types on. Every byte the operator
//! types is echoed back, except password digits which come back as `*`.

use core::fmt;
use embedded_io_async::{Read, Write};
use heapless::Vec;

/// Escape sequence that clears the operator's screen and homes the cursor.
pub const CLEAR_TERMINAL: &str = "\x1b[2J\x1b[H";

/// Shown instead of a secret digit.
pub const MASK: u8 = b'*';

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// The character channel failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError<E> {
    /// The channel reported end of input
    Closed,
    /// The channel reported an I/O error
    Io(E),
}

impl<E: fmt::Debug> fmt::Display for LineError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("operator line closed"),
            Self::Io(e) => write!(f, "operator line error: {e:?}"),
        }
    }
}

/// Result of a line operation.
pub type LineResult<T, IO> = Result<T, LineError<<IO as embedded_io_async::ErrorType>::Error>>;

/// The operator's character channel.
pub struct Line<IO> {
    io: IO,
}

impl<IO: Read + Write> Line<IO> {
    /// Wrap a channel.
    pub const fn new(io: IO) -> Self {
        Self { io }
    }

    /// Give the channel back.
    pub fn into_inner(self) -> IO {
        self.io
    }

    /// Wait for one byte.
    pub async fn read_byte(&mut self) -> LineResult<u8, IO> {
        let mut byte = [0];
        match self.io.read(&mut byte).await {
            Ok(0) => Err(LineError::Closed),
            Ok(_) => Ok(byte[0]),
            Err(e) => Err(LineError::Io(e)),
        }
    }

    /// Wait for a key press, skipping line endings left over from a previous entry. The key is echoed.
    pub async fn read_key(&mut self) -> LineResult<u8, IO> {
        loop {
            let byte = self.read_byte().await?;
            if byte != CR && byte != LF {
                self.write_bytes(&[byte]).await?;
                return Ok(byte);
            }
        }
    }

    /// Read exactly `N` bytes, echoing each one.
    pub async fn read_echoed<const N: usize>(&mut self) -> LineResult<[u8; N], IO> {
        self.read_fixed(false).await
    }

    /// Read exactly `N` bytes, echoing a [`MASK`] for each one.
    pub async fn read_masked<const N: usize>(&mut self) -> LineResult<[u8; N], IO> {
        self.read_fixed(true).await
    }

    async fn read_fixed<const N: usize>(&mut self, masked: bool) -> LineResult<[u8; N], IO> {
        let mut bytes = [0; N];
        for byte in &mut bytes {
            *byte = self.read_byte().await?;
            let echo = if masked { MASK } else { *byte };
            self.write_bytes(&[echo]).await?;
        }
        Ok(bytes)
    }

    /// Read an echoed entry terminated by carriage return or newline, which is not stored.
    /// The entry also ends once `N` bytes were read.
    pub async fn read_entry<const N: usize>(&mut self) -> LineResult<Vec<u8, N>, IO> {
        let mut entry = Vec::new();
        while !entry.is_full() {
            let byte = self.read_byte().await?;
            if byte == CR || byte == LF {
                break;
            }
            self.write_bytes(&[byte]).await?;
            // capacity is checked by the loop condition
            let _ = entry.push(byte);
        }
        Ok(entry)
    }

    /// Write raw bytes.
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> LineResult<(), IO> {
        self.io.write_all(bytes).await.map_err(LineError::Io)
    }

    /// Write text.
    pub async fn write_str(&mut self, text: &str) -> LineResult<(), IO> {
        self.write_bytes(text.as_bytes()).await
    }

    /// Move to the start of the next line.
    pub async fn newline(&mut self) -> LineResult<(), IO> {
        self.write_str("\r\n").await
    }

    /// Clear the operator's screen.
    pub async fn clear(&mut self) -> LineResult<(), IO> {
        self.write_str(CLEAR_TERMINAL).await
    }

    /// Push buffered output to the operator.
    pub async fn flush(&mut self) -> LineResult<(), IO> {
        self.io.flush().await.map_err(LineError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLine;
    use embassy_futures::block_on;

    #[test]
    fn password_digits_are_masked() {
        let mut line = Line::new(ScriptedLine::new(b"1234"));
        let digits: [u8; 4] = block_on(line.read_masked()).unwrap();
        assert_eq!(&digits, b"1234");
        assert_eq!(line.into_inner().output(), "****");
    }

    #[test]
    fn entry_stops_at_carriage_return() {
        let mut line = Line::new(ScriptedLine::new(b"wake up\rnext"));
        let entry: Vec<u8, 28> = block_on(line.read_entry()).unwrap();
        assert_eq!(&entry[..], b"wake up");
        let key = block_on(line.read_key()).unwrap();
        assert_eq!(key, b'n');
        assert_eq!(line.into_inner().output(), "wake upn");
    }

    #[test]
    fn entry_stops_when_full() {
        let mut line = Line::new(ScriptedLine::new(b"abcdef"));
        let entry: Vec<u8, 4> = block_on(line.read_entry()).unwrap();
        assert_eq!(&entry[..], b"abcd");
        assert_eq!(block_on(line.read_byte()), Ok(b'e'));
    }

    #[test]
    fn key_skips_line_endings() {
        let mut line = Line::new(ScriptedLine::new(b"\r\n2"));
        assert_eq!(block_on(line.read_key()), Ok(b'2'));
    }

    #[test]
    fn end_of_input_closes_the_line() {
        let mut line = Line::new(ScriptedLine::new(b"12"));
        let result: Result<[u8; 4], _> = block_on(line.read_echoed());
        assert_eq!(result, Err(LineError::Closed));
    }
}

//! Byte-at-a-time state frame reader.

use crate::frame::{parse_state, FrameError, RemoteState, STATE_FRAME_LEN, STX};

/// Reassembles state frames from a byte stream.
///
/// Bytes before an STX are skipped. Once a full frame has been collected it
/// is validated and the reader starts over, so a corrupted frame costs at
/// most one poll cycle.
#[derive(Debug, Clone)]
pub struct StateReader {
    buf: [u8; STATE_FRAME_LEN],
    len: usize,
}

impl StateReader {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; STATE_FRAME_LEN],
            len: 0,
        }
    }

    /// Feed one byte.
    ///
    /// Returns `Some` once a complete frame has been collected.
    pub fn push(&mut self, byte: u8) -> Option<Result<RemoteState, FrameError>> {
        if self.len == 0 && byte != STX {
            return None;
        }
        self.buf[self.len] = byte;
        self.len += 1;
        if self.len < STATE_FRAME_LEN {
            return None;
        }
        self.len = 0;
        Some(parse_state(&self.buf))
    }

    /// Feed a slice and return the last complete frame in it, if any.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Option<Result<RemoteState, FrameError>> {
        bytes.iter().fold(None, |last, &b| self.push(b).or(last))
    }

    /// Drop any partially collected frame.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Whether a frame is partially collected.
    #[must_use]
    pub fn in_frame(&self) -> bool {
        self.len > 0
    }
}

impl Default for StateReader {
    fn default() -> Self {
        Self::new()
    }
}

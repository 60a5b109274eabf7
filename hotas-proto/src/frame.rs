//! Request and state frame encoding and validation.

/// Start of transmission.
pub const STX: u8 = 0x02;
/// End of transmission.
pub const ETX: u8 = 0x03;
/// Data request command.
pub const REQ: u8 = 0x05;

/// Length of a request frame.
pub const REQUEST_FRAME_LEN: usize = 3;
/// Length of a state frame.
pub const STATE_FRAME_LEN: usize = 15;

/// Buttons carried by a state frame.
pub const REMOTE_BUTTONS: usize = 16;
/// Axes carried by a state frame.
pub const REMOTE_AXES: usize = 4;
/// Hat switches carried by a state frame.
pub const REMOTE_HATS: usize = 2;

const CHECKSUM_INDEX: usize = 13;

/// Frame validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Wrong number of bytes.
    Length,
    /// Missing STX or ETX.
    Framing,
    /// Checksum byte does not match the payload.
    Checksum,
    /// Command byte is not [`REQ`].
    UnknownCommand(u8),
}

/// Raw input state of the remote board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteState {
    /// Raw button levels, button 0 in bit 0.
    pub buttons: u16,
    /// Raw axis values.
    pub axes: [u16; REMOTE_AXES],
    /// Two `0000RLDU` hat nibbles, hat 0 in the low nibble.
    pub hats: u8,
}

impl RemoteState {
    /// Raw level of one button. Indices past 15 read low.
    #[must_use]
    pub const fn button(&self, index: usize) -> bool {
        index < REMOTE_BUTTONS && (self.buttons >> index) & 1 != 0
    }

    /// Packed `0000RLDU` nibble of one hat switch. Indices past 1 read 0.
    #[must_use]
    pub const fn hat(&self, index: usize) -> u8 {
        if index < REMOTE_HATS {
            (self.hats >> (4 * index)) & 0x0F
        } else {
            0
        }
    }

    /// Write a complete state frame into `buf`.
    pub fn encode(&self, buf: &mut [u8; STATE_FRAME_LEN]) {
        buf[0] = STX;
        buf[1] = REQ;
        buf[2..4].copy_from_slice(&self.buttons.to_le_bytes());
        for (chunk, axis) in buf[4..12].chunks_exact_mut(2).zip(self.axes) {
            chunk.copy_from_slice(&axis.to_le_bytes());
        }
        buf[12] = self.hats;
        buf[CHECKSUM_INDEX] = checksum(&buf[1..CHECKSUM_INDEX]);
        buf[14] = ETX;
    }
}

/// XOR of every byte in `bytes`.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// The request frame.
#[must_use]
pub const fn encode_request() -> [u8; REQUEST_FRAME_LEN] {
    [STX, REQ, ETX]
}

/// Validate a request frame.
///
/// # Errors
///
/// Returns a [`FrameError`] describing the first problem found.
pub fn parse_request(frame: &[u8]) -> Result<(), FrameError> {
    let [start, command, end] = frame else {
        return Err(FrameError::Length);
    };
    if *start != STX || *end != ETX {
        return Err(FrameError::Framing);
    }
    if *command != REQ {
        return Err(FrameError::UnknownCommand(*command));
    }
    Ok(())
}

/// Validate a state frame and extract the remote state.
///
/// Framing is checked first, then the checksum, then the command.
///
/// # Errors
///
/// Returns a [`FrameError`] describing the first problem found.
pub fn parse_state(frame: &[u8]) -> Result<RemoteState, FrameError> {
    if frame.len() != STATE_FRAME_LEN {
        return Err(FrameError::Length);
    }
    if frame[0] != STX || frame[STATE_FRAME_LEN - 1] != ETX {
        return Err(FrameError::Framing);
    }
    if frame[CHECKSUM_INDEX] != checksum(&frame[1..CHECKSUM_INDEX]) {
        return Err(FrameError::Checksum);
    }
    if frame[1] != REQ {
        return Err(FrameError::UnknownCommand(frame[1]));
    }

    let word = |i: usize| u16::from_le_bytes([frame[i], frame[i + 1]]);
    Ok(RemoteState {
        buttons: word(2),
        axes: [word(4), word(6), word(8), word(10)],
        hats: frame[12],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: [u8; STATE_FRAME_LEN] = [
        0x02, 0x05, 0x01, 0x80, 0xFA, 0x00, 0x00, 0x80, 0x05, 0xFF, 0x00, 0x00, 0x2E, 0x00, 0x03,
    ];

    fn frame() -> [u8; STATE_FRAME_LEN] {
        let mut frame = FRAME;
        frame[CHECKSUM_INDEX] = checksum(&frame[1..CHECKSUM_INDEX]);
        frame
    }

    #[test]
    fn test_request_frame() {
        assert_eq!(encode_request(), [0x02, 0x05, 0x03]);
        assert_eq!(parse_request(&encode_request()), Ok(()));
        assert_eq!(parse_request(&[0x02, 0x05]), Err(FrameError::Length));
        assert_eq!(parse_request(&[0x02, 0x05, 0x04]), Err(FrameError::Framing));
        assert_eq!(
            parse_request(&[0x02, 0x06, 0x03]),
            Err(FrameError::UnknownCommand(0x06))
        );
    }

    #[test]
    fn test_parse_state() {
        let state = parse_state(&frame()).unwrap();
        assert_eq!(state.buttons, 0x8001);
        assert_eq!(state.axes, [250, 32768, 65285, 0]);
        assert_eq!(state.hats, 0x2E);
        assert!(state.button(0));
        assert!(!state.button(1));
        assert!(state.button(15));
        assert!(!state.button(16));
        assert_eq!(state.hat(0), 0x0E);
        assert_eq!(state.hat(1), 0x02);
        assert_eq!(state.hat(2), 0);
    }

    #[test]
    fn test_encode_matches_parse() {
        let state = parse_state(&frame()).unwrap();
        let mut buf = [0u8; STATE_FRAME_LEN];
        state.encode(&mut buf);
        assert_eq!(buf, frame());
    }

    #[test]
    fn test_checksum_covers_command_and_payload() {
        let mut buf = [0u8; STATE_FRAME_LEN];
        RemoteState::default().encode(&mut buf);
        // only REQ contributes
        assert_eq!(buf[CHECKSUM_INDEX], REQ);
    }

    #[test]
    fn test_rejects_bad_frames() {
        assert_eq!(parse_state(&frame()[..14]), Err(FrameError::Length));

        let mut bad = frame();
        bad[14] = 0x00;
        assert_eq!(parse_state(&bad), Err(FrameError::Framing));

        let mut bad = frame();
        bad[5] ^= 0x10;
        assert_eq!(parse_state(&bad), Err(FrameError::Checksum));

        let mut bad = frame();
        bad[1] = 0x07;
        bad[CHECKSUM_INDEX] = checksum(&bad[1..CHECKSUM_INDEX]);
        assert_eq!(parse_state(&bad), Err(FrameError::UnknownCommand(0x07)));
    }
}

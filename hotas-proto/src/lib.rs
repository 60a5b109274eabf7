//! Frame format for linking a remote throttle board to the joystick.
//!
//! In a dual-board HOTAS (Hands On Throttle And Stick) setup, only the stick
//! board talks USB. Once per poll cycle it asks the throttle board for its raw
//! input state over a UART and pushes the answer into virtual inputs.
//!
//! # Frames
//!
//! **Request** (stick to throttle, 3 bytes):
//!
//! ```text
//! STX REQ ETX
//! ```
//!
//! **State** (throttle to stick, 15 bytes):
//!
//! ```text
//! byte  0     STX
//! byte  1     REQ
//! bytes 2-3   16 button levels, u16 little endian, button 0 in bit 0
//! bytes 4-11  4 raw axis values, u16 little endian each
//! byte  12    2 hat switches, 0000RLDU nibbles, hat 0 in the low nibble
//! byte  13    checksum: XOR of bytes 1-12
//! byte  14    ETX
//! ```
//!
//! All values are raw source levels; calibration and active-level handling
//! happen on the stick side.
//!
//! # Example
//!
//! ```
//! use hotas_proto::{parse_state, RemoteState, STATE_FRAME_LEN};
//!
//! let state = RemoteState {
//!     buttons: 0x8001,
//!     axes: [250, 32768, 65285, 0],
//!     hats: 0xF0,
//! };
//! let mut buf = [0u8; STATE_FRAME_LEN];
//! state.encode(&mut buf);
//! assert_eq!(parse_state(&buf), Ok(state));
//! ```
//!
//! # UART Configuration
//!
//! 115200 baud, 8N1.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod frame;
pub mod reader;

pub use frame::{
    checksum, encode_request, parse_request, parse_state, FrameError, RemoteState, ETX,
    REMOTE_AXES, REMOTE_BUTTONS, REMOTE_HATS, REQ, REQUEST_FRAME_LEN, STATE_FRAME_LEN, STX,
};
pub use reader::StateReader;

/// Baud rate of the throttle link.
pub const HOTAS_BAUDRATE: u32 = 115_200;

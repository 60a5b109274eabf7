//! Configurable USB HID joystick firmware for RP2040.
//!
//! This crate wires the platform-agnostic [`joystick_core`] model to RP2040
//! peripherals: GPIO buttons and hat switches, ADC axes, a USB HID
//! transport and an optional UART link to a remote throttle board.

#![no_std]

// Re-export core types for convenience
pub use joystick_core::{
    build, Axis, AxisConfig, Button, Hat, HatIndex, HatPosition, Joystick, JoystickConfig, JoystickError,
    ReportDescriptor, ReportTransport, TransportError,
};

pub mod remote;
pub mod sources;
pub mod usb_output;

pub use remote::{apply_remote_state, RemoteError, RemoteMapping, RemoteThrottle};
pub use sources::{AdcChannel, SharedAdc};
pub use usb_output::{configure_usb_hid, UsbHidTransport, JOYSTICK_REPORT_ID, MAX_PACKET_SIZE};

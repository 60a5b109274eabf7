//! Platform-agnostic joystick input model, HID descriptor builder and report encoder.
//!
//! This crate provides everything a firmware needs to present itself to a
//! host as a HID joystick, without any platform-specific dependencies. It can
//! be used both in embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! - [`axis`]: Analog axis with calibration, deadband and inversion ([`Axis`])
//! - [`button`]: Digital button with active-level handling ([`Button`])
//! - [`hat`]: Four-way hat switch resolved to 8 directions ([`Hat`])
//! - [`source`]: Raw input sources (pins, ADC channels, virtual values)
//! - [`descriptor`]: HID report descriptor builder ([`build`])
//! - [`report`]: Canonical state and report packing ([`ReportEncoder`])
//! - [`transport`]: Report transport trait ([`ReportTransport`])
//! - [`joystick`]: Orchestrates inputs, encoder and transport ([`Joystick`])
//!
//! # Report Layout
//!
//! ```text
//! [axis 0] .. [axis N-1] [hat 1|hat 0] .. [buttons 0-7] .. (no report ID)
//! ```
//!
//! Axes are one byte each (0-255, 128 at rest). Hat switches share bytes two
//! per byte, lowest index in the low nibble, 8 meaning centred. Buttons are
//! packed LSB first and padded to whole bytes.
//!
//! # Example
//!
//! ```rust
//! use joystick_core::{build, HatPosition};
//!
//! let descriptor = build(2, 8, 1).unwrap();
//! assert_eq!(descriptor.report_len(), 2 + 1 + 1);
//! assert_eq!(HatPosition::resolve(true, false, false, true), HatPosition::UpRight);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//! - **`log`**: Route internal logging through the `log` facade
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// must come first so the logging macros are visible to every module
mod fmt;

pub mod axis;
pub mod button;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod hat;
pub mod joystick;
pub mod report;
pub mod source;
pub mod transport;

// Re-export main types at crate root
pub use axis::{Axis, AxisConfig};
pub use button::Button;
pub use config::{JoystickConfig, DEFAULT_RETRY_DELAY_MS};
pub use descriptor::{build, AxisUsage, ReportDescriptor, ReportLayout};
pub use error::{ConfigError, JoystickError, RangeError, SourceError, TransportError};
pub use hat::{Hat, HatIndex, HatPosition};
pub use joystick::Joystick;
pub use report::{EncoderState, ReportEncoder, AXIS_IDLE};
pub use source::{
    AnalogRead, AnalogSource, AxisSource, ButtonSource, DigitalSource, NoPin, RawSource,
    VirtualSource, AXIS_REST_RAW,
};
pub use transport::ReportTransport;

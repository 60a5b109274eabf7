//! USB HID report descriptor generation.
//!
//! The descriptor describes a joystick (Generic Desktop / Joystick) with a
//! configurable number of axes, hat switches and buttons, laid out in that
//! order:
//!
//! ```text
//! byte 0 ..              axes, one unsigned byte each (0-255)
//! byte axes ..           hat switches, one nibble each, hat 0 in the low nibble,
//!                        an odd count padded with one constant nibble
//! byte axes+hat_bytes .. buttons, one bit each, button 0 in bit 0,
//!                        padded with constant bits to a whole byte
//! ```
//!
//! The descriptor carries a placeholder report ID (`0xFF`) at
//! [`REPORT_ID_INDEX`]. The transport patches it when it registers the
//! device; the report itself never contains the ID.
//!
//! # Example
//!
//! ```
//! use joystick_core::descriptor::build;
//!
//! let descriptor = build(2, 2, 1).unwrap();
//! assert_eq!(descriptor.report_len(), 4);
//! assert_eq!(descriptor.report_id_index(), 7);
//! ```

use heapless::Vec;

use crate::error::ConfigError;

/// Maximum number of axes.
pub const MAX_AXES: usize = 8;
/// Maximum number of buttons.
pub const MAX_BUTTONS: usize = 128;
/// Maximum number of hat switches.
pub const MAX_HATS: usize = 4;

/// Largest possible report (8 axes, 4 hats, 128 buttons), without report ID.
pub const MAX_REPORT_LEN: usize = MAX_AXES + MAX_HATS.div_ceil(2) + MAX_BUTTONS.div_ceil(8);

/// Upper bound on the generated descriptor size.
pub const MAX_DESCRIPTOR_LEN: usize = 128;

/// Byte offset of the report ID placeholder in the descriptor.
pub const REPORT_ID_INDEX: usize = 7;

/// Placeholder written at [`REPORT_ID_INDEX`].
pub const REPORT_ID_PLACEHOLDER: u8 = 0xFF;

/// HID usage page: Generic Desktop.
pub const USAGE_PAGE_GENERIC_DESKTOP: u8 = 0x01;
/// HID usage: Joystick.
pub const USAGE_JOYSTICK: u8 = 0x04;

const USAGE_PAGE_BUTTON: u8 = 0x09;
const USAGE_HAT_SWITCH: u8 = 0x39;

// Short item prefixes (tag | type | size).
const ITEM_USAGE_PAGE: u8 = 0x05;
const ITEM_USAGE: u8 = 0x09;
const ITEM_COLLECTION: u8 = 0xA1;
const ITEM_END_COLLECTION: u8 = 0xC0;
const ITEM_REPORT_ID: u8 = 0x85;
const ITEM_USAGE_MINIMUM: u8 = 0x19;
const ITEM_USAGE_MAXIMUM: u8 = 0x29;
const ITEM_LOGICAL_MINIMUM: u8 = 0x15;
const ITEM_LOGICAL_MAXIMUM: u8 = 0x25;
const ITEM_LOGICAL_MAXIMUM_16: u8 = 0x26;
const ITEM_PHYSICAL_MINIMUM: u8 = 0x35;
const ITEM_PHYSICAL_MAXIMUM_16: u8 = 0x46;
const ITEM_UNIT: u8 = 0x65;
const ITEM_REPORT_SIZE: u8 = 0x75;
const ITEM_REPORT_COUNT: u8 = 0x95;
const ITEM_INPUT: u8 = 0x81;

const COLLECTION_APPLICATION: u8 = 0x01;
const INPUT_DATA_VAR_ABS: u8 = 0x02;
const INPUT_CONST_VAR_ABS: u8 = 0x03;
const INPUT_DATA_VAR_ABS_NULL: u8 = 0x42;
const UNIT_ENG_ROT_DEGREES: u8 = 0x14;

/// Generic Desktop usage for each axis slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AxisUsage {
    X = 0x30,
    Y = 0x31,
    Z = 0x32,
    Rx = 0x33,
    Ry = 0x34,
    Rz = 0x35,
    /// First slider.
    S0 = 0x36,
    /// Second slider (shares the Slider usage with [`AxisUsage::S0`]).
    S1 = 0x37,
}

impl AxisUsage {
    /// Axis usages in wire order.
    pub const ALL: [AxisUsage; MAX_AXES] = [
        AxisUsage::X,
        AxisUsage::Y,
        AxisUsage::Z,
        AxisUsage::Rx,
        AxisUsage::Ry,
        AxisUsage::Rz,
        AxisUsage::S0,
        AxisUsage::S1,
    ];

    /// Wire index of this axis.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - AxisUsage::X as usize
    }

    /// HID usage ID. Both sliders report the Slider usage (0x36).
    #[inline]
    #[must_use]
    pub const fn usage_id(self) -> u8 {
        match self {
            AxisUsage::S1 => AxisUsage::S0 as u8,
            other => other as u8,
        }
    }
}

/// Validated input counts and the byte layout of the resulting report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportLayout {
    axes: u8,
    buttons: u8,
    hats: u8,
}

impl ReportLayout {
    /// Validate the requested counts.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if axes > 8, buttons > 128 or hats > 4.
    pub const fn new(axes: usize, buttons: usize, hats: usize) -> Result<Self, ConfigError> {
        if axes > MAX_AXES {
            return Err(ConfigError::TooManyAxes);
        }
        if buttons > MAX_BUTTONS {
            return Err(ConfigError::TooManyButtons);
        }
        if hats > MAX_HATS {
            return Err(ConfigError::TooManyHats);
        }
        Ok(Self {
            axes: axes as u8,
            buttons: buttons as u8,
            hats: hats as u8,
        })
    }

    #[inline]
    #[must_use]
    pub const fn axes(&self) -> usize {
        self.axes as usize
    }

    #[inline]
    #[must_use]
    pub const fn buttons(&self) -> usize {
        self.buttons as usize
    }

    #[inline]
    #[must_use]
    pub const fn hats(&self) -> usize {
        self.hats as usize
    }

    /// Bytes occupied by hat switches (two per byte).
    #[inline]
    #[must_use]
    pub const fn hat_bytes(&self) -> usize {
        self.hats().div_ceil(2)
    }

    /// Bytes occupied by buttons (eight per byte).
    #[inline]
    #[must_use]
    pub const fn button_bytes(&self) -> usize {
        self.buttons().div_ceil(8)
    }

    /// Offset of the first hat byte.
    #[inline]
    #[must_use]
    pub const fn hat_offset(&self) -> usize {
        self.axes()
    }

    /// Offset of the first button byte.
    #[inline]
    #[must_use]
    pub const fn button_offset(&self) -> usize {
        self.axes() + self.hat_bytes()
    }

    /// Total report length in bytes, excluding the report ID.
    #[inline]
    #[must_use]
    pub const fn report_len(&self) -> usize {
        self.button_bytes() + self.axes() + self.hat_bytes()
    }
}

/// A generated report descriptor together with its report layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportDescriptor {
    bytes: Vec<u8, MAX_DESCRIPTOR_LEN>,
    layout: ReportLayout,
}

impl ReportDescriptor {
    /// Descriptor bytes, ready to hand to the USB stack.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn layout(&self) -> ReportLayout {
        self.layout
    }

    /// Report length in bytes, excluding the report ID.
    #[must_use]
    pub fn report_len(&self) -> usize {
        self.layout.report_len()
    }

    /// Byte offset of the report ID in [`as_bytes`](Self::as_bytes).
    #[must_use]
    pub fn report_id_index(&self) -> usize {
        REPORT_ID_INDEX
    }

    /// Current report ID byte (the placeholder until patched).
    #[must_use]
    pub fn report_id(&self) -> u8 {
        self.bytes[REPORT_ID_INDEX]
    }

    /// Overwrite the report ID placeholder.
    pub fn set_report_id(&mut self, report_id: u8) {
        self.bytes[REPORT_ID_INDEX] = report_id;
    }
}

/// Build the report descriptor for the given input counts.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any count is out of range.
pub fn build(axes: usize, buttons: usize, hats: usize) -> Result<ReportDescriptor, ConfigError> {
    ReportLayout::new(axes, buttons, hats).map(build_for)
}

/// Build the report descriptor for an already validated layout.
#[must_use]
pub fn build_for(layout: ReportLayout) -> ReportDescriptor {
    let mut writer = DescriptorWriter::new();

    writer.item(ITEM_USAGE_PAGE, USAGE_PAGE_GENERIC_DESKTOP);
    writer.item(ITEM_USAGE, USAGE_JOYSTICK);
    writer.item(ITEM_COLLECTION, COLLECTION_APPLICATION);
    writer.item(ITEM_REPORT_ID, REPORT_ID_PLACEHOLDER);

    if layout.axes() > 0 {
        for usage in &AxisUsage::ALL[..layout.axes()] {
            writer.item(ITEM_USAGE, usage.usage_id());
        }
        writer.item(ITEM_LOGICAL_MINIMUM, 0);
        writer.item16(ITEM_LOGICAL_MAXIMUM_16, 255);
        writer.item(ITEM_REPORT_SIZE, 8);
        writer.item(ITEM_REPORT_COUNT, layout.axes);
        writer.item(ITEM_INPUT, INPUT_DATA_VAR_ABS);
    }

    if layout.hats() > 0 {
        for _ in 0..layout.hats() {
            writer.item(ITEM_USAGE, USAGE_HAT_SWITCH);
        }
        writer.item(ITEM_LOGICAL_MINIMUM, 0);
        writer.item(ITEM_LOGICAL_MAXIMUM, 7);
        writer.item(ITEM_PHYSICAL_MINIMUM, 0);
        writer.item16(ITEM_PHYSICAL_MAXIMUM_16, 315);
        writer.item(ITEM_UNIT, UNIT_ENG_ROT_DEGREES);
        writer.item(ITEM_REPORT_SIZE, 4);
        writer.item(ITEM_REPORT_COUNT, layout.hats);
        writer.item(ITEM_INPUT, INPUT_DATA_VAR_ABS_NULL);

        let hat_pad = layout.hats % 2;
        if hat_pad > 0 {
            writer.item(ITEM_REPORT_SIZE, 4);
            writer.item(ITEM_REPORT_COUNT, hat_pad);
            writer.item(ITEM_INPUT, INPUT_CONST_VAR_ABS);
        }
    }

    if layout.buttons() > 0 {
        writer.item(ITEM_USAGE_PAGE, USAGE_PAGE_BUTTON);
        writer.item(ITEM_USAGE_MINIMUM, 1);
        writer.item(ITEM_USAGE_MAXIMUM, layout.buttons);
        writer.item(ITEM_LOGICAL_MINIMUM, 0);
        writer.item(ITEM_LOGICAL_MAXIMUM, 1);
        writer.item(ITEM_REPORT_COUNT, layout.buttons);
        writer.item(ITEM_REPORT_SIZE, 1);
        writer.item(ITEM_INPUT, INPUT_DATA_VAR_ABS);

        let button_pad = layout.buttons % 8;
        if button_pad > 0 {
            writer.item(ITEM_REPORT_SIZE, 1);
            writer.item(ITEM_REPORT_COUNT, 8 - button_pad);
            writer.item(ITEM_INPUT, INPUT_CONST_VAR_ABS);
        }
    }

    writer.byte(ITEM_END_COLLECTION);

    info!(
        "Built joystick descriptor: {} axes, {} buttons, {} hats, {} report bytes",
        layout.axes(),
        layout.buttons(),
        layout.hats(),
        layout.report_len()
    );

    ReportDescriptor {
        bytes: writer.finish(),
        layout,
    }
}

/// Append-only descriptor buffer.
///
/// The largest layout needs 89 bytes, well inside [`MAX_DESCRIPTOR_LEN`],
/// so pushes cannot fail.
struct DescriptorWriter {
    bytes: Vec<u8, MAX_DESCRIPTOR_LEN>,
}

impl DescriptorWriter {
    fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    #[inline]
    fn byte(&mut self, byte: u8) {
        let pushed = self.bytes.push(byte);
        debug_assert!(pushed.is_ok(), "descriptor buffer overflow");
    }

    #[inline]
    fn item(&mut self, prefix: u8, data: u8) {
        self.byte(prefix);
        self.byte(data);
    }

    #[inline]
    fn item16(&mut self, prefix: u8, data: u16) {
        let [lo, hi] = data.to_le_bytes();
        self.byte(prefix);
        self.byte(lo);
        self.byte(hi);
    }

    fn finish(self) -> Vec<u8, MAX_DESCRIPTOR_LEN> {
        self.bytes
    }
}

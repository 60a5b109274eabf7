//! Canonical joystick state and HID report packing.
//!
//! [`ReportEncoder`] holds the normalized state of every axis, button and hat
//! switch, packs it into the byte layout produced by
//! [`descriptor::build`](crate::descriptor::build) and remembers the last
//! report that reached the host so identical reports are not sent twice.

use heapless::Vec;

use crate::descriptor::{ReportLayout, MAX_AXES, MAX_BUTTONS, MAX_HATS, MAX_REPORT_LEN};
use crate::error::RangeError;
use crate::hat::HatPosition;

/// Rest value for axes.
pub const AXIS_IDLE: u8 = 128;

const BUTTON_BYTES: usize = MAX_BUTTONS / 8;

/// Packed report bytes (without report ID).
pub type Report = Vec<u8, MAX_REPORT_LEN>;

/// Whether canonical state has changed since the last commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderState {
    /// Nothing staged since the last commit.
    Idle,
    /// State changed; a commit is pending.
    Dirty,
}

/// Canonical state plus report packing and change detection.
#[derive(Clone, Debug)]
pub struct ReportEncoder {
    layout: ReportLayout,
    axes: [u8; MAX_AXES],
    buttons: [u8; BUTTON_BYTES],
    hats: [HatPosition; MAX_HATS],
    report: Report,
    last_sent: Option<Report>,
    state: EncoderState,
}

impl ReportEncoder {
    /// Create an encoder with every input at rest.
    #[must_use]
    pub fn new(layout: ReportLayout) -> Self {
        let mut report = Report::new();
        // report_len() <= MAX_REPORT_LEN for every valid layout
        let _ = report.resize(layout.report_len(), 0);
        Self {
            layout,
            axes: [AXIS_IDLE; MAX_AXES],
            buttons: [0; BUTTON_BYTES],
            hats: [HatPosition::Idle; MAX_HATS],
            report,
            last_sent: None,
            state: EncoderState::Idle,
        }
    }

    #[must_use]
    pub fn layout(&self) -> ReportLayout {
        self.layout
    }

    #[must_use]
    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Check an axis index against the configured axis count.
    pub fn check_axis(&self, index: usize) -> Result<(), RangeError> {
        if index < self.layout.axes() {
            Ok(())
        } else {
            Err(RangeError::AxisIndex(index))
        }
    }

    /// Check a button index against the configured button count.
    pub fn check_button(&self, index: usize) -> Result<(), RangeError> {
        if index < self.layout.buttons() {
            Ok(())
        } else {
            Err(RangeError::ButtonIndex(index))
        }
    }

    /// Check a hat index against the configured hat count.
    pub fn check_hat(&self, index: usize) -> Result<(), RangeError> {
        if index < self.layout.hats() {
            Ok(())
        } else {
            Err(RangeError::HatIndex(index))
        }
    }

    /// Set one axis value.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::AxisIndex`] for an index outside the layout.
    pub fn set_axis(&mut self, index: usize, value: u8) -> Result<(), RangeError> {
        self.check_axis(index)?;
        self.axes[index] = value;
        self.state = EncoderState::Dirty;
        Ok(())
    }

    /// Set one button state.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::ButtonIndex`] for an index outside the layout.
    pub fn set_button(&mut self, index: usize, pressed: bool) -> Result<(), RangeError> {
        self.check_button(index)?;
        let mask = 1 << (index % 8);
        if pressed {
            self.buttons[index / 8] |= mask;
        } else {
            self.buttons[index / 8] &= !mask;
        }
        self.state = EncoderState::Dirty;
        Ok(())
    }

    /// Set one hat switch position.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::HatIndex`] for an index outside the layout.
    pub fn set_hat(&mut self, index: usize, position: HatPosition) -> Result<(), RangeError> {
        self.check_hat(index)?;
        self.hats[index] = position;
        self.state = EncoderState::Dirty;
        Ok(())
    }

    /// Release every button.
    pub fn clear_buttons(&mut self) {
        self.buttons = [0; BUTTON_BYTES];
        self.state = EncoderState::Dirty;
    }

    /// Put every input back at rest: axes centred, buttons released, hats idle.
    pub fn reset(&mut self) {
        self.axes = [AXIS_IDLE; MAX_AXES];
        self.buttons = [0; BUTTON_BYTES];
        self.hats = [HatPosition::Idle; MAX_HATS];
        self.state = EncoderState::Dirty;
    }

    #[must_use]
    pub fn axis(&self, index: usize) -> Option<u8> {
        self.check_axis(index).ok().map(|()| self.axes[index])
    }

    #[must_use]
    pub fn button(&self, index: usize) -> Option<bool> {
        self.check_button(index)
            .ok()
            .map(|()| self.buttons[index / 8] & (1 << (index % 8)) != 0)
    }

    #[must_use]
    pub fn hat(&self, index: usize) -> Option<HatPosition> {
        self.check_hat(index).ok().map(|()| self.hats[index])
    }

    /// Pack canonical state into the report buffer and return it.
    pub fn pack(&mut self) -> &[u8] {
        let layout = self.layout;
        let report = self.report.as_mut_slice();

        report[..layout.axes()].copy_from_slice(&self.axes[..layout.axes()]);

        let hats = &self.hats[..layout.hats()];
        for (byte, pair) in report[layout.hat_offset()..layout.button_offset()]
            .iter_mut()
            .zip(hats.chunks(2))
        {
            let low = pair[0].raw();
            // odd count: the trailing nibble is constant filler
            let high = pair.get(1).map_or(0, |h| h.raw());
            *byte = (high << 4) | low;
        }

        let button_offset = layout.button_offset();
        report[button_offset..].copy_from_slice(&self.buttons[..layout.button_bytes()]);

        &self.report
    }

    /// Pack the report and decide whether it must be transmitted.
    ///
    /// Returns the report when it differs byte-for-byte from the last report
    /// marked sent (or nothing has been sent yet), or whenever `always` is
    /// set. Otherwise the encoder goes back to [`EncoderState::Idle`] and
    /// `None` is returned.
    pub fn prepare(&mut self, always: bool) -> Option<&[u8]> {
        self.pack();
        let changed = self.last_sent.as_ref() != Some(&self.report);
        if always || changed {
            Some(&self.report)
        } else {
            self.state = EncoderState::Idle;
            None
        }
    }

    /// Record the current report as delivered to the host.
    pub fn mark_sent(&mut self) {
        self.last_sent = Some(self.report.clone());
        self.state = EncoderState::Idle;
    }

    /// Last report that reached the host, if any.
    #[must_use]
    pub fn last_sent(&self) -> Option<&[u8]> {
        self.last_sent.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(axes: usize, buttons: usize, hats: usize) -> ReportEncoder {
        ReportEncoder::new(ReportLayout::new(axes, buttons, hats).unwrap())
    }

    #[test]
    fn test_rest_report() {
        let mut enc = encoder(2, 2, 1);
        assert_eq!(enc.pack(), &[128, 128, 0x08, 0x00]);
    }

    #[test]
    fn test_layout_axes_hats_buttons() {
        let mut enc = encoder(3, 10, 3);
        enc.set_axis(0, 0).unwrap();
        enc.set_axis(2, 255).unwrap();
        enc.set_hat(0, HatPosition::Right).unwrap();
        enc.set_hat(1, HatPosition::UpLeft).unwrap();
        enc.set_hat(2, HatPosition::Down).unwrap();
        enc.set_button(0, true).unwrap();
        enc.set_button(9, true).unwrap();
        assert_eq!(
            enc.pack(),
            &[0, 128, 255, 0x72, 0x04, 0b0000_0001, 0b0000_0010]
        );
    }

    #[test]
    fn test_button_release_clears_bit() {
        let mut enc = encoder(0, 16, 0);
        enc.set_button(12, true).unwrap();
        assert_eq!(enc.button(12), Some(true));
        enc.set_button(12, false).unwrap();
        assert_eq!(enc.button(12), Some(false));
        assert_eq!(enc.pack(), &[0, 0]);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut enc = encoder(2, 8, 1);
        assert_eq!(enc.set_axis(2, 0), Err(RangeError::AxisIndex(2)));
        assert_eq!(enc.set_button(8, true), Err(RangeError::ButtonIndex(8)));
        assert_eq!(
            enc.set_hat(1, HatPosition::Up),
            Err(RangeError::HatIndex(1))
        );
        assert_eq!(enc.axis(2), None);
        assert_eq!(enc.state(), EncoderState::Idle);
    }

    #[test]
    fn test_prepare_suppresses_duplicates() {
        let mut enc = encoder(1, 1, 0);
        assert!(enc.prepare(false).is_some());
        enc.mark_sent();
        assert!(enc.prepare(false).is_none());

        enc.set_axis(0, 10).unwrap();
        assert_eq!(enc.state(), EncoderState::Dirty);
        assert_eq!(enc.prepare(false), Some(&[10u8, 0][..]));
        enc.mark_sent();
        assert_eq!(enc.state(), EncoderState::Idle);

        // same value again: staged but identical
        enc.set_axis(0, 10).unwrap();
        assert!(enc.prepare(false).is_none());
        assert_eq!(enc.state(), EncoderState::Idle);
        assert!(enc.prepare(true).is_some());
    }

    #[test]
    fn test_unsent_report_is_retried() {
        let mut enc = encoder(1, 0, 0);
        enc.prepare(false);
        enc.mark_sent();
        enc.set_axis(0, 1).unwrap();
        assert!(enc.prepare(false).is_some());
        // not marked sent: the next prepare still sees a difference
        assert!(enc.prepare(false).is_some());
        assert_eq!(enc.last_sent(), Some(&[128u8][..]));
    }

    #[test]
    fn test_reset() {
        let mut enc = encoder(1, 8, 2);
        enc.set_axis(0, 0).unwrap();
        enc.set_button(3, true).unwrap();
        enc.set_hat(1, HatPosition::Left).unwrap();
        enc.reset();
        assert_eq!(enc.pack(), &[128, 0x88, 0]);
    }

    #[test]
    fn test_empty_layout() {
        let mut enc = encoder(0, 0, 0);
        assert!(enc.pack().is_empty());
    }
}

//! Joystick capacity configuration.

use crate::descriptor::ReportLayout;
use crate::error::ConfigError;

/// Default delay before the single construction retry.
pub const DEFAULT_RETRY_DELAY_MS: u32 = 1000;

/// Number of axes, buttons and hat switches exposed to the host.
///
/// The same configuration must be used to build the report descriptor and
/// the [`Joystick`](crate::Joystick), otherwise the host will misread
/// reports.
///
/// # Example
///
/// ```
/// use joystick_core::JoystickConfig;
///
/// let config = JoystickConfig::new(4, 32, 2);
/// let layout = config.layout().unwrap();
/// assert_eq!(layout.report_len(), 4 + 1 + 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickConfig {
    /// Axis count, 0-8.
    pub axes: usize,
    /// Button count, 0-128.
    pub buttons: usize,
    /// Hat switch count, 0-4.
    pub hats: usize,
    /// Delay before retrying the initial report when the transport is not
    /// ready yet.
    pub retry_delay_ms: u32,
}

impl JoystickConfig {
    #[must_use]
    pub const fn new(axes: usize, buttons: usize, hats: usize) -> Self {
        Self {
            axes,
            buttons,
            hats,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    #[must_use]
    pub const fn with_retry_delay_ms(mut self, retry_delay_ms: u32) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Validate the counts and compute the report layout.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any count is out of range.
    pub const fn layout(&self) -> Result<ReportLayout, ConfigError> {
        ReportLayout::new(self.axes, self.buttons, self.hats)
    }
}

impl Default for JoystickConfig {
    /// 8 axes, 64 buttons and 4 hat switches.
    fn default() -> Self {
        Self::new(8, 64, 4)
    }
}

//! Axis input: clamping, deadband, min/max rescaling, inversion and bypass.
//!
//! The raw range `[min, max]` is mapped onto the unsigned 8-bit HID range
//! with [`Axis::IDLE`] (128) as the rest position. Raw values within
//! `deadband` of the raw midpoint all map to the rest position.

use crate::error::{ConfigError, SourceError};
use crate::source::{AnalogRead, AxisSource, RawSource};

/// Calibration for one axis.
///
/// # Example
///
/// ```
/// use joystick_core::AxisConfig;
///
/// let config = AxisConfig::default().with_range(250, 65285).with_deadband(2500);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConfig {
    /// Raw value that maps to 0 (or 255 when inverted).
    pub min: u16,
    /// Raw value that maps to 255 (or 0 when inverted).
    pub max: u16,
    /// Half-width of the dead zone around the raw midpoint.
    pub deadband: u16,
    /// Mirror the scaled output.
    pub invert: bool,
}

impl AxisConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: 0,
            max: u16::MAX,
            deadband: 0,
            invert: false,
        }
    }

    #[must_use]
    pub const fn with_range(mut self, min: u16, max: u16) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub const fn with_deadband(mut self, deadband: u16) -> Self {
        self.deadband = deadband;
        self
    }

    #[must_use]
    pub const fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Check that the calibration leaves a usable range.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DegenerateAxisRange`] if `min >= max`
    /// - [`ConfigError::DeadbandTooLarge`] if a nonzero `deadband` is at
    ///   least `(max - min) / 2`
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.min >= self.max {
            return Err(ConfigError::DegenerateAxisRange);
        }
        let span = (self.max - self.min) as u32;
        if self.deadband > 0 && self.deadband as u32 >= span / 2 {
            return Err(ConfigError::DeadbandTooLarge);
        }
        Ok(())
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Scaling parameters derived once from a validated [`AxisConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scaler {
    min: u32,
    max: u32,
    deadband: u32,
    midpoint: u32,
    db_range: u32,
    invert: bool,
}

impl Scaler {
    fn new(config: &AxisConfig) -> Self {
        let min = config.min as u32;
        let max = config.max as u32;
        let deadband = config.deadband as u32;
        Self {
            min,
            max,
            deadband,
            midpoint: min + (max - min) / 2,
            db_range: (max - min) - 2 * deadband + 1,
            invert: config.invert,
        }
    }

    fn scale(&self, raw: u16) -> u8 {
        let value = (raw as u32).clamp(self.min, self.max);

        let shift = if value + self.deadband < self.midpoint {
            value - self.min
        } else if value > self.midpoint + self.deadband {
            value - self.min - 2 * self.deadband
        } else {
            self.db_range / 2
        };

        let out = (shift * 256 / self.db_range).min(255) as u8;
        if self.invert {
            255 - out
        } else {
            out
        }
    }
}

/// Axis input bound to one analog or virtual source.
///
/// `A` is the analog channel type; axes fed only by virtual sources can use
/// [`NoPin`](crate::NoPin).
pub struct Axis<A> {
    source: AxisSource<A>,
    config: AxisConfig,
    scaler: Scaler,
    last_raw: Option<u16>,
    value: u8,
    /// Report [`Axis::IDLE`] regardless of the source.
    pub bypass: bool,
}

impl<A: AnalogRead> Axis<A> {
    /// Rest position of every axis.
    pub const IDLE: u8 = 128;
    /// Lowest axis value.
    pub const MIN: u8 = 0;
    /// Highest axis value.
    pub const MAX: u8 = 255;

    /// Create an axis reading from `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails [`AxisConfig::validate`].
    pub fn new(source: AxisSource<A>, config: AxisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            scaler: Scaler::new(&config),
            config,
            last_raw: None,
            value: Self::IDLE,
            bypass: false,
        })
    }

    /// Create an axis reading from an ADC channel.
    pub fn analog(adc: A, config: AxisConfig) -> Result<Self, ConfigError> {
        Self::new(AxisSource::analog(adc), config)
    }

    /// Create an axis backed by a virtual source resting at the centre.
    pub fn virtual_input(config: AxisConfig) -> Result<Self, ConfigError> {
        Self::new(AxisSource::idle(), config)
    }

    /// Read the source and return the processed value.
    ///
    /// Returns [`Axis::IDLE`] while bypassed; the scaled value is still
    /// computed and cached.
    pub fn value(&mut self) -> u8 {
        let value = self.update();
        if self.bypass {
            Self::IDLE
        } else {
            value
        }
    }

    /// Read the source and refresh the cached scaled value.
    ///
    /// Skips the scaling math when the raw value has not changed.
    pub fn update(&mut self) -> u8 {
        let raw = self.source.read();
        if self.last_raw != Some(raw) {
            self.last_raw = Some(raw);
            self.value = self.scaler.scale(raw);
        }
        self.value
    }

    /// Raw source value, unprocessed.
    pub fn source_value(&mut self) -> u16 {
        self.source.read()
    }

    /// Push a raw value into a virtual source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotSettable`] for analog sources.
    pub fn set_source_value(&mut self, value: u16) -> Result<(), SourceError> {
        self.source.write(value)
    }

    #[must_use]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    #[must_use]
    pub fn min(&self) -> u16 {
        self.config.min
    }

    #[must_use]
    pub fn max(&self) -> u16 {
        self.config.max
    }

    #[must_use]
    pub fn deadband(&self) -> u16 {
        self.config.deadband
    }

    #[must_use]
    pub fn invert(&self) -> bool {
        self.config.invert
    }

    #[must_use]
    pub fn source(&self) -> &AxisSource<A> {
        &self.source
    }
}

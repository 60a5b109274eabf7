//! Raw input sources.
//!
//! Every input reads from exactly one [`RawSource`]. The set of source kinds
//! is closed:
//!
//! - [`DigitalSource`]: a GPIO pin (or expander pin) implementing
//!   [`embedded_hal::digital::InputPin`]
//! - [`AnalogSource`]: an ADC channel implementing [`AnalogRead`]
//! - [`VirtualSource`]: a plain value that can be pushed from elsewhere, e.g.
//!   raw states received from a remote sub-device
//!
//! Buttons bind a [`ButtonSource`] (digital or virtual), axes bind an
//! [`AxisSource`] (analog or virtual). Only virtual sources accept
//! [`RawSource::write`].

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::error::SourceError;

/// Raw value of an analog source at rest (centre of the 16-bit range).
pub const AXIS_REST_RAW: u16 = 32768;

/// Capability interface shared by all raw sources.
pub trait RawSource {
    /// `bool` for button-like sources, `u16` for axis-like sources.
    type Value: Copy + PartialEq;

    /// Read the current raw value.
    fn read(&mut self) -> Self::Value;

    /// Push a new raw value.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotSettable`] unless the source is virtual.
    fn write(&mut self, value: Self::Value) -> Result<(), SourceError>;

    /// Whether [`write`](Self::write) is supported.
    fn is_settable(&self) -> bool;
}

/// Blocking single-channel analog read, scaled to the full 16-bit range.
///
/// Implementations with a narrower converter shift their result up so that
/// full scale reads as (close to) `u16::MAX`.
pub trait AnalogRead {
    type Error: core::fmt::Debug;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Settable source holding its value in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualSource<V> {
    value: V,
}

impl<V: Copy> VirtualSource<V> {
    #[must_use]
    pub const fn new(value: V) -> Self {
        Self { value }
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> V {
        self.value
    }

    #[inline]
    pub fn set(&mut self, value: V) {
        self.value = value;
    }
}

impl<V: Copy + PartialEq> RawSource for VirtualSource<V> {
    type Value = V;

    #[inline]
    fn read(&mut self) -> V {
        self.value
    }

    #[inline]
    fn write(&mut self, value: V) -> Result<(), SourceError> {
        self.value = value;
        Ok(())
    }

    #[inline]
    fn is_settable(&self) -> bool {
        true
    }
}

/// Digital pin source.
///
/// A failed pin read keeps reporting the last level that was read
/// successfully (initially the rest level given at construction).
pub struct DigitalSource<P> {
    pin: P,
    last: bool,
}

impl<P: InputPin> DigitalSource<P> {
    /// Wrap `pin`; `rest_level` is reported until the first successful read.
    #[must_use]
    pub fn new(pin: P, rest_level: bool) -> Self {
        Self {
            pin,
            last: rest_level,
        }
    }

    /// Release the underlying pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin> RawSource for DigitalSource<P> {
    type Value = bool;

    fn read(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => self.last = level,
            Err(_) => warn!("Digital read failed, holding level {}", self.last),
        }
        self.last
    }

    fn write(&mut self, _value: bool) -> Result<(), SourceError> {
        Err(SourceError::NotSettable)
    }

    fn is_settable(&self) -> bool {
        false
    }
}

/// Analog channel source.
///
/// A failed conversion keeps reporting the last good reading (initially
/// [`AXIS_REST_RAW`]).
pub struct AnalogSource<A> {
    adc: A,
    last: u16,
}

impl<A: AnalogRead> AnalogSource<A> {
    #[must_use]
    pub fn new(adc: A) -> Self {
        Self {
            adc,
            last: AXIS_REST_RAW,
        }
    }

    pub fn into_inner(self) -> A {
        self.adc
    }
}

impl<A: AnalogRead> RawSource for AnalogSource<A> {
    type Value = u16;

    fn read(&mut self) -> u16 {
        match self.adc.read_raw() {
            Ok(raw) => self.last = raw,
            Err(_) => warn!("Analog read failed, holding value {}", self.last),
        }
        self.last
    }

    fn write(&mut self, _value: u16) -> Result<(), SourceError> {
        Err(SourceError::NotSettable)
    }

    fn is_settable(&self) -> bool {
        false
    }
}

/// Source bound to a [`Button`](crate::Button).
pub enum ButtonSource<P> {
    Digital(DigitalSource<P>),
    Virtual(VirtualSource<bool>),
}

impl<P: InputPin> ButtonSource<P> {
    /// Digital pin; rests at `active_low` (the released level).
    #[must_use]
    pub fn digital(pin: P, active_low: bool) -> Self {
        ButtonSource::Digital(DigitalSource::new(pin, active_low))
    }

    /// Virtual source initialised to the released level for `active_low`.
    #[must_use]
    pub const fn idle(active_low: bool) -> Self {
        ButtonSource::Virtual(VirtualSource::new(active_low))
    }
}

impl<P: InputPin> RawSource for ButtonSource<P> {
    type Value = bool;

    #[inline]
    fn read(&mut self) -> bool {
        match self {
            ButtonSource::Digital(s) => s.read(),
            ButtonSource::Virtual(s) => s.read(),
        }
    }

    #[inline]
    fn write(&mut self, value: bool) -> Result<(), SourceError> {
        match self {
            ButtonSource::Digital(s) => s.write(value),
            ButtonSource::Virtual(s) => s.write(value),
        }
    }

    #[inline]
    fn is_settable(&self) -> bool {
        matches!(self, ButtonSource::Virtual(_))
    }
}

/// Source bound to an [`Axis`](crate::Axis).
pub enum AxisSource<A> {
    Analog(AnalogSource<A>),
    Virtual(VirtualSource<u16>),
}

impl<A: AnalogRead> AxisSource<A> {
    #[must_use]
    pub fn analog(adc: A) -> Self {
        AxisSource::Analog(AnalogSource::new(adc))
    }

    /// Virtual source initialised to [`AXIS_REST_RAW`].
    #[must_use]
    pub const fn idle() -> Self {
        AxisSource::Virtual(VirtualSource::new(AXIS_REST_RAW))
    }
}

impl<A: AnalogRead> RawSource for AxisSource<A> {
    type Value = u16;

    #[inline]
    fn read(&mut self) -> u16 {
        match self {
            AxisSource::Analog(s) => s.read(),
            AxisSource::Virtual(s) => s.read(),
        }
    }

    #[inline]
    fn write(&mut self, value: u16) -> Result<(), SourceError> {
        match self {
            AxisSource::Analog(s) => s.write(value),
            AxisSource::Virtual(s) => s.write(value),
        }
    }

    #[inline]
    fn is_settable(&self) -> bool {
        matches!(self, AxisSource::Virtual(_))
    }
}

/// Placeholder pin type for joysticks built only from virtual sources.
///
/// Uninhabited: a `NoPin` can never be constructed, so it never gets read.
#[derive(Debug)]
pub enum NoPin {}

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        match *self {}
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        match *self {}
    }
}

impl AnalogRead for NoPin {
    type Error = Infallible;

    fn read_raw(&mut self) -> Result<u16, Infallible> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakyPin {
        levels: [Option<bool>; 3],
        index: usize,
    }

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl ErrorType for FlakyPin {
        type Error = PinFault;
    }

    impl InputPin for FlakyPin {
        fn is_high(&mut self) -> Result<bool, PinFault> {
            let level = self.levels[self.index];
            self.index += 1;
            level.ok_or(PinFault)
        }

        fn is_low(&mut self) -> Result<bool, PinFault> {
            self.is_high().map(|l| !l)
        }
    }

    struct FailingAdc;

    impl AnalogRead for FailingAdc {
        type Error = ();

        fn read_raw(&mut self) -> Result<u16, ()> {
            Err(())
        }
    }

    #[test]
    fn test_virtual_source_is_settable() {
        let mut source = VirtualSource::new(false);
        assert!(source.is_settable());
        source.write(true).unwrap();
        assert!(source.read());
    }

    #[test]
    fn test_digital_source_rejects_write() {
        let pin = FlakyPin {
            levels: [Some(true); 3],
            index: 0,
        };
        let mut source = ButtonSource::digital(pin, true);
        assert!(!source.is_settable());
        assert_eq!(source.write(false), Err(SourceError::NotSettable));
    }

    #[test]
    fn test_digital_source_holds_last_level_on_error() {
        let pin = FlakyPin {
            levels: [Some(false), None, Some(true)],
            index: 0,
        };
        let mut source = DigitalSource::new(pin, true);
        assert!(!source.read());
        assert!(!source.read());
        assert!(source.read());
    }

    #[test]
    fn test_analog_source_failure_reports_rest_value() {
        let mut source = AxisSource::analog(FailingAdc);
        assert_eq!(source.read(), AXIS_REST_RAW);
        assert_eq!(source.write(0), Err(SourceError::NotSettable));
    }

    #[test]
    fn test_idle_sources() {
        let mut button: ButtonSource<NoPin> = ButtonSource::idle(true);
        assert!(button.read());
        let mut axis: AxisSource<NoPin> = AxisSource::idle();
        assert_eq!(axis.read(), AXIS_REST_RAW);
        axis.write(1234).unwrap();
        assert_eq!(axis.read(), 1234);
    }
}

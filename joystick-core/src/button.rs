//! Button input with active-level normalization, bypass and edge tracking.

use embedded_hal::digital::InputPin;

use crate::error::SourceError;
use crate::source::{ButtonSource, RawSource};

/// Button input bound to one digital or virtual source.
///
/// Edge history ([`was_pressed`](Self::was_pressed),
/// [`was_released`](Self::was_released)) only advances on
/// [`value`](Self::value). [`is_pressed`](Self::is_pressed) and
/// [`is_released`](Self::is_released) read the source without touching it,
/// so a polling loop should stick to one of the two paths per cycle.
pub struct Button<P> {
    source: ButtonSource<P>,
    active_low: bool,
    state: bool,
    last_state: bool,
    /// Report released regardless of the source.
    pub bypass: bool,
}

impl<P: InputPin> Button<P> {
    #[must_use]
    pub fn new(source: ButtonSource<P>, active_low: bool) -> Self {
        Self {
            source,
            active_low,
            state: false,
            last_state: false,
            bypass: false,
        }
    }

    /// Button on a digital pin.
    #[must_use]
    pub fn digital(pin: P, active_low: bool) -> Self {
        Self::new(ButtonSource::digital(pin, active_low), active_low)
    }

    /// Button on a virtual source, initially released.
    #[must_use]
    pub fn virtual_input(active_low: bool) -> Self {
        Self::new(ButtonSource::idle(active_low), active_low)
    }

    /// Read the source, advance edge history and return the reported state.
    ///
    /// Returns `false` while bypassed; edge history still advances.
    pub fn value(&mut self) -> bool {
        self.last_state = self.state;
        self.state = self.source.read() != self.active_low;
        self.state && !self.bypass
    }

    /// Logical pressed state, without touching edge history.
    pub fn is_pressed(&mut self) -> bool {
        self.source.read() != self.active_low
    }

    /// Logical released state, without touching edge history.
    pub fn is_released(&mut self) -> bool {
        self.source.read() == self.active_low
    }

    /// Released on the previous [`value`](Self::value) read, pressed on the latest.
    #[must_use]
    pub fn was_pressed(&self) -> bool {
        self.state && !self.last_state
    }

    /// Pressed on the previous [`value`](Self::value) read, released on the latest.
    #[must_use]
    pub fn was_released(&self) -> bool {
        !self.state && self.last_state
    }

    /// Raw source level, before active-level normalization.
    pub fn source_value(&mut self) -> bool {
        self.source.read()
    }

    /// Push a raw level into a virtual source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotSettable`] for digital pin sources.
    pub fn set_source_value(&mut self, value: bool) -> Result<(), SourceError> {
        self.source.write(value)
    }

    /// Whether the source accepts [`set_source_value`](Self::set_source_value).
    #[must_use]
    pub fn is_settable(&self) -> bool {
        self.source.is_settable()
    }

    #[must_use]
    pub fn active_low(&self) -> bool {
        self.active_low
    }

    #[must_use]
    pub fn source(&self) -> &ButtonSource<P> {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NoPin;

    fn press(button: &mut Button<NoPin>, pressed: bool) {
        let level = pressed != button.active_low();
        button.set_source_value(level).unwrap();
    }

    #[test]
    fn test_virtual_button_starts_released() {
        let mut b = Button::<NoPin>::virtual_input(true);
        assert!(!b.value());
        assert!(b.is_released());
        assert!(b.source_value());
    }

    #[test]
    fn test_active_low_normalization() {
        let mut b = Button::<NoPin>::virtual_input(true);
        b.set_source_value(false).unwrap();
        assert!(b.value());

        let mut b = Button::<NoPin>::virtual_input(false);
        b.set_source_value(true).unwrap();
        assert!(b.value());
    }

    #[test]
    fn test_edges_toggle_once_per_transition() {
        let mut b = Button::<NoPin>::virtual_input(true);
        b.value();

        press(&mut b, true);
        assert!(b.value());
        assert!(b.was_pressed());
        assert!(!b.was_released());

        assert!(b.value());
        assert!(!b.was_pressed());
        assert!(!b.was_released());

        press(&mut b, false);
        assert!(!b.value());
        assert!(!b.was_pressed());
        assert!(b.was_released());

        assert!(!b.value());
        assert!(!b.was_pressed());
        assert!(!b.was_released());
    }

    #[test]
    fn test_is_pressed_does_not_advance_edges() {
        let mut b = Button::<NoPin>::virtual_input(true);
        b.value();
        press(&mut b, true);
        assert!(b.is_pressed());
        assert!(!b.was_pressed());
        b.value();
        assert!(b.was_pressed());
    }

    #[test]
    fn test_bypass_reports_released_but_tracks_edges() {
        let mut b = Button::<NoPin>::virtual_input(true);
        b.bypass = true;
        b.value();
        press(&mut b, true);
        assert!(!b.value());
        assert!(b.was_pressed());
        assert!(b.is_pressed());
    }
}

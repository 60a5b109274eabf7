//! Hat switch input: four direction buttons resolved to one of nine positions.

use embedded_hal::digital::InputPin;

use crate::button::Button;
use crate::descriptor::MAX_HATS;
use crate::error::{RangeError, SourceError};

/// Angular hat switch position as reported over HID.
///
/// Values 0-7 step clockwise from up in 45 degree increments; 8 is the null
/// (idle) state.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HatPosition {
    Up = 0,
    UpRight = 1,
    Right = 2,
    DownRight = 3,
    Down = 4,
    DownLeft = 5,
    Left = 6,
    UpLeft = 7,
    #[default]
    Idle = 8,
}

impl HatPosition {
    /// Resolve four logical direction states.
    ///
    /// Evaluated top to bottom, first match wins: up+right, up+left, up,
    /// down+right, down+left, down, left, right, otherwise idle. Opposite
    /// pairs are not special-cased.
    #[must_use]
    pub const fn resolve(up: bool, down: bool, left: bool, right: bool) -> Self {
        if up && right {
            HatPosition::UpRight
        } else if up && left {
            HatPosition::UpLeft
        } else if up {
            HatPosition::Up
        } else if down && right {
            HatPosition::DownRight
        } else if down && left {
            HatPosition::DownLeft
        } else if down {
            HatPosition::Down
        } else if left {
            HatPosition::Left
        } else if right {
            HatPosition::Right
        } else {
            HatPosition::Idle
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for HatPosition {
    type Error = RangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => HatPosition::Up,
            1 => HatPosition::UpRight,
            2 => HatPosition::Right,
            3 => HatPosition::DownRight,
            4 => HatPosition::Down,
            5 => HatPosition::DownLeft,
            6 => HatPosition::Left,
            7 => HatPosition::UpLeft,
            8 => HatPosition::Idle,
            _ => return Err(RangeError::HatPosition(value)),
        })
    }
}

impl From<HatPosition> for u8 {
    fn from(position: HatPosition) -> Self {
        position.raw()
    }
}

/// Friendly names for hat switch wire indices, `H1` being index 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HatIndex {
    H1 = 0,
    H2 = 1,
    H3 = 2,
    H4 = 3,
}

impl HatIndex {
    /// Hat names in wire order.
    pub const ALL: [HatIndex; MAX_HATS] = [HatIndex::H1, HatIndex::H2, HatIndex::H3, HatIndex::H4];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl From<HatIndex> for usize {
    fn from(hat: HatIndex) -> Self {
        hat.index()
    }
}

/// Hat switch built from four [`Button`]s.
pub struct Hat<P> {
    /// Up direction input.
    pub up: Button<P>,
    /// Down direction input.
    pub down: Button<P>,
    /// Left direction input.
    pub left: Button<P>,
    /// Right direction input.
    pub right: Button<P>,
    active_low: bool,
    position: HatPosition,
    /// Report [`HatPosition::Idle`] regardless of the inputs.
    pub bypass: bool,
}

impl<P: InputPin> Hat<P> {
    /// Create a hat from four optional pins.
    ///
    /// Missing pins get a virtual source resting in the released state.
    #[must_use]
    pub fn new(
        up: Option<P>,
        down: Option<P>,
        left: Option<P>,
        right: Option<P>,
        active_low: bool,
    ) -> Self {
        let button = |pin: Option<P>| match pin {
            Some(pin) => Button::digital(pin, active_low),
            None => Button::virtual_input(active_low),
        };
        Self::from_buttons(
            button(up),
            button(down),
            button(left),
            button(right),
            active_low,
        )
    }

    /// Create a hat backed entirely by virtual sources.
    #[must_use]
    pub fn virtual_input(active_low: bool) -> Self {
        Self::new(None, None, None, None, active_low)
    }

    #[must_use]
    pub fn from_buttons(
        up: Button<P>,
        down: Button<P>,
        left: Button<P>,
        right: Button<P>,
        active_low: bool,
    ) -> Self {
        Self {
            up,
            down,
            left,
            right,
            active_low,
            position: HatPosition::Idle,
            bypass: false,
        }
    }

    /// Poll the four buttons and return the reported position.
    ///
    /// The buttons are polled even while bypassed so their edge history
    /// stays current; the reported position is then [`HatPosition::Idle`].
    pub fn value(&mut self) -> HatPosition {
        let position = self.update();
        if self.bypass {
            HatPosition::Idle
        } else {
            position
        }
    }

    /// Poll the four buttons and refresh the resolved position.
    pub fn update(&mut self) -> HatPosition {
        let up = self.up.value();
        let down = self.down.value();
        let left = self.left.value();
        let right = self.right.value();
        self.position = HatPosition::resolve(up, down, left, right);
        self.position
    }

    /// Position resolved by the latest poll.
    #[must_use]
    pub fn position(&self) -> HatPosition {
        self.position
    }

    /// Raw source levels packed as `0000RLDU` (bit 0 up, bit 3 right).
    pub fn packed_source_values(&mut self) -> u8 {
        (self.up.source_value() as u8)
            | (self.down.source_value() as u8) << 1
            | (self.left.source_value() as u8) << 2
            | (self.right.source_value() as u8) << 3
    }

    /// Load raw source levels from a `0000RLDU` nibble.
    ///
    /// Bits above the low nibble are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotSettable`] unless all four sources are
    /// virtual. Nothing is written in that case.
    pub fn unpack_source_values(&mut self, packed: u8) -> Result<(), SourceError> {
        if !(self.up.is_settable()
            && self.down.is_settable()
            && self.left.is_settable()
            && self.right.is_settable())
        {
            return Err(SourceError::NotSettable);
        }
        self.up.set_source_value(packed & 0x01 != 0)?;
        self.down.set_source_value(packed & 0x02 != 0)?;
        self.left.set_source_value(packed & 0x04 != 0)?;
        self.right.set_source_value(packed & 0x08 != 0)?;
        Ok(())
    }

    #[must_use]
    pub fn active_low(&self) -> bool {
        self.active_low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NoPin;

    #[test]
    fn test_hat_index_names() {
        assert_eq!(HatIndex::H1.index(), 0);
        assert_eq!(usize::from(HatIndex::H4), 3);
        for (i, hat) in HatIndex::ALL.iter().enumerate() {
            assert_eq!(hat.index(), i);
        }
    }

    /// Set logical direction states on an active-low virtual hat.
    fn set(hat: &mut Hat<NoPin>, up: bool, down: bool, left: bool, right: bool) {
        let packed = (up as u8) | (down as u8) << 1 | (left as u8) << 2 | (right as u8) << 3;
        // active low: pressed reads low
        hat.unpack_source_values(!packed & 0x0F).unwrap();
    }

    #[test]
    fn test_idle_when_nothing_pressed() {
        let mut hat = Hat::<NoPin>::virtual_input(true);
        assert_eq!(hat.value(), HatPosition::Idle);
    }

    #[test]
    fn test_single_directions() {
        let mut hat = Hat::<NoPin>::virtual_input(true);
        set(&mut hat, true, false, false, false);
        assert_eq!(hat.value(), HatPosition::Up);
        set(&mut hat, false, true, false, false);
        assert_eq!(hat.value(), HatPosition::Down);
        set(&mut hat, false, false, true, false);
        assert_eq!(hat.value(), HatPosition::Left);
        set(&mut hat, false, false, false, true);
        assert_eq!(hat.value(), HatPosition::Right);
    }

    #[test]
    fn test_diagonals() {
        let mut hat = Hat::<NoPin>::virtual_input(true);
        set(&mut hat, true, false, false, true);
        assert_eq!(hat.value(), HatPosition::UpRight);
        set(&mut hat, true, false, true, false);
        assert_eq!(hat.value(), HatPosition::UpLeft);
        set(&mut hat, false, true, false, true);
        assert_eq!(hat.value(), HatPosition::DownRight);
        set(&mut hat, false, true, true, false);
        assert_eq!(hat.value(), HatPosition::DownLeft);
    }

    #[test]
    fn test_opposite_pairs_fall_through() {
        assert_eq!(HatPosition::resolve(true, true, false, false), HatPosition::Up);
        assert_eq!(HatPosition::resolve(false, false, true, true), HatPosition::Left);
        assert_eq!(HatPosition::resolve(true, true, true, true), HatPosition::UpRight);
        assert_eq!(HatPosition::resolve(false, true, true, true), HatPosition::DownRight);
    }

    #[test]
    fn test_bypass_forces_idle_but_polls_buttons() {
        let mut hat = Hat::<NoPin>::virtual_input(true);
        hat.value();
        hat.bypass = true;
        set(&mut hat, true, false, false, true);
        assert_eq!(hat.value(), HatPosition::Idle);
        assert_eq!(hat.position(), HatPosition::UpRight);
        assert!(hat.up.was_pressed());
        assert!(hat.right.was_pressed());
        assert!(!hat.down.was_pressed());
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        let mut hat = Hat::<NoPin>::virtual_input(true);
        for nibble in 0..16u8 {
            hat.unpack_source_values(nibble).unwrap();
            assert_eq!(hat.packed_source_values(), nibble);
        }
    }

    #[test]
    fn test_unpack_ignores_high_bits() {
        let mut hat = Hat::<NoPin>::virtual_input(false);
        hat.unpack_source_values(0xF1).unwrap();
        assert_eq!(hat.packed_source_values(), 0x01);
        assert_eq!(hat.value(), HatPosition::Up);
    }

    #[test]
    fn test_position_try_from() {
        assert_eq!(HatPosition::try_from(3), Ok(HatPosition::DownRight));
        assert_eq!(HatPosition::try_from(8), Ok(HatPosition::Idle));
        assert_eq!(HatPosition::try_from(9), Err(RangeError::HatPosition(9)));
        assert_eq!(u8::from(HatPosition::UpLeft), 7);
    }
}

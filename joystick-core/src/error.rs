//! Error types shared by the input model, descriptor builder and joystick.

/// Invalid configuration detected at setup time.
///
/// Always fatal: the call that raised it had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Axis count outside 0-8.
    TooManyAxes,
    /// Button count outside 0-128.
    TooManyButtons,
    /// Hat switch count outside 0-4.
    TooManyHats,
    /// Axis `min` is not strictly below `max`.
    DegenerateAxisRange,
    /// Axis deadband leaves no usable travel on either side of the midpoint.
    DeadbandTooLarge,
    /// More inputs registered than the configured capacity.
    CapacityExceeded,
}

/// An index or value handed to an `update_*`/`stage_*` call is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeError {
    /// Axis index not below the configured axis count.
    AxisIndex(usize),
    /// Button index not below the configured button count.
    ButtonIndex(usize),
    /// Hat index not below the configured hat count.
    HatIndex(usize),
    /// Hat position above 8.
    HatPosition(u8),
}

/// Error reported by a [`ReportTransport`](crate::ReportTransport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The link rejected the report after accepting it for sending.
    Io,
    /// Host link down, e.g. before enumeration or after a bus reset.
    NotReady,
    /// Report (plus any prefix) does not fit the transport's packet.
    Dropped,
}

/// Error from a raw input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    /// Only virtual sources accept pushed values.
    NotSettable,
}

/// Any error surfaced by [`Joystick`](crate::Joystick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoystickError {
    Config(ConfigError),
    Range(RangeError),
    Transport(TransportError),
    Source(SourceError),
}

impl From<ConfigError> for JoystickError {
    fn from(err: ConfigError) -> Self {
        JoystickError::Config(err)
    }
}

impl From<RangeError> for JoystickError {
    fn from(err: RangeError) -> Self {
        JoystickError::Range(err)
    }
}

impl From<TransportError> for JoystickError {
    fn from(err: TransportError) -> Self {
        JoystickError::Transport(err)
    }
}

impl From<SourceError> for JoystickError {
    fn from(err: SourceError) -> Self {
        JoystickError::Source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry_later(err: TransportError) -> bool {
        match err {
            TransportError::NotReady => true,
            TransportError::Io | TransportError::Dropped => false,
        }
    }

    #[test]
    fn test_transport_errors_compose() {
        assert!(retry_later(TransportError::NotReady));
        assert!(!retry_later(TransportError::Dropped));
        assert_eq!(
            JoystickError::from(TransportError::Dropped),
            JoystickError::Transport(TransportError::Dropped)
        );
    }
}

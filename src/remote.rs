//! UART link to a remote throttle board.
//!
//! Once per poll cycle the stick board sends a request frame and waits for
//! the throttle's state frame. The raw values are pushed into virtual inputs
//! bound at fixed wire offsets, so calibration and active levels are applied
//! on this side exactly as for local inputs.

use defmt::{debug, Format};
use embassy_rp::uart::{Async, Uart};
use embassy_time::{with_timeout, Duration};
use embedded_hal::digital::InputPin;
use hotas_proto::{
    encode_request, FrameError, RemoteState, StateReader, REMOTE_AXES, REMOTE_BUTTONS,
    REMOTE_HATS,
};
use joystick_core::{AnalogRead, HatIndex, Joystick, JoystickError, ReportTransport};

/// Failure to obtain a state frame from the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum RemoteError {
    /// UART read or write failed.
    Io,
    /// No complete frame within the poll timeout.
    Timeout,
    /// A frame arrived but failed validation.
    Frame(FrameError),
}

impl From<FrameError> for RemoteError {
    fn from(err: FrameError) -> Self {
        RemoteError::Frame(err)
    }
}

/// Wire indices of the first virtual input fed by the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct RemoteMapping {
    pub first_button: usize,
    pub first_axis: usize,
    pub first_hat: usize,
}

impl RemoteMapping {
    /// Throttle inputs after 16 local buttons, 4 local axes and 2 local hats.
    pub const DEFAULT: Self = Self {
        first_button: 16,
        first_axis: 4,
        first_hat: HatIndex::H3.index(),
    };
}

impl Default for RemoteMapping {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Request/response client for the throttle board.
pub struct RemoteThrottle<'d> {
    uart: Uart<'d, Async>,
    reader: StateReader,
    timeout: Duration,
}

impl<'d> RemoteThrottle<'d> {
    /// Create a client. `timeout` bounds each request/response exchange.
    #[must_use]
    pub fn new(uart: Uart<'d, Async>, timeout: Duration) -> Self {
        Self {
            uart,
            reader: StateReader::new(),
            timeout,
        }
    }

    /// Request the throttle state and wait for the answer.
    pub async fn poll(&mut self) -> Result<RemoteState, RemoteError> {
        self.uart
            .write(&encode_request())
            .await
            .map_err(|_| RemoteError::Io)?;

        self.reader.reset();
        let timeout = self.timeout;
        match with_timeout(timeout, self.read_frame()).await {
            Ok(result) => result,
            Err(_) => {
                debug!("Throttle did not answer within {} ms", timeout.as_millis());
                Err(RemoteError::Timeout)
            }
        }
    }

    async fn read_frame(&mut self) -> Result<RemoteState, RemoteError> {
        let mut byte_buf = [0u8; 1];

        loop {
            self.uart
                .read(&mut byte_buf)
                .await
                .map_err(|_| RemoteError::Io)?;

            if let Some(frame) = self.reader.push(byte_buf[0]) {
                return Ok(frame?);
            }
        }
    }
}

/// Push raw throttle values into the joystick's virtual inputs.
///
/// Inputs that are not bound at the mapped indices are skipped.
///
/// # Errors
///
/// Returns [`JoystickError::Source`] if a mapped input is not virtual.
pub fn apply_remote_state<T, P, A>(
    joystick: &mut Joystick<T, P, A>,
    state: &RemoteState,
    mapping: &RemoteMapping,
) -> Result<(), JoystickError>
where
    T: ReportTransport,
    P: InputPin,
    A: AnalogRead,
{
    for i in 0..REMOTE_BUTTONS {
        if let Some(button) = joystick.button_mut(mapping.first_button + i) {
            button.set_source_value(state.button(i))?;
        }
    }
    for (i, &raw) in state.axes.iter().enumerate().take(REMOTE_AXES) {
        if let Some(axis) = joystick.axis_mut(mapping.first_axis + i) {
            axis.set_source_value(raw)?;
        }
    }
    for i in 0..REMOTE_HATS {
        if let Some(hat) = joystick.hat_mut(mapping.first_hat + i) {
            hat.unpack_source_values(state.hat(i))?;
        }
    }
    Ok(())
}

//! Joystick: owns bound inputs and drives the report encoder and transport.

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::axis::Axis;
use crate::button::Button;
use crate::config::JoystickConfig;
use crate::descriptor::{MAX_AXES, MAX_BUTTONS, MAX_HATS};
use crate::error::{ConfigError, JoystickError, RangeError, TransportError};
use crate::hat::{Hat, HatPosition};
use crate::report::ReportEncoder;
use crate::source::{AnalogRead, NoPin};
use crate::transport::ReportTransport;

/// A configurable HID joystick.
///
/// Inputs are bound with [`add_axis`](Self::add_axis),
/// [`add_button`](Self::add_button) and [`add_hat`](Self::add_hat); the order
/// of binding is the wire index. [`update`](Self::update) polls every bound
/// input and sends one report if anything changed.
///
/// Canonical state can also be driven directly, in two phases: `stage_*`
/// calls validate and apply changes without sending, [`commit`](Self::commit)
/// packs the report and sends it if it differs from the last one sent. The
/// `update_*` calls do both.
///
/// # Type Parameters
///
/// - `T`: report transport
/// - `P`: digital pin type used by buttons and hat switches
/// - `A`: analog channel type used by axes
pub struct Joystick<T, P = NoPin, A = NoPin> {
    transport: T,
    config: JoystickConfig,
    encoder: ReportEncoder,
    axes: Vec<Axis<A>, MAX_AXES>,
    buttons: Vec<Button<P>, MAX_BUTTONS>,
    hats: Vec<Hat<P>, MAX_HATS>,
}

impl<T, P, A> Joystick<T, P, A>
where
    T: ReportTransport,
    P: InputPin,
    A: AnalogRead,
{
    /// Create a joystick with every input at rest and announce that state.
    ///
    /// If the initial report cannot be sent, waits
    /// [`JoystickConfig::retry_delay_ms`] and tries exactly once more.
    ///
    /// # Errors
    ///
    /// - [`JoystickError::Config`] if the counts in `config` are out of range
    /// - [`JoystickError::Transport`] if the retry fails as well
    pub async fn new<D: DelayNs>(
        config: JoystickConfig,
        transport: T,
        delay: &mut D,
    ) -> Result<Self, JoystickError> {
        let layout = config.layout()?;
        let mut joystick = Self {
            transport,
            config,
            encoder: ReportEncoder::new(layout),
            axes: Vec::new(),
            buttons: Vec::new(),
            hats: Vec::new(),
        };

        if let Err(err) = joystick.reset_all().await {
            warn!(
                "Initial report failed: {:?}, retrying in {} ms",
                err, config.retry_delay_ms
            );
            delay.delay_ms(config.retry_delay_ms).await;
            joystick.reset_all().await?;
        }

        info!(
            "Joystick ready: {} axes, {} buttons, {} hats",
            config.axes, config.buttons, config.hats
        );
        Ok(joystick)
    }

    /// Bind an axis at the next free axis index and return that index.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CapacityExceeded`] once every configured axis
    /// is bound. Existing bindings are left as they were.
    pub fn add_axis(&mut self, axis: Axis<A>) -> Result<usize, ConfigError> {
        let index = self.axes.len();
        if index >= self.config.axes {
            return Err(ConfigError::CapacityExceeded);
        }
        self.axes
            .push(axis)
            .map_err(|_| ConfigError::CapacityExceeded)?;
        Ok(index)
    }

    /// Bind a button at the next free button index and return that index.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CapacityExceeded`] once every configured button
    /// is bound.
    pub fn add_button(&mut self, button: Button<P>) -> Result<usize, ConfigError> {
        let index = self.buttons.len();
        if index >= self.config.buttons {
            return Err(ConfigError::CapacityExceeded);
        }
        self.buttons
            .push(button)
            .map_err(|_| ConfigError::CapacityExceeded)?;
        Ok(index)
    }

    /// Bind a hat switch at the next free hat index and return that index.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CapacityExceeded`] once every configured hat
    /// is bound.
    pub fn add_hat(&mut self, hat: Hat<P>) -> Result<usize, ConfigError> {
        let index = self.hats.len();
        if index >= self.config.hats {
            return Err(ConfigError::CapacityExceeded);
        }
        self.hats
            .push(hat)
            .map_err(|_| ConfigError::CapacityExceeded)?;
        Ok(index)
    }

    /// Stage axis values without sending.
    ///
    /// All pairs are validated before any is applied.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::AxisIndex`] for the first index outside the
    /// configured axis count.
    pub fn stage_axes(&mut self, axes: &[(usize, u8)]) -> Result<(), RangeError> {
        for &(index, _) in axes {
            self.encoder.check_axis(index)?;
        }
        for &(index, value) in axes {
            self.encoder.set_axis(index, value)?;
        }
        Ok(())
    }

    /// Stage button states without sending.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::ButtonIndex`] for the first index outside the
    /// configured button count.
    pub fn stage_buttons(&mut self, buttons: &[(usize, bool)]) -> Result<(), RangeError> {
        for &(index, _) in buttons {
            self.encoder.check_button(index)?;
        }
        for &(index, pressed) in buttons {
            self.encoder.set_button(index, pressed)?;
        }
        Ok(())
    }

    /// Stage hat switch positions (0-8) without sending.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::HatIndex`] or [`RangeError::HatPosition`] for
    /// the first invalid pair.
    pub fn stage_hats(&mut self, hats: &[(usize, u8)]) -> Result<(), RangeError> {
        for &(index, position) in hats {
            self.encoder.check_hat(index)?;
            HatPosition::try_from(position)?;
        }
        for &(index, position) in hats {
            self.encoder.set_hat(index, HatPosition::try_from(position)?)?;
        }
        Ok(())
    }

    /// Pack the current state and send it if it differs from the last report.
    ///
    /// Returns `true` if a report was sent.
    ///
    /// # Errors
    ///
    /// Propagates the transport error. The failed report is not recorded as
    /// sent, so the next commit tries again.
    pub async fn commit(&mut self) -> Result<bool, TransportError> {
        self.flush(false).await
    }

    /// Pack and send the current state even if it matches the last report.
    pub async fn commit_always(&mut self) -> Result<(), TransportError> {
        self.flush(true).await.map(|_| ())
    }

    async fn flush(&mut self, always: bool) -> Result<bool, TransportError> {
        let Some(report) = self.encoder.prepare(always) else {
            return Ok(false);
        };

        let result = self.transport.send(report).await;
        match result {
            Ok(()) => {
                self.encoder.mark_sent();
                trace!("Report sent ({} bytes)", self.encoder.layout().report_len());
                Ok(true)
            }
            Err(err) => {
                warn!("Report send failed: {:?}", err);
                Err(err)
            }
        }
    }

    /// Set axis values and send.
    ///
    /// # Errors
    ///
    /// Range errors are reported before anything changes; transport errors
    /// after the state has been applied.
    pub async fn update_axes(&mut self, axes: &[(usize, u8)]) -> Result<bool, JoystickError> {
        self.stage_axes(axes)?;
        Ok(self.commit().await?)
    }

    /// Set button states and send.
    pub async fn update_buttons(
        &mut self,
        buttons: &[(usize, bool)],
    ) -> Result<bool, JoystickError> {
        self.stage_buttons(buttons)?;
        Ok(self.commit().await?)
    }

    /// Set hat switch positions (0-8) and send.
    pub async fn update_hats(&mut self, hats: &[(usize, u8)]) -> Result<bool, JoystickError> {
        self.stage_hats(hats)?;
        Ok(self.commit().await?)
    }

    /// Poll every bound input and send one report if anything changed.
    ///
    /// Axes are read first, then buttons, then hat switches, each in index
    /// order, followed by exactly one commit.
    pub async fn update(&mut self) -> Result<bool, JoystickError> {
        for (index, axis) in self.axes.iter_mut().enumerate() {
            self.encoder.set_axis(index, axis.value())?;
        }
        for (index, button) in self.buttons.iter_mut().enumerate() {
            self.encoder.set_button(index, button.value())?;
        }
        for (index, hat) in self.hats.iter_mut().enumerate() {
            self.encoder.set_hat(index, hat.value())?;
        }
        Ok(self.commit().await?)
    }

    /// Put every input at rest and send unconditionally.
    pub async fn reset_all(&mut self) -> Result<(), TransportError> {
        self.encoder.reset();
        self.commit_always().await
    }

    /// Press the given buttons and send.
    pub async fn press_buttons(&mut self, buttons: &[usize]) -> Result<bool, JoystickError> {
        self.set_buttons(buttons, true)?;
        Ok(self.commit().await?)
    }

    /// Release the given buttons and send.
    pub async fn release_buttons(&mut self, buttons: &[usize]) -> Result<bool, JoystickError> {
        self.set_buttons(buttons, false)?;
        Ok(self.commit().await?)
    }

    /// Release every button and send.
    pub async fn release_all_buttons(&mut self) -> Result<bool, TransportError> {
        self.encoder.clear_buttons();
        self.commit().await
    }

    /// Press, send, release, send.
    pub async fn click_buttons(&mut self, buttons: &[usize]) -> Result<(), JoystickError> {
        self.press_buttons(buttons).await?;
        self.release_buttons(buttons).await?;
        Ok(())
    }

    fn set_buttons(&mut self, buttons: &[usize], pressed: bool) -> Result<(), RangeError> {
        for &index in buttons {
            self.encoder.check_button(index)?;
        }
        for &index in buttons {
            self.encoder.set_button(index, pressed)?;
        }
        Ok(())
    }
}

impl<T, P, A> Joystick<T, P, A> {
    #[must_use]
    pub fn config(&self) -> &JoystickConfig {
        &self.config
    }

    /// Configured axis count.
    #[must_use]
    pub fn num_axes(&self) -> usize {
        self.config.axes
    }

    /// Configured button count.
    #[must_use]
    pub fn num_buttons(&self) -> usize {
        self.config.buttons
    }

    /// Configured hat switch count.
    #[must_use]
    pub fn num_hats(&self) -> usize {
        self.config.hats
    }

    /// Bound axes in wire order.
    #[must_use]
    pub fn axes(&self) -> &[Axis<A>] {
        &self.axes
    }

    /// Bound buttons in wire order.
    #[must_use]
    pub fn buttons(&self) -> &[Button<P>] {
        &self.buttons
    }

    /// Bound hat switches in wire order.
    #[must_use]
    pub fn hats(&self) -> &[Hat<P>] {
        &self.hats
    }

    pub fn axis_mut(&mut self, index: usize) -> Option<&mut Axis<A>> {
        self.axes.get_mut(index)
    }

    pub fn button_mut(&mut self, index: usize) -> Option<&mut Button<P>> {
        self.buttons.get_mut(index)
    }

    pub fn hat_mut(&mut self, index: usize) -> Option<&mut Hat<P>> {
        self.hats.get_mut(index)
    }

    /// Canonical axis value (128 at rest).
    #[must_use]
    pub fn axis_value(&self, index: usize) -> Option<u8> {
        self.encoder.axis(index)
    }

    /// Canonical button state.
    #[must_use]
    pub fn button_value(&self, index: usize) -> Option<bool> {
        self.encoder.button(index)
    }

    /// Canonical hat switch position.
    #[must_use]
    pub fn hat_value(&self, index: usize) -> Option<HatPosition> {
        self.encoder.hat(index)
    }

    #[must_use]
    pub fn encoder(&self) -> &ReportEncoder {
        &self.encoder
    }

    /// Last report that reached the host.
    #[must_use]
    pub fn last_report(&self) -> Option<&[u8]> {
        self.encoder.last_sent()
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Decompose the joystick, returning its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::axis::AxisConfig;
    use crate::hat::HatIndex;
    use crate::report::AXIS_IDLE;
    use embassy_futures::block_on;
    use std::vec;
    use std::vec::Vec as StdVec;

    #[derive(Default)]
    struct MockTransport {
        sent: StdVec<StdVec<u8>>,
        failures: usize,
    }

    impl ReportTransport for MockTransport {
        async fn send(&mut self, report: &[u8]) -> Result<(), TransportError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(TransportError::NotReady);
            }
            self.sent.push(report.to_vec());
            Ok(())
        }

        fn is_ready(&self) -> bool {
            self.failures == 0
        }
    }

    #[derive(Default)]
    struct MockDelay {
        calls: StdVec<u32>,
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, _ns: u32) {}

        async fn delay_ms(&mut self, ms: u32) {
            self.calls.push(ms);
        }
    }

    type TestJoystick = Joystick<MockTransport>;

    fn joystick(axes: usize, buttons: usize, hats: usize) -> TestJoystick {
        let mut delay = MockDelay::default();
        block_on(Joystick::new(
            JoystickConfig::new(axes, buttons, hats),
            MockTransport::default(),
            &mut delay,
        ))
        .unwrap()
    }

    fn sent(js: &TestJoystick) -> &[StdVec<u8>] {
        &js.transport().sent
    }

    #[test]
    fn test_new_sends_rest_report() {
        let js = joystick(2, 2, 1);
        assert_eq!(sent(&js), &[vec![128, 128, 0x08, 0x00]]);
        assert_eq!(js.last_report(), Some(&[128u8, 128, 0x08, 0x00][..]));
    }

    #[test]
    fn test_new_retries_once_after_delay() {
        let mut delay = MockDelay::default();
        let transport = MockTransport {
            failures: 1,
            ..Default::default()
        };
        let js: TestJoystick = block_on(Joystick::new(
            JoystickConfig::new(1, 0, 0).with_retry_delay_ms(250),
            transport,
            &mut delay,
        ))
        .unwrap();
        assert_eq!(delay.calls, [250]);
        assert_eq!(sent(&js).len(), 1);
    }

    #[test]
    fn test_new_fails_after_second_error() {
        let mut delay = MockDelay::default();
        let transport = MockTransport {
            failures: 2,
            ..Default::default()
        };
        let result: Result<TestJoystick, _> = block_on(Joystick::new(
            JoystickConfig::new(1, 0, 0),
            transport,
            &mut delay,
        ));
        assert!(matches!(
            result,
            Err(JoystickError::Transport(TransportError::NotReady))
        ));
        assert_eq!(delay.calls, [1000]);
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let mut delay = MockDelay::default();
        let result: Result<TestJoystick, _> = block_on(Joystick::new(
            JoystickConfig::new(9, 0, 0),
            MockTransport::default(),
            &mut delay,
        ));
        assert!(matches!(
            result,
            Err(JoystickError::Config(ConfigError::TooManyAxes))
        ));
    }

    #[test]
    fn test_capacity_overflow_keeps_existing_bindings() {
        let mut js = joystick(1, 2, 1);
        assert_eq!(js.add_button(Button::virtual_input(true)), Ok(0));
        assert_eq!(js.add_button(Button::virtual_input(false)), Ok(1));
        assert_eq!(
            js.add_button(Button::virtual_input(true)),
            Err(ConfigError::CapacityExceeded)
        );
        assert_eq!(js.buttons().len(), 2);
        assert!(!js.buttons()[1].active_low());

        assert_eq!(
            js.add_axis(Axis::virtual_input(AxisConfig::default()).unwrap()),
            Ok(0)
        );
        assert!(js
            .add_axis(Axis::virtual_input(AxisConfig::default()).unwrap())
            .is_err());
        assert_eq!(js.add_hat(Hat::virtual_input(true)), Ok(0));
        assert_eq!(
            js.add_hat(Hat::virtual_input(true)),
            Err(ConfigError::CapacityExceeded)
        );
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut js = joystick(1, 1, 0);
        js.add_axis(Axis::virtual_input(AxisConfig::default()).unwrap())
            .unwrap();
        js.add_button(Button::virtual_input(true)).unwrap();

        js.axis_mut(0).unwrap().set_source_value(0).unwrap();
        assert_eq!(block_on(js.update()), Ok(true));
        assert_eq!(block_on(js.update()), Ok(false));
        assert_eq!(sent(&js).len(), 2);
        assert_eq!(sent(&js)[1], [0, 0]);
    }

    #[test]
    fn test_update_polls_all_inputs() {
        let mut js = joystick(2, 3, 2);
        js.add_axis(Axis::virtual_input(AxisConfig::default()).unwrap())
            .unwrap();
        js.add_axis(
            Axis::virtual_input(AxisConfig::default().with_invert(true)).unwrap(),
        )
        .unwrap();
        for _ in 0..3 {
            js.add_button(Button::virtual_input(true)).unwrap();
        }
        js.add_hat(Hat::virtual_input(true)).unwrap();

        js.axis_mut(0).unwrap().set_source_value(65535).unwrap();
        js.axis_mut(1).unwrap().set_source_value(65535).unwrap();
        js.button_mut(2).unwrap().set_source_value(false).unwrap();
        // up + right pressed (active low)
        js.hat_mut(0).unwrap().unpack_source_values(0b0110).unwrap();

        assert_eq!(block_on(js.update()), Ok(true));
        // hat 1 is unbound and stays idle
        assert_eq!(sent(&js).last().unwrap(), &[255, 0, 0x81, 0b100]);
        assert_eq!(js.hat_value(HatIndex::H1.index()), Some(HatPosition::UpRight));
        assert_eq!(js.hat_value(HatIndex::H2.index()), Some(HatPosition::Idle));
        assert_eq!(js.button_value(2), Some(true));
    }

    #[test]
    fn test_staged_changes_send_once() {
        let mut js = joystick(2, 8, 1);
        js.stage_axes(&[(0, 10), (1, 20)]).unwrap();
        js.stage_buttons(&[(7, true)]).unwrap();
        js.stage_hats(&[(0, 4)]).unwrap();
        assert_eq!(sent(&js).len(), 1);
        assert_eq!(block_on(js.commit()), Ok(true));
        assert_eq!(sent(&js).len(), 2);
        assert_eq!(sent(&js)[1], [10, 20, 0x04, 0x80]);
        assert_eq!(block_on(js.commit()), Ok(false));
    }

    #[test]
    fn test_range_errors_leave_state_untouched() {
        let mut js = joystick(2, 8, 1);
        assert_eq!(
            block_on(js.update_axes(&[(0, 1), (2, 1)])),
            Err(JoystickError::Range(RangeError::AxisIndex(2)))
        );
        assert_eq!(js.axis_value(0), Some(AXIS_IDLE));
        assert_eq!(
            block_on(js.update_buttons(&[(8, true)])),
            Err(JoystickError::Range(RangeError::ButtonIndex(8)))
        );
        assert_eq!(
            block_on(js.update_hats(&[(0, 9)])),
            Err(JoystickError::Range(RangeError::HatPosition(9)))
        );
        assert_eq!(
            block_on(js.update_hats(&[(1, 0)])),
            Err(JoystickError::Range(RangeError::HatIndex(1)))
        );
        assert_eq!(js.hat_value(0), Some(HatPosition::Idle));
        assert_eq!(sent(&js).len(), 1);
    }

    #[test]
    fn test_no_inputs_configured() {
        let mut js = joystick(0, 0, 0);
        assert_eq!(
            block_on(js.update_axes(&[(0, 0)])),
            Err(JoystickError::Range(RangeError::AxisIndex(0)))
        );
        assert_eq!(sent(&js), &[StdVec::<u8>::new()]);
    }

    #[test]
    fn test_reset_all_always_sends() {
        let mut js = joystick(1, 0, 0);
        block_on(js.reset_all()).unwrap();
        block_on(js.reset_all()).unwrap();
        assert_eq!(sent(&js).len(), 3);
    }

    #[test]
    fn test_failed_send_is_retried_on_next_commit() {
        let mut js = joystick(1, 0, 0);
        js.transport_mut().failures = 1;
        assert_eq!(
            block_on(js.update_axes(&[(0, 5)])),
            Err(JoystickError::Transport(TransportError::NotReady))
        );
        assert_eq!(block_on(js.commit()), Ok(true));
        assert_eq!(sent(&js).last().unwrap(), &[5]);
    }

    #[test]
    fn test_button_helpers() {
        let mut js = joystick(0, 16, 0);
        block_on(js.press_buttons(&[0, 9])).unwrap();
        assert_eq!(sent(&js).last().unwrap(), &[0x01, 0x02]);
        block_on(js.release_buttons(&[0])).unwrap();
        assert_eq!(sent(&js).last().unwrap(), &[0x00, 0x02]);
        block_on(js.release_all_buttons()).unwrap();
        assert_eq!(sent(&js).last().unwrap(), &[0x00, 0x00]);

        block_on(js.click_buttons(&[15])).unwrap();
        let n = sent(&js).len();
        assert_eq!(sent(&js)[n - 2], [0x00, 0x80]);
        assert_eq!(sent(&js)[n - 1], [0x00, 0x00]);

        assert!(block_on(js.press_buttons(&[16])).is_err());
    }

    #[test]
    fn test_bypassed_inputs_report_rest() {
        let mut js = joystick(1, 1, 1);
        js.add_axis(Axis::virtual_input(AxisConfig::default()).unwrap())
            .unwrap();
        js.add_button(Button::virtual_input(true)).unwrap();
        js.add_hat(Hat::virtual_input(true)).unwrap();

        js.axis_mut(0).unwrap().set_source_value(0).unwrap();
        js.button_mut(0).unwrap().set_source_value(false).unwrap();
        js.hat_mut(0).unwrap().unpack_source_values(0b1110).unwrap();
        js.axis_mut(0).unwrap().bypass = true;
        js.button_mut(0).unwrap().bypass = true;
        js.hat_mut(0).unwrap().bypass = true;

        assert_eq!(block_on(js.update()), Ok(false));
        assert!(js.button_mut(0).unwrap().was_pressed());
        assert!(js.hat_mut(0).unwrap().up.was_pressed());
    }
}

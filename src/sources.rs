//! RP2040 analog sources for joystick axes.
//!
//! Buttons and hat switches use [`embassy_rp::gpio::Input`] directly, which
//! already implements [`embedded_hal::digital::InputPin`]. Axes read ADC
//! channels through [`AdcChannel`]; all channels share the one converter.

use core::cell::RefCell;

use embassy_rp::adc::{self, Adc, Blocking, Channel};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use joystick_core::AnalogRead;

/// The RP2040 ADC, shared by every axis channel.
pub type SharedAdc = Mutex<CriticalSectionRawMutex, RefCell<Adc<'static, Blocking>>>;

/// One ADC input pin, scaled from 12 to 16 bits.
pub struct AdcChannel {
    adc: &'static SharedAdc,
    channel: Channel<'static>,
}

impl AdcChannel {
    pub fn new(adc: &'static SharedAdc, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AnalogRead for AdcChannel {
    type Error = adc::Error;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        let channel = &mut self.channel;
        let raw = self
            .adc
            .lock(|adc| adc.borrow_mut().blocking_read(channel))?;
        Ok(raw << 4)
    }
}

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::{UART1, USB};
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Duration, Ticker};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use joystick_xl::{
    build, configure_usb_hid, AdcChannel, Axis, AxisConfig, Button, Hat, Joystick,
    JoystickConfig, JoystickError, ReportDescriptor, SharedAdc, UsbHidTransport,
    JOYSTICK_REPORT_ID,
};
use static_cell::StaticCell;

#[cfg(feature = "remote-throttle")]
use embassy_rp::uart::{Config as UartConfig, Uart};
#[cfg(feature = "remote-throttle")]
use joystick_xl::{apply_remote_state, RemoteMapping, RemoteThrottle};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// 4 local + 4 throttle axes, 16 local + 16 throttle buttons, 2 local + 2 throttle hats.
const JOYSTICK: JoystickConfig = JoystickConfig::new(8, 32, 4);

/// Calibration shared by every axis.
const AXIS: AxisConfig = AxisConfig::new().with_range(250, 65285).with_deadband(2500);

/// Input poll period.
const POLL_PERIOD: Duration = Duration::from_millis(5);

/// Throttle request/response budget.
#[cfg(feature = "remote-throttle")]
const REMOTE_TIMEOUT: Duration = Duration::from_millis(10);

type HidJoystick = Joystick<UsbHidTransport<'static>, Input<'static>, AdcChannel>;

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state and the generated report descriptor.
static HID_STATE: StaticCell<State> = StaticCell::new();
static REPORT_DESCRIPTOR: StaticCell<ReportDescriptor> = StaticCell::new();

/// ADC shared by the analog axes.
static ADC: StaticCell<SharedAdc> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("JoystickXL starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let descriptor = match build(JOYSTICK.axes, JOYSTICK.buttons, JOYSTICK.hats) {
        Ok(descriptor) => REPORT_DESCRIPTOR.init(descriptor),
        Err(e) => {
            error!("Invalid joystick configuration: {:?}", e);
            return;
        }
    };

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("JoystickXL");
    usb_config.product = Some("JoystickXL HOTAS");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    let hid_state = HID_STATE.init(State::new());
    let hid_writer = configure_usb_hid(&mut builder, hid_state, descriptor);
    let usb_device = builder.build();

    spawner.spawn(usb_task(usb_device).unwrap());

    // --- Local inputs ---
    let adc = ADC.init(Mutex::new(RefCell::new(Adc::new_blocking(
        p.ADC,
        adc::Config::default(),
    ))));
    let axes = [
        AdcChannel::new(adc, Channel::new_pin(p.PIN_26, Pull::None)),
        AdcChannel::new(adc, Channel::new_pin(p.PIN_27, Pull::None)),
        AdcChannel::new(adc, Channel::new_pin(p.PIN_28, Pull::None)),
    ];
    let buttons = [
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_13, Pull::Up),
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
        Input::new(p.PIN_16, Pull::Up),
        Input::new(p.PIN_17, Pull::Up),
        Input::new(p.PIN_18, Pull::Up),
        Input::new(p.PIN_19, Pull::Up),
    ];
    let hat = Hat::new(
        Some(Input::new(p.PIN_0, Pull::Up)),
        Some(Input::new(p.PIN_1, Pull::Up)),
        Some(Input::new(p.PIN_20, Pull::Up)),
        Some(Input::new(p.PIN_21, Pull::Up)),
        true,
    );

    #[cfg(feature = "remote-throttle")]
    let mut throttle = {
        let mut uart_config = UartConfig::default();
        uart_config.baudrate = hotas_proto::HOTAS_BAUDRATE;
        let uart = Uart::new(
            p.UART1,
            p.PIN_8, // TX
            p.PIN_9, // RX
            Irqs,
            p.DMA_CH0,
            p.DMA_CH1,
            uart_config,
        );
        RemoteThrottle::new(uart, REMOTE_TIMEOUT)
    };

    // --- Joystick ---
    let mut transport = UsbHidTransport::new(hid_writer, JOYSTICK_REPORT_ID);
    transport.wait_ready().await;
    info!("USB HID ready");

    let mut joystick: HidJoystick = match Joystick::new(JOYSTICK, transport, &mut Delay).await {
        Ok(joystick) => joystick,
        Err(e) => {
            error!("Joystick setup failed: {:?}", e);
            return;
        }
    };
    if let Err(e) = bind_inputs(&mut joystick, axes, buttons, hat) {
        error!("Input binding failed: {:?}", e);
        return;
    }

    info!("JoystickXL initialized, polling inputs...");

    let mut ticker = Ticker::every(POLL_PERIOD);
    loop {
        #[cfg(feature = "remote-throttle")]
        match throttle.poll().await {
            Ok(state) => {
                if let Err(e) = apply_remote_state(&mut joystick, &state, &RemoteMapping::DEFAULT) {
                    warn!("Throttle state rejected: {:?}", e);
                }
            }
            Err(e) => warn!("Throttle poll failed: {:?}", e),
        }

        if let Err(e) = joystick.update().await {
            warn!("Joystick update failed: {:?}", e);
        }

        ticker.next().await;
    }
}

/// Bind local inputs first, then the virtual inputs the throttle feeds.
///
/// Binding order is wire order: axes 0-2 analog, axis 3 spare, axes 4-7
/// throttle; buttons 0-15 local, 16-31 throttle; hat 0 local, hat 1 spare,
/// hats 2-3 throttle.
fn bind_inputs(
    joystick: &mut HidJoystick,
    axes: [AdcChannel; 3],
    buttons: [Input<'static>; 16],
    hat: Hat<Input<'static>>,
) -> Result<(), JoystickError> {
    for adc in axes {
        joystick.add_axis(Axis::analog(adc, AXIS)?)?;
    }
    joystick.add_axis(Axis::virtual_input(AXIS)?)?;
    for pin in buttons {
        joystick.add_button(Button::digital(pin, true))?;
    }
    joystick.add_hat(hat)?;
    joystick.add_hat(Hat::virtual_input(true))?;

    #[cfg(feature = "remote-throttle")]
    {
        for _ in 0..hotas_proto::REMOTE_AXES {
            joystick.add_axis(Axis::virtual_input(AXIS)?)?;
        }
        for _ in 0..hotas_proto::REMOTE_BUTTONS {
            joystick.add_button(Button::virtual_input(true))?;
        }
        for _ in 0..hotas_proto::REMOTE_HATS {
            joystick.add_hat(Hat::virtual_input(true))?;
        }
    }

    Ok(())
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

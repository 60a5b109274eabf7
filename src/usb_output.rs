//! USB HID joystick transport.

use defmt::warn;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{HidBootProtocol, HidSubclass, HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::Builder;
use heapless::Vec;
use joystick_core::descriptor::MAX_REPORT_LEN;
use joystick_core::{ReportDescriptor, ReportTransport, TransportError};

/// Report ID patched into the descriptor and prefixed to every report.
pub const JOYSTICK_REPORT_ID: u8 = 1;

/// Interrupt endpoint size. Fits the largest report plus its ID.
pub const MAX_PACKET_SIZE: usize = 32;

const _: () = assert!(MAX_REPORT_LEN < MAX_PACKET_SIZE);

type UsbDriver<'d> = Driver<'d, USB>;

/// USB HID joystick transport.
///
/// Wraps an embassy-usb HID writer. Reports arrive from the joystick without
/// report ID; the ID is prepended here.
pub struct UsbHidTransport<'d> {
    writer: HidWriter<'d, UsbDriver<'d>, MAX_PACKET_SIZE>,
    report_id: u8,
    ready: bool,
}

impl<'d> UsbHidTransport<'d> {
    /// Create a transport that tags every report with `report_id`.
    pub fn new(writer: HidWriter<'d, UsbDriver<'d>, MAX_PACKET_SIZE>, report_id: u8) -> Self {
        Self {
            writer,
            report_id,
            ready: false,
        }
    }

    /// Wait until the device is ready (USB enumerated).
    pub async fn wait_ready(&mut self) {
        self.writer.ready().await;
        self.ready = true;
    }
}

impl ReportTransport for UsbHidTransport<'_> {
    async fn send(&mut self, report: &[u8]) -> Result<(), TransportError> {
        let mut packet: Vec<u8, MAX_PACKET_SIZE> = Vec::new();
        packet
            .push(self.report_id)
            .map_err(|_| TransportError::Dropped)?;
        packet
            .extend_from_slice(report)
            .map_err(|_| TransportError::Dropped)?;

        match self.writer.write(&packet).await {
            Ok(()) => {
                self.ready = true;
                Ok(())
            }
            Err(EndpointError::Disabled) => {
                self.ready = false;
                Err(TransportError::NotReady)
            }
            Err(EndpointError::BufferOverflow) => {
                warn!("HID report of {} bytes overflowed the endpoint", packet.len());
                Err(TransportError::Io)
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Patch the report ID into `descriptor` and register the HID class.
///
/// Returns the HID writer for use by the application.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, UsbDriver<'d>>,
    state: &'d mut State<'d>,
    descriptor: &'d mut ReportDescriptor,
) -> HidWriter<'d, UsbDriver<'d>, MAX_PACKET_SIZE> {
    descriptor.set_report_id(JOYSTICK_REPORT_ID);
    let descriptor: &'d ReportDescriptor = descriptor;

    let config = embassy_usb::class::hid::Config {
        report_descriptor: descriptor.as_bytes(),
        request_handler: None,
        poll_ms: 1,
        max_packet_size: MAX_PACKET_SIZE as u16,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}

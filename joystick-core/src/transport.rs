//! Report transport trait.

use core::future::Future;

pub use crate::error::TransportError;

/// Async trait for HID report transports.
///
/// This trait abstracts the link to the host (USB HID, BLE HID, a test
/// recorder, ...). The report handed to [`send`](Self::send) is the packed
/// report without report ID; transports that use report IDs prepend it.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ReportTransport {
    /// Send one report to the host.
    ///
    /// May block until the previous report has been sent.
    fn send(&mut self, report: &[u8]) -> impl Future<Output = Result<(), TransportError>>;

    /// Check if the transport is ready to accept data.
    fn is_ready(&self) -> bool;
}

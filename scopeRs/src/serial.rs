//! This module provides constructor helpers for instruments connected via a serial port.
//!
//! The helpers open the port with the [`serialport`] crate and wrap it in a [`ScopePort`], so
//! that drivers only ever deal with the [`crate::ScopeInterface`] trait.

use serialport::{SerialPort, SerialPortBuilder};

use crate::{InterfaceError, ScopePort};

/// Constructor helpers for blocking serial interfaces using the `serialport` crate.
///
/// # Example
///
/// ```no_run
/// use scopers::SerialInterface;
///
/// let interface = SerialInterface::simple("/dev/ttyUSB0", 57600).unwrap();
/// ```
#[derive(Debug)]
pub struct SerialInterface {}

impl SerialInterface {
    /// Try to create a scope interface with a simple serial port configuration.
    ///
    /// The port is opened with the `serialport` defaults (8 data bits, no parity, one stop bit)
    /// and a read timeout of 3 seconds. For other line parameters or timeouts, configure a
    /// [`serialport::SerialPortBuilder`] yourself and hand it to [`SerialInterface::full`].
    ///
    /// # Arguments
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    /// * `baud_rate` - The baud rate to use for the serial communication.
    pub fn simple(
        port: &str,
        baud_rate: u32,
    ) -> Result<ScopePort<Box<dyn SerialPort>>, InterfaceError> {
        let spb = serialport::new(port, baud_rate).timeout(std::time::Duration::from_secs(3));
        Self::full(spb)
    }

    /// Try to create a scope interface from a fully configured serial port builder.
    ///
    /// The read timeout configured on the builder is reused as the interface timeout, so that
    /// line reads and raw reads are bounded consistently.
    ///
    /// # Arguments
    /// * `spb` - A `SerialPortBuilder` to configure the serial port. See
    ///   [`serialport::SerialPortBuilder`] and the [`serialport::new`] function for more details.
    pub fn full(spb: SerialPortBuilder) -> Result<ScopePort<Box<dyn SerialPort>>, InterfaceError> {
        let port = spb.open()?;
        let timeout = port.timeout();
        Ok(ScopePort::new(port, timeout))
    }
}

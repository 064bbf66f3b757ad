//! Provide a serial interface for the DSO5000 series.

use std::time::Duration;

use scopers::{InterfaceError, ScopePort, SerialInterface};
use serialport::SerialPort;

/// A serial interface constructor for the DSO5000 series.
///
/// Builds a ScopeRs serial interface with the line parameters the scope's RS-232 module expects:
/// 8 data bits, one stop bit, and a one second read timeout to bound the line reads of the
/// acquisition sequence. The scope handshakes via DSR/DTR; opening the port asserts DTR on all
/// supported platforms.
#[derive(Debug)]
pub struct SerialInterfaceDso5000 {}

impl SerialInterfaceDso5000 {
    /// Try to create a scope interface with the default baud rate of 57600.
    ///
    /// # Arguments
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    pub fn simple(port: &str) -> Result<ScopePort<Box<dyn SerialPort>>, InterfaceError> {
        Self::with_baud(port, 57600)
    }

    /// Try to create a scope interface with a given baud rate.
    ///
    /// The baud rate must match the rate configured on the scope's RS-232 module.
    ///
    /// # Arguments
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    /// * `baud_rate` - The baud rate to use for the serial communication.
    pub fn with_baud(
        port: &str,
        baud_rate: u32,
    ) -> Result<ScopePort<Box<dyn SerialPort>>, InterfaceError> {
        let spb = serialport::new(port, baud_rate)
            .timeout(Duration::from_secs(1))
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One);
        SerialInterface::full(spb)
    }
}

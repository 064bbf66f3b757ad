//! This module provides the main implementation of the [`ScopeInterface`] trait.
//!
//! It can be called with any type that implements [`std::io::Read`] and [`std::io::Write`],
//! such as [`std::net::TcpStream`] or [`serialport::SerialPort`].

use std::io::ErrorKind;
use std::time::Duration;

use crate::{InterfaceError, ScopeInterface};

/// A general scope interface that can be built from any type that implements
/// [`std::io::Read`] and [`std::io::Write`].
///
/// This struct is what the constructor helpers for serial ports and TCP/IP streams hand out, but
/// it can also wrap your own byte-duplex type directly.
///
/// # Example
///
/// The following shows how to create a [`ScopePort`] from a plain TCP stream. For a stream with
/// read/write timeouts already applied, use [`crate::TcpIpInterface`] instead.
///
/// ```no_run
/// use std::{net::TcpStream, time::Duration};
///
/// use scopers::ScopePort;
///
/// let stream = TcpStream::connect("192.168.10.1:5025").unwrap();
/// let interface = ScopePort::new(stream, Duration::from_secs(3));
/// ```
pub struct ScopePort<P: std::io::Read + std::io::Write> {
    port: P,
    terminator: String,
    timeout: Duration,
}

impl<P: std::io::Read + std::io::Write> ScopePort<P> {
    /// Create a new instance of [`ScopePort`] with a given port and read timeout.
    pub fn new(port: P, timeout: Duration) -> Self {
        Self {
            port,
            terminator: "\n".to_string(),
            timeout,
        }
    }
}

impl<P: std::io::Read + std::io::Write> ScopeInterface for ScopePort<P> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InterfaceError> {
        self.port.read_exact(buf).map_err(|err| match err.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => InterfaceError::Timeout(self.timeout),
            _ => InterfaceError::Io(err),
        })
    }

    fn get_terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }

    fn get_timeout(&self) -> Duration {
        self.timeout
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), InterfaceError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }
}

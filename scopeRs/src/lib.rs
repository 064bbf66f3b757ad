//! ScopeRs: Talk to your SCPI oscilloscope from Rust
//!
//! The ScopeRs library provides the transport layer that oscilloscope drivers build on: a
//! [`ScopeInterface`] trait for blocking, line-oriented instrument communication that stays safe
//! in the presence of binary waveform data, and implementations of it for the common ways a bench
//! scope is actually hooked up.
//!
//! # Currently implemented interfaces are:
//! - Anything that implements [`std::io::Read`] and [`std::io::Write`], via [`ScopePort`].
//! - Serial (blocking) using the [`serialport`] crate, via the `serial` feature.
//! - TCP/IP (blocking) using [`std::net::TcpStream`], e.g., for ethernet-to-serial bridges.
//!
//! # Design notes
//!
//! SCPI instruments speak newline-terminated ASCII in both directions, with one important
//! exception: waveform data queries answer with a length-prefixed binary block in which any byte
//! value, including the line terminator, is legal payload. The interface therefore exposes both
//! [`ScopeInterface::read_until_terminator`] for text replies and [`ScopeInterface::read_exact`]
//! for length-aware binary reads, and leaves the framing decision to the driver.
//!
//! Drivers should be tested against the [`LoopbackInterface`], which simulates an instrument from
//! scripted request/reply lists and panics on any deviation from the script.
//!
//! # License
//!
//! Licensed under either of
//!
//! - Apache License, Version 2.0 ([LICENSE-APACHE](http://www.apache.org/licenses/LICENSE-2.0))
//! - MIT license ([LICENSE-MIT](http://opensource.org/licenses/MIT))
//!
//! at your option.

#![warn(missing_docs)]

mod loopback;
mod port;
#[cfg(feature = "serial")]
mod serial;
mod tcp_ip;

pub use loopback::LoopbackInterface;
pub use port::ScopePort;
#[cfg(feature = "serial")]
pub use serial::SerialInterface;
pub use tcp_ip::TcpIpInterface;

use std::time::{Duration, Instant};

use thiserror::Error;

/// The error enum for all scope transport interfaces.
///
/// Every sending or querying routine of a [`ScopeInterface`] returns this error in its `Result`
/// alternative, so that drivers can propagate transport failures with the `?` operator and still
/// tell a timed out read apart from a broken connection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InterfaceError {
    /// Error when reading from/writing to an interface. See [`std::io::Error`] for more details.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serial")]
    /// Serial port errors can occur when opening a serial interface. See the [`serialport::Error`]
    /// documentation for more information.
    #[error(transparent)]
    Serialport(#[from] serialport::Error),
    /// Timeout occurred while waiting for a response from the instrument. The error contains the
    /// timeout that was exceeded. A timed out read is surfaced as this variant and never treated
    /// as end-of-data.
    #[error(
        "Timeout occurred while waiting for a response from the instrument. Timeout was set to {0:?}."
    )]
    Timeout(Duration),
    /// Timeout occurred while waiting for a response to a query. The error contains the query
    /// that was sent and the timeout that was exceeded.
    #[error(
        "Timeout occurred while waiting for a response to query: {query}. Timeout was set to {timeout:?}."
    )]
    TimeoutQuery {
        /// The query that timed out.
        query: String,
        /// The timeout that was set.
        timeout: Duration,
    },
    /// A text reply from the instrument was not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// The `ScopeInterface` trait defines the transport boundary for oscilloscope drivers.
///
/// Implementors provide raw byte reads and writes plus the terminator and timeout configuration;
/// the trait builds command sending and line-oriented querying on top of those. Reads are
/// blocking and bounded by the configured timeout.
pub trait ScopeInterface {
    /// Read exactly `buf.len()` bytes from the instrument.
    ///
    /// Implementations must surface a read that runs into the configured timeout as
    /// [`InterfaceError::Timeout`].
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InterfaceError>;

    /// Write raw bytes to the instrument and flush the interface.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), InterfaceError>;

    /// Get the line terminator of the interface.
    fn get_terminator(&self) -> &str {
        "\n"
    }

    /// Set the line terminator of the interface from a `&str`.
    ///
    /// # Arguments:
    /// - `_terminator` - A string slice that terminates commands and replies.
    fn set_terminator(&mut self, _terminator: &str) {}

    /// Get the read timeout of the interface.
    fn get_timeout(&self) -> Duration {
        Duration::from_secs(3)
    }

    /// Send a command to the instrument.
    ///
    /// This function takes the command, appends the terminator, and writes it to the instrument.
    /// The interface is flushed by `write_raw` to ensure that the command is sent immediately.
    ///
    /// # Arguments:
    /// - `cmd` - A string slice that will be sent to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), InterfaceError> {
        let full_cmd = format!("{}{}", cmd, self.get_terminator());
        self.write_raw(full_cmd.as_bytes())
    }

    /// Read raw bytes from the instrument until the terminator is found.
    ///
    /// The reply is read byte by byte so that the routine works on interfaces that only hand out
    /// single bytes at a time. Returns the reply without the terminator. If no terminator is
    /// encountered within the timeout, [`InterfaceError::Timeout`] is returned.
    ///
    /// The returned bytes are not interpreted in any way; use [`ScopeInterface::query`] for text
    /// replies.
    fn read_until_terminator(&mut self) -> Result<Vec<u8>, InterfaceError> {
        let terminator = self.get_terminator().as_bytes().to_vec();
        let mut response: Vec<u8> = Vec::new();
        let mut single_buf = [0u8];

        let tic = Instant::now();
        let mut timeout_occurred = true;

        while tic.elapsed() < self.get_timeout() {
            self.read_exact(&mut single_buf)?;
            response.push(single_buf[0]);
            if response.ends_with(&terminator) {
                timeout_occurred = false;
                break;
            }
        }

        if timeout_occurred {
            return Err(InterfaceError::Timeout(self.get_timeout()));
        }

        response.truncate(response.len() - terminator.len());
        Ok(response)
    }

    /// Query the instrument with a command and return the response as a String.
    ///
    /// This function uses `sendcmd` to send the command and `read_until_terminator` to collect
    /// the reply, which is then decoded as UTF-8 and trimmed of surrounding whitespace.
    ///
    /// # Arguments
    /// * `cmd` - The command to send to the instrument for which we expect a response.
    fn query(&mut self, cmd: &str) -> Result<String, InterfaceError> {
        self.sendcmd(cmd)?;
        let raw = self.read_until_terminator().map_err(|err| match err {
            InterfaceError::Timeout(timeout) => InterfaceError::TimeoutQuery {
                query: cmd.to_string(),
                timeout,
            },
            other => other,
        })?;
        let response = String::from_utf8(raw)?;
        Ok(response.trim().to_string())
    }
}

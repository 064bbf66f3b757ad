//! This module provides the constructor helper for an instrument controlled via TCP/IP.
//!
//! This is the interface to use when the instrument hangs off an ethernet-to-serial bridge or
//! exposes a raw socket itself.

use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{InterfaceError, ScopePort};

/// A blocking TCP/IP constructor using the [`std::net::TcpStream`] struct.
#[derive(Debug)]
pub struct TcpIpInterface {}

impl TcpIpInterface {
    /// Try to create a scope interface over a TCP/IP stream.
    ///
    /// A read and write timeout of three seconds is set on the stream. A `TcpStream` without a
    /// read timeout would block indefinitely on a silent instrument, which is never what you want
    /// on a blocking instrument connection.
    ///
    /// # Arguments
    /// * `sock_addr` - Socket address of the instrument, e.g., `"192.168.1.42:5025"`.
    pub fn try_new<A: ToSocketAddrs>(
        sock_addr: A,
    ) -> Result<ScopePort<TcpStream>, InterfaceError> {
        let stream = TcpStream::connect(sock_addr)?;
        let timeout = Duration::from_secs(3);
        stream.set_write_timeout(Some(timeout))?;
        stream.set_read_timeout(Some(timeout))?;
        Ok(ScopePort::new(stream, timeout))
    }
}

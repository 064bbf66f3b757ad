//! A rust driver to capture waveforms from Agilent DSO5000 series oscilloscopes.
//!
//! The driver runs the waveform acquisition sequence of the DSO5000 series over any
//! [`ScopeInterface`]: it checks the instrument identity, configures the transfer format (signed
//! 16-bit words, most significant byte first), selects the source channel and record length,
//! reads the six calibration scalars, and fetches and decodes the length-prefixed binary waveform
//! block into calibrated time/voltage pairs.
//!
//! One call to [`Dso5000::acquire`] performs one complete acquisition and returns a
//! [`CaptureResult`]. The sequence is strictly ordered and aborts on the first failure; there is
//! no automatic retry, since re-running a query may re-trigger the instrument and return
//! different data. The caller keeps ownership of the connection: the driver receives an open
//! interface, never closes it, and hands it back through [`Dso5000::into_inner`].
//!
//! # Example
//!
//! This example shows the usage via the serial interface.
//! ```no_run
//! use agilent_dso5000::{AcquisitionRequest, Dso5000, SerialInterfaceDso5000};
//!
//! // The port where the oscilloscope is connected to
//! let port = "/dev/ttyUSB0";
//!
//! // Get the serial interface for the DSO5000 and open it. This interface already sets the
//! // baud rate, line parameters, and timeout for communication with the scope.
//! let serial_inst = SerialInterfaceDso5000::simple(port).expect("Failed to open serial port");
//! let mut scope = Dso5000::new(serial_inst);
//!
//! // Capture 1000 points from channel 1.
//! let request = AcquisitionRequest::try_from_raw(1, "1000").unwrap();
//! let capture = scope.acquire(request).unwrap();
//!
//! println!("Oscilloscope mode: {}", capture.mode);
//! println!("Samples: {}", capture.points.len());
//! println!("Min: {}, Max: {}", capture.min_voltage, capture.max_voltage);
//! ```

#![warn(missing_docs)]

use std::fmt::Display;
use std::str::FromStr;

use scopers::{InterfaceError, ScopeInterface};
use thiserror::Error;

pub use interface::SerialInterfaceDso5000;
pub use waveform::{AcquisitionMode, CalibrationScalars, CaptureResult, WaveformPoint};

mod block;
mod interface;
mod waveform;

/// The error enum for the DSO5000 driver.
///
/// Every failure aborts the remaining acquisition sequence immediately and carries enough
/// context to diagnose a cabling or configuration problem. None of the variants are retried
/// automatically.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AcquisitionError {
    /// The decoded waveform block contained no samples, so min/max voltages are undefined.
    #[error("The capture contained no samples.")]
    EmptyCapture,
    /// Error on the underlying transport interface. See [`InterfaceError`] for details; a timed
    /// out read surfaces here as [`InterfaceError::Timeout`] or [`InterfaceError::TimeoutQuery`].
    #[error(transparent)]
    Interface(#[from] InterfaceError),
    /// A requested parameter is outside its enumerated domain. This is checked before any
    /// transport I/O happens.
    #[error("Invalid {parameter}: got '{value}', allowed values are {allowed}.")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The value that was requested.
        value: String,
        /// Human readable description of the allowed values.
        allowed: &'static str,
    },
    /// The payload of the waveform block could not be decoded into samples.
    #[error("Malformed waveform payload: {0}")]
    MalformedPayload(String),
    /// The length prefix of the waveform block could not be decoded.
    #[error("Malformed waveform preamble: {0}")]
    MalformedPreamble(String),
    /// A calibration or mode query returned a reply that did not parse.
    #[error("Response to query '{query}' could not be parsed. Response was: '{response}'")]
    MalformedResponse {
        /// The query that was sent.
        query: String,
        /// The reply that was received.
        response: String,
    },
    /// The identity check failed: the connected device is not the expected oscilloscope.
    #[error("Unexpected device identity '{identity}'. Check your connection and try again.")]
    UnexpectedDevice {
        /// The identity string the device reported.
        identity: String,
    },
}

/// Source channel for an acquisition.
///
/// The DSO5000 two-channel models expose channels 1 and 2; anything else is rejected with
/// [`AcquisitionError::InvalidParameter`] before any command is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceChannel {
    /// Analog channel 1.
    Channel1,
    /// Analog channel 2.
    Channel2,
}

impl SourceChannel {
    /// The channel number as used in the `:WAVeform:SOURce` command.
    fn as_number(self) -> u8 {
        match self {
            SourceChannel::Channel1 => 1,
            SourceChannel::Channel2 => 2,
        }
    }
}

impl TryFrom<u8> for SourceChannel {
    type Error = AcquisitionError;

    fn try_from(channel: u8) -> Result<Self, Self::Error> {
        match channel {
            1 => Ok(SourceChannel::Channel1),
            2 => Ok(SourceChannel::Channel2),
            other => Err(AcquisitionError::InvalidParameter {
                parameter: "channel",
                value: other.to_string(),
                allowed: "1 or 2",
            }),
        }
    }
}

impl Display for SourceChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_number())
    }
}

/// Record length for an acquisition.
///
/// The instrument only accepts the enumerated point counts below; `MAXimum` requests whatever
/// record length the current timebase allows and is therefore instrument-dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCount {
    /// 100 points.
    Points100,
    /// 250 points.
    Points250,
    /// 500 points.
    Points500,
    /// 1000 points.
    Points1000,
    /// 2000 points.
    Points2000,
    /// The maximum record length the instrument supports for the current settings.
    Maximum,
}

impl PointCount {
    /// The parameter as used in the `:WAVeform:POINts` command.
    pub fn as_scpi(&self) -> &'static str {
        match self {
            PointCount::Points100 => "100",
            PointCount::Points250 => "250",
            PointCount::Points500 => "500",
            PointCount::Points1000 => "1000",
            PointCount::Points2000 => "2000",
            PointCount::Maximum => "MAXimum",
        }
    }
}

impl FromStr for PointCount {
    type Err = AcquisitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "100" => Ok(PointCount::Points100),
            "250" => Ok(PointCount::Points250),
            "500" => Ok(PointCount::Points500),
            "1000" => Ok(PointCount::Points1000),
            "2000" => Ok(PointCount::Points2000),
            other if other.eq_ignore_ascii_case("maximum") => Ok(PointCount::Maximum),
            other => Err(AcquisitionError::InvalidParameter {
                parameter: "point count",
                value: other.to_string(),
                allowed: "100, 250, 500, 1000, 2000, or MAXimum",
            }),
        }
    }
}

impl Display for PointCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_scpi())
    }
}

/// A validated request for one acquisition.
///
/// Constructing a request is the validation boundary: once a request exists, the command
/// sequencer can no longer be handed an out-of-domain channel or point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionRequest {
    /// The source channel to capture from.
    pub channel: SourceChannel,
    /// The record length to request.
    pub points: PointCount,
}

impl AcquisitionRequest {
    /// Create a new request from already validated parts.
    pub fn new(channel: SourceChannel, points: PointCount) -> Self {
        AcquisitionRequest { channel, points }
    }

    /// Validate raw configuration values into a request.
    ///
    /// This is the entry point for CLI or config glue: the channel number and the point count
    /// string are checked against their enumerated domains and rejected with
    /// [`AcquisitionError::InvalidParameter`] before any instrument I/O can happen.
    ///
    /// # Arguments
    /// * `channel` - The channel number, 1 or 2.
    /// * `points` - The requested record length, one of `100`, `250`, `500`, `1000`, `2000`, or
    ///   `MAXimum` (case-insensitive).
    pub fn try_from_raw(channel: u8, points: &str) -> Result<Self, AcquisitionError> {
        Ok(AcquisitionRequest {
            channel: SourceChannel::try_from(channel)?,
            points: points.parse()?,
        })
    }
}

/// A rust driver for the Agilent DSO5000 series oscilloscopes.
///
/// The driver owns the interface for its lifetime and performs one complete, strictly ordered
/// acquisition per [`Dso5000::acquire`] call. See the top-level documentation for an example.
pub struct Dso5000<T: ScopeInterface> {
    interface: T,
}

impl<T: ScopeInterface> Dso5000<T> {
    /// The vendor token every DSO5000 series identity reply starts with.
    const EXPECTED_VENDOR: &'static str = "AGILENT";

    /// Create a new DSO5000 instance with the given instrument interface.
    ///
    /// The interface must already be open; the driver never opens or closes the connection
    /// itself.
    ///
    /// # Arguments
    /// * `interface` - An instrument interface that implements the [`ScopeInterface`] trait.
    pub fn new(interface: T) -> Self {
        let mut intf = interface;
        intf.set_terminator("\n");
        Dso5000 { interface: intf }
    }

    /// Consume the driver and hand the interface back to the caller.
    ///
    /// Closing the connection is the caller's responsibility on all exit paths, including after
    /// a failed acquisition.
    pub fn into_inner(self) -> T {
        self.interface
    }

    /// Perform one complete waveform acquisition.
    ///
    /// Runs the fixed command sequence: identity check, transfer format configuration, record
    /// length and source channel selection, acquisition mode query, calibration scalar queries,
    /// and finally the binary waveform data query. The first failing step aborts the sequence
    /// and is returned; nothing further is sent.
    ///
    /// # Arguments
    /// * `request` - The validated channel and record length to capture.
    pub fn acquire(
        &mut self,
        request: AcquisitionRequest,
    ) -> Result<CaptureResult, AcquisitionError> {
        self.check_identity()?;
        self.configure_format()?;
        self.interface
            .sendcmd(&format!(":WAVeform:POINts {}", request.points.as_scpi()))?;
        self.interface.sendcmd(&format!(
            ":WAVeform:SOURce CHANnel{}",
            request.channel.as_number()
        ))?;
        let mode = self.query_mode()?;
        let scalars = self.read_calibration()?;
        let samples = self.read_waveform_block()?;
        CaptureResult::from_samples(mode, &samples, &scalars)
    }

    /// Ensure the scope is awake and is the device we expect to be talking to.
    fn check_identity(&mut self) -> Result<(), AcquisitionError> {
        let identity = self.interface.query("*IDN?")?;
        if !identity.starts_with(Self::EXPECTED_VENDOR) {
            return Err(AcquisitionError::UnexpectedDevice { identity });
        }
        log::debug!("Connected to '{identity}'");
        Ok(())
    }

    /// Configure the waveform transfer format: signed 16-bit words, MSB first.
    ///
    /// The block decoder assumes exactly this format, so these commands must precede the data
    /// query.
    fn configure_format(&mut self) -> Result<(), AcquisitionError> {
        self.interface.sendcmd(":WAVeform:FORMat WORD")?;
        self.interface.sendcmd(":WAVeform:BYTeorder MSBFirst")?;
        self.interface.sendcmd(":WAVeform:UNSigned 0")?;
        Ok(())
    }

    /// Query the acquisition mode the scope is set to.
    fn query_mode(&mut self) -> Result<AcquisitionMode, AcquisitionError> {
        let response = self.interface.query(":WAVeform:TYPE?")?;
        let mode = AcquisitionMode::from_response(&response);
        log::debug!("Acquisition mode: {mode}");
        Ok(mode)
    }

    /// Query the six calibration scalars, in the order the programmer's guide lists them.
    fn read_calibration(&mut self) -> Result<CalibrationScalars, AcquisitionError> {
        Ok(CalibrationScalars {
            x_increment: self.query_scalar(":WAVeform:XINCrement?")?,
            x_origin: self.query_scalar(":WAVeform:XORigin?")?,
            x_reference: self.query_scalar(":WAVeform:XREFerence?")?,
            y_increment: self.query_scalar(":WAVeform:YINCrement?")?,
            y_origin: self.query_scalar(":WAVeform:YORigin?")?,
            y_reference: self.query_scalar(":WAVeform:YREFerence?")?,
        })
    }

    /// Query a single NR3-formatted scalar and parse it as a float.
    fn query_scalar(&mut self, query: &str) -> Result<f64, AcquisitionError> {
        let response = self.interface.query(query)?;
        response
            .parse()
            .map_err(|_| AcquisitionError::MalformedResponse {
                query: query.to_string(),
                response,
            })
    }

    /// Fetch the waveform data block and decode it into raw samples.
    fn read_waveform_block(&mut self) -> Result<Vec<i16>, AcquisitionError> {
        self.interface.sendcmd(":WAVeform:DATA?")?;
        let raw = self.read_raw_block()?;
        let (payload_offset, payload_len) = block::decode_preamble(&raw)?;
        log::debug!("Waveform block: {payload_len} payload bytes");
        block::decode_samples(&raw[payload_offset..payload_offset + payload_len])
    }

    /// Read the complete length-prefixed block from the interface.
    ///
    /// The payload may contain any byte value, including the line terminator, so the block is
    /// read length-aware: two header bytes, the announced count of length digits, the announced
    /// count of payload bytes, and finally the trailing terminator. The sizes read here come
    /// from the same header fields that [`block::decode_preamble`] validates on the assembled
    /// block.
    fn read_raw_block(&mut self) -> Result<Vec<u8>, AcquisitionError> {
        let mut header = [0u8; 2];
        self.interface.read_exact(&mut header)?;
        let digit_count = block::header_digit_count(header[0], header[1])?;

        let mut raw = Vec::from(header);
        raw.resize(2 + digit_count, 0);
        self.interface.read_exact(&mut raw[2..])?;
        let payload_len = block::parse_payload_length(&raw[2..])?;

        let digits_end = raw.len();
        raw.resize(digits_end + payload_len, 0);
        self.interface.read_exact(&mut raw[digits_end..])?;

        self.consume_block_terminator()?;
        Ok(raw)
    }

    /// Read and verify the line terminator that follows the block.
    fn consume_block_terminator(&mut self) -> Result<(), AcquisitionError> {
        let terminator = self.interface.get_terminator().as_bytes().to_vec();
        let mut buf = vec![0u8; terminator.len()];
        self.interface.read_exact(&mut buf)?;
        if buf != terminator {
            return Err(AcquisitionError::MalformedPayload(format!(
                "waveform block is not followed by the line terminator, got {buf:?}"
            )));
        }
        Ok(())
    }
}

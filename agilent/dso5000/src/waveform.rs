//! Conversion of raw waveform samples into calibrated time/voltage points.
//!
//! The formulas are the ones from the DSO5000 series programmer's guide: each raw sample value
//! and its 0-based index are mapped through the six calibration scalars the instrument reports
//! per acquisition.

use std::fmt::Display;

use measurements::Voltage;

use crate::AcquisitionError;

/// The acquisition mode the scope was set to for a capture.
///
/// The instrument is the source of truth here: a reply outside the documented set is carried
/// verbatim in [`AcquisitionMode::Other`] instead of being treated as a protocol error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionMode {
    /// Normal acquisition (`NORM`).
    Normal,
    /// Peak-detect acquisition (`PEAK`).
    PeakDetect,
    /// Averaged acquisition (`AVER`).
    Average,
    /// Any mode string the driver does not know, passed through verbatim.
    Other(String),
}

impl AcquisitionMode {
    /// Map a trimmed `:WAVeform:TYPE?` reply to a mode.
    pub(crate) fn from_response(response: &str) -> Self {
        match response {
            "NORM" => AcquisitionMode::Normal,
            "PEAK" => AcquisitionMode::PeakDetect,
            "AVER" => AcquisitionMode::Average,
            other => AcquisitionMode::Other(other.to_string()),
        }
    }

    /// The mode as the instrument spells it.
    pub fn as_str(&self) -> &str {
        match self {
            AcquisitionMode::Normal => "NORM",
            AcquisitionMode::PeakDetect => "PEAK",
            AcquisitionMode::Average => "AVER",
            AcquisitionMode::Other(other) => other,
        }
    }
}

impl Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The six calibration scalars the instrument reports per acquisition.
///
/// All six are immutable once read and only valid for the acquisition they were queried for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationScalars {
    /// Time difference between consecutive samples, in seconds.
    pub x_increment: f64,
    /// Time of the first sample relative to the trigger, in seconds.
    pub x_origin: f64,
    /// Sample index the time axis is referenced to.
    pub x_reference: f64,
    /// Voltage difference between consecutive raw values, in volts.
    pub y_increment: f64,
    /// Voltage at the vertical center reference, in volts.
    pub y_origin: f64,
    /// Raw value the voltage axis is referenced to.
    pub y_reference: f64,
}

impl CalibrationScalars {
    /// Map a raw sample and its 0-based index to a calibrated waveform point.
    ///
    /// - `voltage = (value - y_reference) * y_increment + y_origin`
    /// - `time = (index - x_reference) * x_increment + x_origin`
    pub fn to_point(&self, index: usize, value: i16) -> WaveformPoint {
        let voltage = (f64::from(value) - self.y_reference) * self.y_increment + self.y_origin;
        let time = (index as f64 - self.x_reference) * self.x_increment + self.x_origin;
        WaveformPoint {
            time,
            voltage: Voltage::from_volts(voltage),
        }
    }
}

/// One calibrated waveform sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformPoint {
    /// Sample time relative to the trigger, in seconds. Negative for pre-trigger samples.
    pub time: f64,
    /// Calibrated sample voltage.
    pub voltage: Voltage,
}

/// The result of one waveform acquisition.
///
/// Points are ordered by sample index, which is the acquisition order; the ordering is the core
/// correctness invariant of the decode pipeline. A result is created once per acquisition and
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// The acquisition mode the scope reported for this capture.
    pub mode: AcquisitionMode,
    /// The calibrated samples, ordered by sample index.
    pub points: Vec<WaveformPoint>,
    /// The minimum voltage over all points.
    pub min_voltage: Voltage,
    /// The maximum voltage over all points.
    pub max_voltage: Voltage,
}

impl CaptureResult {
    /// Convert decoded raw samples into a capture result.
    ///
    /// Fails with [`AcquisitionError::EmptyCapture`] if there are no samples, since min/max
    /// voltages are undefined for an empty capture.
    pub(crate) fn from_samples(
        mode: AcquisitionMode,
        samples: &[i16],
        scalars: &CalibrationScalars,
    ) -> Result<Self, AcquisitionError> {
        if samples.is_empty() {
            return Err(AcquisitionError::EmptyCapture);
        }

        let points: Vec<WaveformPoint> = samples
            .iter()
            .enumerate()
            .map(|(index, &value)| scalars.to_point(index, value))
            .collect();

        let min_volts = points
            .iter()
            .fold(f64::INFINITY, |acc, p| acc.min(p.voltage.as_volts()));
        let max_volts = points
            .iter()
            .fold(f64::NEG_INFINITY, |acc, p| acc.max(p.voltage.as_volts()));

        Ok(CaptureResult {
            mode,
            points,
            min_voltage: Voltage::from_volts(min_volts),
            max_voltage: Voltage::from_volts(max_volts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    /// Scalars that map the raw value straight through to volts.
    fn identity_scalars() -> CalibrationScalars {
        CalibrationScalars {
            x_increment: 1e-6,
            x_origin: 0.0,
            x_reference: 0.0,
            y_increment: 1.0,
            y_origin: 0.0,
            y_reference: 0.0,
        }
    }

    /// With unit y-scalars the voltage equals the raw value exactly.
    #[rstest]
    #[case(-32768)]
    #[case(-1)]
    #[case(0)]
    #[case(1)]
    #[case(32767)]
    fn voltage_conversion_is_exact_for_identity_scalars(#[case] value: i16) {
        let point = identity_scalars().to_point(0, value);
        assert_eq!(point.voltage.as_volts(), f64::from(value));
    }

    /// With a zero reference and origin, the time axis is index times increment.
    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(999)]
    fn time_conversion_is_linear(#[case] index: usize) {
        let point = identity_scalars().to_point(index, 0);
        assert_eq!(point.time, index as f64 * 1e-6);
    }

    /// Non-trivial references shift both axes.
    #[rstest]
    fn conversion_applies_references() {
        let scalars = CalibrationScalars {
            x_increment: 2e-3,
            x_origin: -1e-3,
            x_reference: 1.0,
            y_increment: 0.5,
            y_origin: 0.25,
            y_reference: 128.0,
        };
        let point = scalars.to_point(3, 130);
        assert_eq!(point.voltage, Voltage::from_volts((130.0 - 128.0) * 0.5 + 0.25));
        assert_eq!(point.time, (3.0 - 1.0) * 2e-3 + -1e-3);
    }

    #[rstest]
    fn from_samples_rejects_empty_capture() {
        let result = CaptureResult::from_samples(AcquisitionMode::Normal, &[], &identity_scalars());
        assert!(matches!(result, Err(AcquisitionError::EmptyCapture)));
    }

    #[rstest]
    fn from_samples_preserves_order_and_extremes() {
        let capture = CaptureResult::from_samples(
            AcquisitionMode::PeakDetect,
            &[1000, -2000, 500],
            &identity_scalars(),
        )
        .unwrap();

        assert_eq!(capture.mode, AcquisitionMode::PeakDetect);
        let volts: Vec<f64> = capture.points.iter().map(|p| p.voltage.as_volts()).collect();
        assert_eq!(volts, vec![1000.0, -2000.0, 500.0]);
        assert_eq!(capture.min_voltage, Voltage::from_volts(-2000.0));
        assert_eq!(capture.max_voltage, Voltage::from_volts(1000.0));
    }

    /// Documented modes map to their variants, anything else passes through verbatim.
    #[rstest]
    #[case("NORM", AcquisitionMode::Normal)]
    #[case("PEAK", AcquisitionMode::PeakDetect)]
    #[case("AVER", AcquisitionMode::Average)]
    #[case("HRES", AcquisitionMode::Other("HRES".to_string()))]
    fn mode_from_response(#[case] response: &str, #[case] mode_exp: AcquisitionMode) {
        let mode = AcquisitionMode::from_response(response);
        assert_eq!(mode, mode_exp);
        assert_eq!(mode.as_str(), response);

        // ensure that Display is implemented
        let _ = mode.to_string();
    }
}

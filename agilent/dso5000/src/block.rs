//! Decoding of the length-prefixed binary waveform block.
//!
//! The `:WAVeform:DATA?` query answers with an IEEE 488.2 definite-length block: a `#` marker, a
//! single ASCII digit giving the number of length digits that follow, the ASCII payload length,
//! and then the payload itself. The payload is a sequence of big-endian two's-complement 16-bit
//! samples, in acquisition order.

use crate::AcquisitionError;

/// Leading marker byte of a definite-length block.
const BLOCK_MARKER: u8 = b'#';

/// Parse the two-byte block header, returning the count of ASCII length digits that follow.
pub(crate) fn header_digit_count(marker: u8, digit: u8) -> Result<usize, AcquisitionError> {
    if marker != BLOCK_MARKER {
        return Err(AcquisitionError::MalformedPreamble(format!(
            "block does not start with '#', got byte 0x{marker:02X}"
        )));
    }
    match (digit as char).to_digit(10) {
        Some(count) => Ok(count as usize),
        None => Err(AcquisitionError::MalformedPreamble(format!(
            "digit-count byte is not an ASCII digit, got byte 0x{digit:02X}"
        ))),
    }
}

/// Parse the ASCII length digits into the payload byte length.
pub(crate) fn parse_payload_length(digits: &[u8]) -> Result<usize, AcquisitionError> {
    let text = std::str::from_utf8(digits).map_err(|_| {
        AcquisitionError::MalformedPreamble(format!(
            "length field is not ASCII, got bytes {digits:?}"
        ))
    })?;
    text.parse().map_err(|_| {
        AcquisitionError::MalformedPreamble(format!(
            "length field '{text}' is not a non-negative integer"
        ))
    })
}

/// Decode the preamble of a complete block.
///
/// Returns the payload offset and the payload byte length. Fails with
/// [`AcquisitionError::MalformedPreamble`] if the marker or digit-count byte is wrong, if the
/// length field does not parse, or if the block holds fewer payload bytes than it declares.
pub(crate) fn decode_preamble(raw: &[u8]) -> Result<(usize, usize), AcquisitionError> {
    if raw.len() < 2 {
        return Err(AcquisitionError::MalformedPreamble(format!(
            "block header is truncated, got only {} bytes",
            raw.len()
        )));
    }
    let digit_count = header_digit_count(raw[0], raw[1])?;

    let payload_offset = 2 + digit_count;
    if raw.len() < payload_offset {
        return Err(AcquisitionError::MalformedPreamble(format!(
            "length field is truncated, expected {digit_count} digits"
        )));
    }
    let payload_len = parse_payload_length(&raw[2..payload_offset])?;

    if raw.len() < payload_offset + payload_len {
        return Err(AcquisitionError::MalformedPreamble(format!(
            "block declares {payload_len} payload bytes but only {} are available",
            raw.len() - payload_offset
        )));
    }
    Ok((payload_offset, payload_len))
}

/// Split the payload into big-endian signed 16-bit samples, preserving payload order.
pub(crate) fn decode_samples(payload: &[u8]) -> Result<Vec<i16>, AcquisitionError> {
    if payload.len() % 2 != 0 {
        return Err(AcquisitionError::MalformedPayload(format!(
            "payload length {} is odd, expected 16-bit samples",
            payload.len()
        )));
    }
    Ok(payload
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    /// Fabricate a definite-length block around the given payload.
    fn encode_block(payload: &[u8]) -> Vec<u8> {
        let length = payload.len().to_string();
        let mut block = vec![BLOCK_MARKER, b'0' + length.len() as u8];
        block.extend(length.bytes());
        block.extend_from_slice(payload);
        block
    }

    /// Decoding is a left-inverse of the fabricated encoder.
    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(1000)]
    #[case(4000)]
    fn decode_preamble_inverts_encoder(#[case] payload_len: usize) {
        let payload: Vec<u8> = (0..payload_len).map(|i| i as u8).collect();
        let raw = encode_block(&payload);

        let (offset, len) = decode_preamble(&raw).unwrap();
        assert_eq!(offset, 2 + payload_len.to_string().len());
        assert_eq!(len, payload_len);
        assert_eq!(&raw[offset..offset + len], payload.as_slice());
    }

    #[rstest]
    fn decode_preamble_rejects_wrong_marker() {
        let err = decode_preamble(b"X14abcd").unwrap_err();
        assert!(err.to_string().contains("does not start with '#'"));
    }

    #[rstest]
    fn decode_preamble_rejects_non_digit_count() {
        let err = decode_preamble(b"#Xabcd").unwrap_err();
        assert!(err.to_string().contains("not an ASCII digit"));
    }

    #[rstest]
    fn decode_preamble_rejects_non_numeric_length() {
        let err = decode_preamble(b"#2a4xxxx").unwrap_err();
        assert!(err.to_string().contains("not a non-negative integer"));
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"#".as_slice())]
    fn decode_preamble_rejects_truncated_header(#[case] raw: &[u8]) {
        let err = decode_preamble(raw).unwrap_err();
        assert!(err.to_string().contains("header is truncated"));
    }

    #[rstest]
    fn decode_preamble_rejects_truncated_length_field() {
        let err = decode_preamble(b"#3").unwrap_err();
        assert!(err.to_string().contains("length field is truncated"));
    }

    #[rstest]
    fn decode_preamble_rejects_short_payload() {
        // declares 4 payload bytes, provides 2
        let err = decode_preamble(b"#14\x00\x01").unwrap_err();
        assert!(err.to_string().contains("only 2 are available"));
    }

    /// Big-endian sample decoding round-trips the i16 domain edges.
    #[rstest]
    #[case(-32768)]
    #[case(-1)]
    #[case(0)]
    #[case(1)]
    #[case(32767)]
    fn decode_samples_round_trip(#[case] value: i16) {
        let payload = value.to_be_bytes();
        assert_eq!(decode_samples(&payload).unwrap(), vec![value]);
    }

    #[rstest]
    fn decode_samples_preserves_order() {
        let payload = [0x00, 0x01, 0xFF, 0xFF, 0x80, 0x00];
        assert_eq!(decode_samples(&payload).unwrap(), vec![1, -1, -32768]);
    }

    #[rstest]
    fn decode_samples_rejects_odd_payload() {
        let err = decode_samples(&[0x00, 0x01, 0xFF]).unwrap_err();
        assert!(matches!(err, AcquisitionError::MalformedPayload(_)));
    }
}

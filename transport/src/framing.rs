//! The "EGIS" command envelope and "SIGE" response envelope (4.1).
//!
//! `build_request`/`classify_response` are pure functions over byte
//! slices; they never touch an endpoint. The Transport FSM and Action
//! FSMs drive this with freshly submitted payloads and freshly read
//! responses.

/// `"EGIS" 00 00 00 01` — every request starts with this.
pub const WRITE_PREFIX: &[u8; 8] = b"EGIS\x00\x00\x00\x01";

/// `"SIGE"` — every response starts with this.
pub const READ_PREFIX: &[u8; 4] = b"SIGE";

const CHECK_BYTES_LEN: usize = 2;
const MIN_REQUEST_LEN: usize = WRITE_PREFIX.len() + CHECK_BYTES_LEN;

/// Errors raised while building a request or classifying a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    /// A response was shorter than the length needed to classify it.
    #[error("response shorter than expected prefix/suffix")]
    Truncated,
}

/// The outcome of comparing a response buffer against an expected
/// prefix and/or suffix pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// The buffer matched every pattern it was checked against.
    Matched,
    /// At least one pattern did not match.
    NoMatch,
}

/// Build a complete "EGIS" command envelope for `payload`: the fixed
/// 8-byte prefix, 2 placeholder check bytes, the payload, padded to an
/// even total length, with the check bytes then filled in so that the
/// 16-bit big-endian word-sum of the whole buffer (check bytes
/// included) is `0 mod 0xFFFF`.
pub fn build_request(payload: &[u8]) -> Vec<u8> {
    let body_len = WRITE_PREFIX.len() + CHECK_BYTES_LEN + payload.len();
    let padded_len = body_len + (body_len % 2);

    let mut buf = vec![0u8; padded_len];
    buf[..WRITE_PREFIX.len()].copy_from_slice(WRITE_PREFIX);
    let payload_start = WRITE_PREFIX.len() + CHECK_BYTES_LEN;
    buf[payload_start..payload_start + payload.len()].copy_from_slice(payload);

    let check = check_bytes(&buf);
    buf[WRITE_PREFIX.len()..payload_start].copy_from_slice(&check.to_be_bytes());
    buf
}

/// `check_bytes = 0xFFFF - (sum of 16-bit BE words mod 0xFFFF)`, with
/// the check-byte field itself taken as zero while summing. `buf` is
/// assumed to already be even-length; an odd trailing byte (should one
/// ever appear) is folded in as the high byte of a final word.
fn check_bytes(buf: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = buf.chunks_exact(2);
    for word in &mut chunks {
        sum += u16::from_be_bytes([word[0], word[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += u16::from_be_bytes([*last, 0]) as u32;
    }
    (0xFFFFu32 - (sum % 0xFFFF)) as u16
}

/// Compare a response buffer's region just past the 4-byte "SIGE" +
/// 2-byte status-check header against `expected_prefix`, and/or its
/// trailing bytes against `expected_suffix`. At least one of the two
/// must be supplied by the caller; either may be omitted with `None`.
pub fn classify_response(
    buffer: &[u8],
    expected_prefix: Option<&[u8]>,
    expected_suffix: Option<&[u8]>,
) -> Result<Match, FramingError> {
    if buffer.len() < READ_PREFIX.len() + CHECK_BYTES_LEN {
        return Err(FramingError::Truncated);
    }

    if let Some(prefix) = expected_prefix {
        let body = &buffer[READ_PREFIX.len() + CHECK_BYTES_LEN..];
        if body.len() < prefix.len() {
            return Err(FramingError::Truncated);
        }
        if &body[..prefix.len()] != prefix {
            return Ok(Match::NoMatch);
        }
    }

    if let Some(suffix) = expected_suffix {
        if buffer.len() < suffix.len() {
            return Err(FramingError::Truncated);
        }
        if &buffer[buffer.len() - suffix.len()..] != suffix {
            return Ok(Match::NoMatch);
        }
    }

    Ok(Match::Matched)
}

/// Validate that a buffer begins with the fixed "SIGE" response
/// prefix, without classifying it further.
pub fn starts_with_read_prefix(buffer: &[u8]) -> bool {
    buffer.len() >= READ_PREFIX.len() && &buffer[..READ_PREFIX.len()] == READ_PREFIX
}

/// The minimum length a built request can ever have (prefix + check
/// bytes, no payload).
pub const fn min_request_len() -> usize {
    MIN_REQUEST_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_byte_round_trip_sums_to_zero_mod_0xffff() {
        let framed = build_request(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(framed.len(), 12);
        assert_eq!(&framed[..8], WRITE_PREFIX);

        let mut sum: u32 = 0;
        for word in framed.chunks_exact(2) {
            sum += u16::from_be_bytes([word[0], word[1]]) as u32;
        }
        assert_eq!(sum % 0xFFFF, 0);
    }

    #[test]
    fn empty_payload_pads_to_even_length() {
        let framed = build_request(&[]);
        assert_eq!(framed.len() % 2, 0);
        assert_eq!(framed.len(), WRITE_PREFIX.len() + CHECK_BYTES_LEN);
    }

    #[test]
    fn odd_payload_length_is_padded() {
        let framed = build_request(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(framed.len() % 2, 0);
    }

    #[test]
    fn classify_response_matches_prefix_and_suffix() {
        let mut buf = READ_PREFIX.to_vec();
        buf.extend_from_slice(&[0x00, 0x00]);
        buf.extend_from_slice(b"OK");
        buf.extend_from_slice(b"DONE");

        assert_eq!(
            classify_response(&buf, Some(b"OK"), Some(b"DONE")).unwrap(),
            Match::Matched
        );
        assert_eq!(
            classify_response(&buf, Some(b"NOPE"), None).unwrap(),
            Match::NoMatch
        );
    }

    #[test]
    fn classify_response_rejects_truncated_buffer() {
        assert_eq!(classify_response(&[0x53, 0x49], None, Some(b"x")), Err(FramingError::Truncated));
    }
}

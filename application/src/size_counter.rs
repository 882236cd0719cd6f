//! The non-linear two-byte "size counter" encoding used by the
//! `delete`/`clear` and `check` command bodies (4.6.3, 4.6.5).
//!
//! The formula is documented only up to n = 14; building a command for
//! a larger count is refused rather than extrapolated (9. Design
//! Notes).

use sdcp_core::SdcpError;

const MAX_SUPPORTED_N: u8 = 14;

/// Which command family a size counter is being built for — the two
/// differ only in their additive term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCounterKind {
    /// `delete`/`clear`: `+0x07`.
    Delete,
    /// `check`: `+0x09`, and the `n` term is pre-incremented by one in
    /// the `n <= 7` branch.
    Check,
}

/// Encode `n` as the two-byte size counter for `kind`, per the formula
/// in 4.6.3. Returns `SdcpError::General` for `n` above
/// `MAX_SUPPORTED_N`.
pub fn encode(n: u8, kind: SizeCounterKind) -> Result<[u8; 2], SdcpError> {
    if n > MAX_SUPPORTED_N {
        return Err(SdcpError::General("size counter formula is not specified above n=14"));
    }

    // The `n <= 7` check branch's `(n+1)*0x20 + 0x09` term exceeds a
    // single byte at n=7 (265); the field is one byte wide on the
    // wire, so the term is computed in a wider type and truncated,
    // matching how the device itself must interpret the field.
    let (byte1, byte2): (u8, u16) = if n <= 7 {
        let term: u16 = match kind {
            SizeCounterKind::Delete => n as u16 * 0x20 + 0x07,
            SizeCounterKind::Check => (n as u16 + 1) * 0x20 + 0x09,
        };
        (0x00, term)
    } else {
        let term: u16 = match kind {
            SizeCounterKind::Delete => (n - 8) as u16 * 0x20 + 0x07,
            SizeCounterKind::Check => (n - 7) as u16 * 0x20 + 0x09,
        };
        (0x01, term)
    };

    Ok([byte1, byte2 as u8])
}

/// Encode `n` for the *second* size field in a command body, which
/// uses the same branch formula but without the additive `+0x07`/
/// `+0x09` term.
pub fn encode_secondary(n: u8) -> Result<[u8; 2], SdcpError> {
    if n > MAX_SUPPORTED_N {
        return Err(SdcpError::General("size counter formula is not specified above n=14"));
    }

    let (byte1, byte2) = if n <= 7 {
        (0x00u8, n * 0x20)
    } else {
        (0x01u8, (n - 8) * 0x20)
    };

    Ok([byte1, byte2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_formula_matches_spec_examples() {
        assert_eq!(encode(0, SizeCounterKind::Delete).unwrap(), [0x00, 0x07]);
        assert_eq!(encode(7, SizeCounterKind::Delete).unwrap(), [0x00, 0xE7]);
        assert_eq!(encode(8, SizeCounterKind::Delete).unwrap(), [0x01, 0x07]);
        assert_eq!(encode(14, SizeCounterKind::Delete).unwrap(), [0x01, 0xC7]);
    }

    #[test]
    fn check_formula_matches_spec_examples() {
        assert_eq!(encode(0, SizeCounterKind::Check).unwrap(), [0x00, 0x29]);
        // (7+1)*0x20 + 0x09 = 265, truncated to a single byte: 0x09.
        assert_eq!(encode(7, SizeCounterKind::Check).unwrap(), [0x00, 0x09]);
        assert_eq!(encode(8, SizeCounterKind::Check).unwrap(), [0x01, 0x29]);
    }

    #[test]
    fn n_above_max_is_refused() {
        assert!(encode(15, SizeCounterKind::Delete).is_err());
        assert!(encode_secondary(15).is_err());
    }
}

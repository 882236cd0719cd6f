//! The `CHECK` command body (4.6.4, 4.6.5), shared by Enroll's
//! duplicate check and Identify/Verify's match search — both send the
//! same shape: a size-counted list of enrollment ids against an
//! all-zero 32-byte nonce.

use crate::size_counter::{encode, encode_secondary, SizeCounterKind};
use sdcp_core::SdcpError;
use sdcp_infrastructure::DeviceAdapter;

const IDENTIFY_NONCE_LEN: usize = 32;

/// Build the `CHECK` command body: `00 00 ∥ size_hi size_lo ∥
/// check_prefix ∥ size_hi' size_lo' ∥ 32B all-zero nonce ∥
/// concat(enrollment_ids) ∥ check_suffix`.
pub fn build_check_body(adapter: &DeviceAdapter, enrollment_ids: &[[u8; 32]]) -> Result<Vec<u8>, SdcpError> {
    let n = enrollment_ids.len() as u8;
    let size = encode(n, SizeCounterKind::Check)?;
    let size_secondary = encode_secondary(n)?;
    let check_prefix = adapter.check_prefix();

    let mut body = Vec::with_capacity(
        2 + 2 + check_prefix.len() + 2 + IDENTIFY_NONCE_LEN + enrollment_ids.len() * 32 + adapter.check_suffix.len(),
    );
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(&size);
    body.extend_from_slice(check_prefix);
    body.extend_from_slice(&size_secondary);
    body.extend_from_slice(&[0u8; IDENTIFY_NONCE_LEN]);
    for id in enrollment_ids {
        body.extend_from_slice(id);
    }
    body.extend_from_slice(&adapter.check_suffix);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdcp_infrastructure::CheckPrefixFamily;

    #[test]
    fn body_carries_prefix_nonce_ids_and_suffix_in_order() {
        let adapter = DeviceAdapter::illustrative_default();
        let ids = [[7u8; 32]];
        let body = build_check_body(&adapter, &ids).unwrap();

        assert_eq!(&body[0..2], &[0x00, 0x00]);
        assert_eq!(&body[2..4], &encode(1, SizeCounterKind::Check).unwrap());
        let check_prefix_len = adapter.check_prefix().len();
        let mut pos = 4;
        assert_eq!(&body[pos..pos + check_prefix_len], adapter.check_prefix());
        pos += check_prefix_len;
        assert_eq!(&body[pos..pos + 2], &encode_secondary(1).unwrap());
        pos += 2;
        assert_eq!(&body[pos..pos + 32], &[0u8; 32]);
        pos += 32;
        assert_eq!(&body[pos..pos + 32], &[7u8; 32]);
        pos += 32;
        assert_eq!(&body[pos..], adapter.check_suffix.as_slice());
    }

    #[test]
    fn respects_the_declared_check_prefix_family() {
        let mut adapter = DeviceAdapter::illustrative_default();
        adapter.check_prefix_family = CheckPrefixFamily::Type2;
        let body = build_check_body(&adapter, &[]).unwrap();
        assert!(body.windows(adapter.check_prefix_type2.len()).any(|w| w == adapter.check_prefix_type2));
    }
}

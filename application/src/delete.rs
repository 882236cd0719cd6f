//! Delete / Clear Action (4.6.3): `GET_ENROLLED_IDS` then `DELETE`.
//! Deleting a single print targets a caller-supplied id; clearing
//! targets every currently enrolled id. A clear with nothing enrolled
//! is rejected locally, without contacting the device.

use crate::list::get_enrolled_ids;
use crate::size_counter::{encode, encode_secondary, SizeCounterKind};
use crate::context::DeviceContext;
use sdcp_core::SdcpError;

/// What to delete: one specific print, or everything enrolled.
pub enum DeleteTarget {
    /// Delete the print with this enrollment id.
    Single([u8; 32]),
    /// Delete every enrolled print.
    All,
}

/// Run the Delete/Clear action.
pub async fn delete(ctx: &DeviceContext, target: DeleteTarget) -> Result<(), SdcpError> {
    let ids_to_delete = match target {
        DeleteTarget::Single(id) => vec![id],
        DeleteTarget::All => {
            let enrolled = get_enrolled_ids(ctx).await?;
            if enrolled.is_empty() {
                return Err(SdcpError::DataNotFound);
            }
            enrolled
        }
    };

    let body = build_delete_body(&ctx.adapter.delete_prefix, &ids_to_delete)?;

    let response = ctx
        .transport
        .exec(Some(&body), false)
        .await
        .map_err(|_| SdcpError::Proto("delete command failed"))?;

    match sdcp_transport::framing::classify_response(&response, Some(&ctx.adapter.delete_success_prefix), None) {
        Ok(sdcp_transport::framing::Match::Matched) => Ok(()),
        _ => Err(SdcpError::Proto("delete command was not acknowledged")),
    }
}

fn build_delete_body(delete_prefix: &[u8], ids: &[[u8; 32]]) -> Result<Vec<u8>, SdcpError> {
    let n = ids.len() as u8;
    let size = encode(n, SizeCounterKind::Delete)?;
    let size_secondary = encode_secondary(n)?;

    let mut body = Vec::with_capacity(2 + 2 + delete_prefix.len() + 2 + ids.len() * 32);
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(&size);
    body.extend_from_slice(delete_prefix);
    body.extend_from_slice(&size_secondary);
    for id in ids {
        body.extend_from_slice(id);
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_body_carries_prefix_and_concatenated_ids() {
        let ids = [[1u8; 32], [2u8; 32]];
        let body = build_delete_body(&[0xAA, 0xBB], &ids).unwrap();

        assert_eq!(&body[0..2], &[0x00, 0x00]);
        assert_eq!(&body[2..4], &encode(2, SizeCounterKind::Delete).unwrap());
        assert_eq!(&body[4..6], &[0xAA, 0xBB]);
        assert_eq!(&body[6..8], &encode_secondary(2).unwrap());
        assert_eq!(&body[8..40], &[1u8; 32]);
        assert_eq!(&body[40..72], &[2u8; 32]);
    }

    #[test]
    fn clear_refuses_commands_above_the_supported_count() {
        let ids = vec![[0u8; 32]; 15];
        assert!(build_delete_body(&[0xAA], &ids).is_err());
    }
}

//! List Action (4.6.2): `GET_ENROLLED_IDS` then materialise the
//! enrolled prints.

use crate::context::DeviceContext;
use sdcp_core::SdcpError;
use sdcp_infrastructure::StoredFingerprint;

const ENROLLMENT_ID_LEN: usize = 32;

/// `GET_ENROLLED_IDS`: issue the list command and return the ids found
/// in the reply, stepping past the fixed prefix then reading 32-byte
/// ids until the buffer is exhausted.
pub async fn get_enrolled_ids(ctx: &DeviceContext) -> Result<Vec<[u8; 32]>, SdcpError> {
    let response = ctx
        .transport
        .exec(Some(&ctx.adapter.list), false)
        .await
        .map_err(|_| SdcpError::Proto("list command failed"))?;

    parse_enrolled_ids(&response, ctx.adapter.list_response_prefix_size)
}

fn parse_enrolled_ids(response: &[u8], prefix_size: usize) -> Result<Vec<[u8; 32]>, SdcpError> {
    if response.len() < prefix_size {
        return Err(SdcpError::Proto("list response shorter than its fixed prefix"));
    }

    let mut ids = Vec::new();
    let mut body = &response[prefix_size..];
    while body.len() >= ENROLLMENT_ID_LEN {
        let mut id = [0u8; ENROLLMENT_ID_LEN];
        id.copy_from_slice(&body[..ENROLLMENT_ID_LEN]);
        ids.push(id);
        body = &body[ENROLLMENT_ID_LEN..];
    }

    Ok(ids)
}

/// `RETURN_PRINTS`: materialise one opaque record per enrolled id.
pub async fn list(ctx: &DeviceContext) -> Result<Vec<StoredFingerprint>, SdcpError> {
    let ids = get_enrolled_ids(ctx).await?;
    Ok(ids.into_iter().map(StoredFingerprint::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_ids_after_fixed_prefix() {
        let mut response = vec![0xAAu8; 6];
        response.extend_from_slice(&[1u8; 32]);
        response.extend_from_slice(&[2u8; 32]);

        let ids = parse_enrolled_ids(&response, 6).unwrap();
        assert_eq!(ids, vec![[1u8; 32], [2u8; 32]]);
    }

    #[test]
    fn empty_body_yields_no_ids() {
        let response = vec![0xAAu8; 6];
        let ids = parse_enrolled_ids(&response, 6).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn response_shorter_than_prefix_is_rejected() {
        let response = vec![0xAAu8; 3];
        assert!(parse_enrolled_ids(&response, 6).is_err());
    }
}

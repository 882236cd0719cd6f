//! `SDCP_CONNECT`, the state Enroll and Identify/Verify both start
//! from (skipped whenever a live claim already carries a connected
//! session): either reload session secrets from the Claim Store, or
//! run a fresh SDCP connect against the device and persist the
//! result.

use crate::context::DeviceContext;
use sdcp_core::session::SdcpSession;
use sdcp_core::SdcpError;
use sdcp_transport::framing::{classify_response, Match};
use tracing::{debug, info};

/// Ensure `ctx.session` is connected, reusing a live claim if one
/// exists and running a fresh connect against the device otherwise.
pub async fn ensure_connected(ctx: &mut DeviceContext) -> Result<(), SdcpError> {
    if ctx.session.is_connected() {
        return Ok(());
    }

    if let Some(material) = ctx.claim_store.load_if_live(ctx.session.claim_expiration_seconds())? {
        debug!("reusing live claim, skipping SDCP_CONNECT");
        ctx.session = SdcpSession::from_live_claim(
            material.host_private_key,
            material.master_secret,
            material.application_secret,
            material.application_symmetric_key,
            material.connected_realtime,
            ctx.session.supports_reconnect(),
            ctx.session.claim_expiration_seconds(),
        )?;
        return Ok(());
    }

    let body = build_connect_body(ctx);
    let response = ctx
        .transport
        .exec(Some(&body), false)
        .await
        .map_err(|_| SdcpError::Proto("connect command failed"))?;

    match classify_response(&response, None, Some(&ctx.adapter.sdcp_connect_success_suffix)) {
        Ok(Match::Matched) => {}
        _ => return Err(SdcpError::Proto("device did not acknowledge connect")),
    }

    let connect_buf = connect_response_body(&response, ctx.adapter.connect_response_prefix_size)?;
    ctx.session.derive_keys_and_verify_connect_buf(connect_buf, &ctx.trust_anchor)?;

    if let Some(material) = ctx.session.snapshot_for_claim() {
        ctx.claim_store.save(&material)?;
    }

    info!("SDCP_CONNECT complete");
    Ok(())
}

fn build_connect_body(ctx: &DeviceContext) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&ctx.adapter.connect_prefix);
    body.extend_from_slice(&ctx.session.host_random());
    body.extend_from_slice(&ctx.session.host_public_key_raw64());
    body.extend_from_slice(&ctx.adapter.connect_suffix);
    body
}

/// Step past the fixed connect-response prefix, exactly like
/// `list.rs`/`identify.rs` do for their own response shapes: no
/// read-prefix or check-bytes term is added on top, since
/// `connect_response_prefix_size` is already the total offset from the
/// start of the raw response buffer.
fn connect_response_body(response: &[u8], prefix_size: usize) -> Result<&[u8], SdcpError> {
    if response.len() < prefix_size {
        return Err(SdcpError::Proto("connect response shorter than its fixed prefix"));
    }
    Ok(&response[prefix_size..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_past_fixed_prefix_only() {
        let mut response = vec![0xAAu8; 6];
        response.extend_from_slice(&[1u8; 4]);

        let body = connect_response_body(&response, 6).unwrap();
        assert_eq!(body, &[1u8; 4]);
    }

    #[test]
    fn response_shorter_than_prefix_is_rejected() {
        let response = vec![0xAAu8; 3];
        assert!(connect_response_body(&response, 6).is_err());
    }
}

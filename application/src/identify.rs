//! Identify / Verify Action (4.6.5): a shared FSM parameterized by
//! whether the caller wants a gallery search (identify) or a
//! comparison against one caller-supplied print (verify).

use crate::check::build_check_body;
use crate::connect::ensure_connected;
use crate::context::DeviceContext;
use crate::list::get_enrolled_ids;
use crate::progress::{ActionEvent, ProgressSink};
use sdcp_core::SdcpError;
use sdcp_transport::framing::{classify_response, Match};

const MAC_LEN: usize = 32;
const ENROLLMENT_ID_LEN: usize = 32;

/// What the caller is trying to confirm: a match against the whole
/// gallery, or against one specific enrolled print.
pub enum IdentifyTarget {
    /// Search every enrolled print for a match.
    Gallery,
    /// Confirm the finger on the sensor matches this specific print.
    SinglePrint([u8; 32]),
}

/// The outcome of a completed Identify/Verify action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifyOutcome {
    /// A match was found (identify) or confirmed (verify), carrying
    /// the matched enrollment id.
    Matched([u8; 32]),
    /// No match was found.
    NotMatched,
}

/// Run the shared Identify/Verify FSM.
pub async fn identify(
    ctx: &mut DeviceContext,
    target: IdentifyTarget,
    sink: &dyn ProgressSink,
) -> Result<IdentifyOutcome, SdcpError> {
    ensure_connected(ctx).await?;

    let enrolled = get_enrolled_ids(ctx).await?;
    if enrolled.is_empty() {
        return Err(SdcpError::DataNotFound);
    }

    let candidates: Vec<[u8; 32]> = match &target {
        IdentifyTarget::Gallery => enrolled,
        IdentifyTarget::SinglePrint(id) => vec![*id],
    };

    run_cmd(ctx, &ctx.adapter.sensor_reset.clone(), false).await?;
    run_cmd(ctx, &ctx.adapter.sensor_identify.clone(), false).await?;

    sink.on_event(ActionEvent::WaitingForFinger);
    ctx.finger
        .wait(&ctx.finger_cancel)
        .await
        .map_err(|_| SdcpError::Proto("timed out waiting for finger during identify"))?;

    run_cmd(ctx, &ctx.adapter.sensor_check.clone(), false).await?;

    let check_body = build_check_body(&ctx.adapter, &candidates)?;
    let response = ctx
        .transport
        .exec(Some(&check_body), false)
        .await
        .map_err(|_| SdcpError::Proto("check command failed"))?;

    let outcome = classify_and_verify(ctx, &response, sink)?;

    run_cmd(ctx, &ctx.adapter.sensor_reset.clone(), false).await?;

    Ok(outcome)
}

/// Split the response into a match/no-match classification, and on a
/// match, swap the wire-ordered `{mac, enrollment_id}` pair into
/// canonical order before verifying the Authorized-Identity MAC.
fn classify_and_verify(
    ctx: &DeviceContext,
    response: &[u8],
    sink: &dyn ProgressSink,
) -> Result<IdentifyOutcome, SdcpError> {
    if classify_response(response, None, Some(&ctx.adapter.identify_match_suffix)) == Ok(Match::Matched) {
        let prefix = ctx.adapter.identify_response_prefix_size;
        if response.len() < prefix + MAC_LEN + ENROLLMENT_ID_LEN {
            return Err(SdcpError::Proto("identify match response truncated"));
        }
        // Wire order is `{mac, enrollment_id}`, backwards relative to
        // SDCP's canonical `{enrollment_id, mac}` the verifier expects.
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&response[prefix..prefix + MAC_LEN]);
        let mut enrollment_id = [0u8; ENROLLMENT_ID_LEN];
        enrollment_id.copy_from_slice(&response[prefix + MAC_LEN..prefix + MAC_LEN + ENROLLMENT_ID_LEN]);

        let host_nonce = [0u8; 32];
        if !ctx.session.verify_authorized_identity(&host_nonce, &enrollment_id, &mac) {
            return Err(SdcpError::DataInvalid("authorized-identity mac did not verify"));
        }

        sink.on_event(ActionEvent::IdentifyMatched);
        return Ok(IdentifyOutcome::Matched(enrollment_id));
    }

    if classify_response(response, None, Some(&ctx.adapter.identify_notmatch_suffix)) == Ok(Match::Matched) {
        sink.on_event(ActionEvent::IdentifyNotMatched);
        return Ok(IdentifyOutcome::NotMatched);
    }

    Err(SdcpError::Proto("identify response was neither match nor no-match"))
}

async fn run_cmd(ctx: &DeviceContext, payload: &[u8], short_is_error: bool) -> Result<Vec<u8>, SdcpError> {
    ctx.transport
        .exec(Some(payload), short_is_error)
        .await
        .map_err(|_| SdcpError::Proto("sensor command failed"))
}

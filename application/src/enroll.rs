//! Enroll Action (4.6.4): `SDCP_CONNECT` (skipped if already
//! connected), duplicate check, then a capture loop up to
//! `max_enroll_stages` iterations, finishing with a commit that binds
//! the SDCP-derived enrollment id to the captured print.

use crate::check::build_check_body;
use crate::connect::ensure_connected;
use crate::context::DeviceContext;
use crate::list::get_enrolled_ids;
use crate::progress::{ActionEvent, ProgressSink, RetryReason};
use sdcp_core::SdcpError;
use sdcp_transport::framing::{classify_response, Match};
use zeroize::Zeroize;

const ENROLLMENT_NONCE_LEN: usize = 32;

/// How one capture attempt in the loop came back.
enum CaptureOutcome {
    PartialOk,
    OffCenter,
    DirtySensor,
    Unknown,
}

/// Run the full Enroll action, reporting progress through `sink`.
/// Returns the newly enrolled print's SDCP enrollment id.
pub async fn enroll(ctx: &mut DeviceContext, sink: &dyn ProgressSink) -> Result<[u8; 32], SdcpError> {
    ensure_connected(ctx).await?;

    let enrolled = get_enrolled_ids(ctx).await?;
    if enrolled.len() as u8 >= ctx.variant.max_enroll_count {
        return Err(SdcpError::DataFull);
    }

    run_cmd(ctx, &ctx.adapter.sensor_reset.clone(), false).await?;
    run_cmd(ctx, &ctx.adapter.sensor_enroll.clone(), false).await?;

    sink.on_event(ActionEvent::WaitingForFinger);
    ctx.finger
        .wait(&ctx.finger_cancel)
        .await
        .map_err(|_| SdcpError::Proto("timed out waiting for finger during enroll"))?;

    run_cmd(ctx, &ctx.adapter.sensor_check.clone(), false).await?;

    let check_body = build_check_body(&ctx.adapter, &enrolled)?;
    let check_response = ctx
        .transport
        .exec(Some(&check_body), false)
        .await
        .map_err(|_| SdcpError::Proto("check command failed"))?;
    if classify_response(&check_response, None, Some(&ctx.adapter.check_not_yet_enrolled_suffix)) != Ok(Match::Matched)
    {
        return Err(SdcpError::DataDuplicate);
    }

    let start_response = run_cmd(ctx, &ctx.adapter.enroll_starting.clone(), true).await?;
    if classify_response(&start_response, None, Some(&ctx.adapter.enroll_starting_suffix)) != Ok(Match::Matched) {
        return Err(SdcpError::Proto("invalid response when starting enrollment"));
    }
    let nonce_start = ctx.adapter.enroll_starting_response_prefix_size;
    if start_response.len() < nonce_start + ENROLLMENT_NONCE_LEN {
        return Err(SdcpError::Proto("enroll-starting response missing its nonce"));
    }
    let mut device_nonce = [0u8; ENROLLMENT_NONCE_LEN];
    device_nonce.copy_from_slice(&start_response[nonce_start..nonce_start + ENROLLMENT_NONCE_LEN]);

    let enrollment_id = ctx.session.generate_enrollment_id(&device_nonce)?;
    device_nonce.zeroize();

    let mut stage = 0u8;
    while stage < ctx.variant.max_enroll_stages {
        run_cmd(ctx, &ctx.adapter.sensor_reset.clone(), false).await?;
        run_cmd(ctx, &ctx.adapter.sensor_start_capture.clone(), false).await?;

        sink.on_event(ActionEvent::WaitingForFinger);
        ctx.finger
            .wait(&ctx.finger_cancel)
            .await
            .map_err(|_| SdcpError::Proto("timed out waiting for finger during capture"))?;

        run_cmd(ctx, &ctx.adapter.capture_post_wait_finger.clone(), false).await?;
        let capture_response = run_cmd(ctx, &ctx.adapter.read_capture.clone(), false).await?;

        match classify_capture(&ctx.adapter, &capture_response) {
            CaptureOutcome::PartialOk => {
                stage += 1;
                sink.on_event(ActionEvent::EnrollStageComplete {
                    stage,
                    of: ctx.variant.max_enroll_stages,
                });
            }
            CaptureOutcome::OffCenter => sink.on_event(ActionEvent::EnrollCaptureRetry(RetryReason::OffCenter)),
            CaptureOutcome::DirtySensor => sink.on_event(ActionEvent::EnrollCaptureRetry(RetryReason::DirtySensor)),
            CaptureOutcome::Unknown => sink.on_event(ActionEvent::EnrollCaptureRetry(RetryReason::Unknown)),
        }
    }

    run_cmd(ctx, &ctx.adapter.commit_starting.clone(), false).await?;

    let mut commit_body = ctx.adapter.new_print_prefix.clone();
    commit_body.extend_from_slice(&enrollment_id);
    let commit_response = ctx
        .transport
        .exec(Some(&commit_body), false)
        .await
        .map_err(|_| SdcpError::Proto("commit command failed"))?;
    if classify_response(&commit_response, None, Some(&ctx.adapter.commit_success_suffix)) != Ok(Match::Matched) {
        return Err(SdcpError::Proto("commit was not acknowledged"));
    }

    run_cmd(ctx, &ctx.adapter.sensor_reset.clone(), false).await?;

    Ok(enrollment_id)
}

fn classify_capture(adapter: &sdcp_infrastructure::DeviceAdapter, response: &[u8]) -> CaptureOutcome {
    if classify_response(response, None, Some(&adapter.read_success_suffix)) == Ok(Match::Matched) {
        CaptureOutcome::PartialOk
    } else if classify_response(response, None, Some(&adapter.read_offcenter_suffix)) == Ok(Match::Matched) {
        CaptureOutcome::OffCenter
    } else if classify_response(response, Some(&adapter.read_dirty_prefix), None) == Ok(Match::Matched) {
        CaptureOutcome::DirtySensor
    } else {
        CaptureOutcome::Unknown
    }
}

async fn run_cmd(ctx: &DeviceContext, payload: &[u8], short_is_error: bool) -> Result<Vec<u8>, SdcpError> {
    ctx.transport
        .exec(Some(payload), short_is_error)
        .await
        .map_err(|_| SdcpError::Proto("sensor command failed"))
}

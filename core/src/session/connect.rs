//! `ConnectResponse` parsing and the SDCP connect algorithm (4.4.1).

use crate::crypto::{self, TrustAnchor};
use crate::error::SdcpError;
use crate::memory::GuardedKey32;

/// The device's response to an SDCP connect attempt, already stripped
/// of any vendor command framing — this is exactly the byte layout
/// described in section 3's `ConnectResponse` data model entry.
pub struct ConnectResponse {
    /// Device random, 32 B.
    pub r_d: [u8; 32],
    /// DER-encoded model certificate.
    pub cert_m: Vec<u8>,
    /// Device public key, 64 B raw `X || Y`.
    pub pk_d: [u8; 64],
    /// Firmware public key, 64 B raw `X || Y`.
    pub pk_f: [u8; 64],
    /// Firmware hash, 32 B.
    pub h_f: [u8; 32],
    /// Model signature over `pk_d || pk_f || h_f`, 64 B raw `r || s`.
    pub s_m: [u8; 64],
    /// Device signature over `r_d`, 64 B raw `r || s`.
    pub s_d: [u8; 64],
    /// Connect MAC, 32 B.
    pub mac: [u8; 32],
}

impl ConnectResponse {
    /// Self-parse a `ConnectResponse` out of the device's byte stream.
    /// `cert_m`'s length is *not* taken from a two-byte prefix here —
    /// that prefix belongs to the outer vendor frame and is stripped by
    /// the Device Adapter before this function runs, matching 4.4.1
    /// step 1 ("the stream includes a two-byte length prefix for cert_m
    /// because the device frames it non-standardly" — the prefix is
    /// vendor framing, the DER length recovered here is what lets this
    /// function find the end of `cert_m` within the unframed stream).
    pub fn parse(buf: &[u8]) -> Result<Self, SdcpError> {
        const R_D: usize = 32;
        let mut pos = 0usize;

        if buf.len() < R_D {
            return Err(SdcpError::Proto("connect response shorter than r_d"));
        }
        let mut r_d = [0u8; 32];
        r_d.copy_from_slice(&buf[pos..pos + R_D]);
        pos += R_D;

        let cert_len = crypto::cert_encoded_len(&buf[pos..])
            .map_err(|_| SdcpError::Proto("could not recover cert_m length"))?;
        if buf.len() < pos + cert_len {
            return Err(SdcpError::Proto("connect response shorter than cert_m"));
        }
        let cert_m = buf[pos..pos + cert_len].to_vec();
        pos += cert_len;

        const PK: usize = 64;
        const HASH: usize = 32;
        const SIG: usize = 64;
        const MAC: usize = 32;
        let remaining_needed = PK + PK + HASH + SIG + SIG + MAC;
        if buf.len() < pos + remaining_needed {
            return Err(SdcpError::Proto("connect response truncated"));
        }

        let mut pk_d = [0u8; 64];
        pk_d.copy_from_slice(&buf[pos..pos + PK]);
        pos += PK;

        let mut pk_f = [0u8; 64];
        pk_f.copy_from_slice(&buf[pos..pos + PK]);
        pos += PK;

        let mut h_f = [0u8; 32];
        h_f.copy_from_slice(&buf[pos..pos + HASH]);
        pos += HASH;

        let mut s_m = [0u8; 64];
        s_m.copy_from_slice(&buf[pos..pos + SIG]);
        pos += SIG;

        let mut s_d = [0u8; 64];
        s_d.copy_from_slice(&buf[pos..pos + SIG]);
        pos += SIG;

        let mut mac = [0u8; 32];
        mac.copy_from_slice(&buf[pos..pos + MAC]);

        Ok(ConnectResponse {
            r_d,
            cert_m,
            pk_d,
            pk_f,
            h_f,
            s_m,
            s_d,
            mac,
        })
    }
}

/// The verified session material the connect algorithm produces.
pub struct ConnectOutcome {
    pub(crate) master_secret: GuardedKey32,
    pub(crate) application_secret: GuardedKey32,
    pub(crate) application_symmetric_key: GuardedKey32,
}

/// Run the full SDCP connect algorithm (4.4.1, steps 1-7) against
/// already-split components, taking the host's own random and public
/// key as additional inputs. Step 8 (recording connection state) is
/// the caller's (`SdcpSession`'s) responsibility.
#[allow(clippy::too_many_arguments)]
pub fn derive_keys_and_verify_connect_ex(
    r_h: &[u8; 32],
    host_public_key_raw64: &[u8; 64],
    shared_x: impl FnOnce(&[u8; 64]) -> Result<GuardedKey32, SdcpError>,
    response: &ConnectResponse,
    trust_anchor: &TrustAnchor,
) -> Result<ConnectOutcome, SdcpError> {
    // Step 2: cert_m chains to the trust anchor.
    let model_cert = crypto::verify_chain(&response.cert_m, trust_anchor)
        .map_err(|_| SdcpError::DataInvalid("model certificate did not verify"))?;

    // Step 3: Z = ECDH(host_private, pk_d).x
    let z = shared_x(&response.pk_d)?;

    // Step 4: s_m and s_d attestation signatures.
    let mut signed_by_model = Vec::with_capacity(64 + 64 + 32);
    signed_by_model.extend_from_slice(&response.pk_d);
    signed_by_model.extend_from_slice(&response.pk_f);
    signed_by_model.extend_from_slice(&response.h_f);
    crypto::verify_signature(
        &raw64_from_verifying_key(&model_cert.pk_m),
        &signed_by_model,
        &response.s_m,
    )
    .map_err(|_| SdcpError::DataInvalid("model signature did not verify"))?;

    crypto::verify_signature(&response.pk_d, &response.r_d, &response.s_d)
        .map_err(|_| SdcpError::DataInvalid("device signature did not verify"))?;

    // Step 5: MS -> AS -> K_app.
    let master_secret = crypto::derive_master_secret(r_h, &response.r_d, &z);
    let application_secret = crypto::derive_application_secret(&master_secret)
        .map_err(|_| SdcpError::General("session key derivation failed"))?;
    let application_symmetric_key = crypto::derive_symmetric_key(&application_secret)
        .map_err(|_| SdcpError::General("session key derivation failed"))?;

    // Step 6-7: recompute and compare the connect MAC, constant-time.
    let expected = crypto::connect_mac(
        &application_symmetric_key,
        r_h,
        &response.r_d,
        host_public_key_raw64,
        &response.pk_d,
        &response.pk_f,
        &response.h_f,
    );
    if !crypto::ct_eq(&expected, &response.mac) {
        return Err(SdcpError::Proto("secure connection could not be established"));
    }

    Ok(ConnectOutcome {
        master_secret,
        application_secret,
        application_symmetric_key,
    })
}

/// Recover a raw 64-byte `X || Y` point from a `VerifyingKey`, for
/// feeding the model's key into the raw-point signature verifier.
fn raw64_from_verifying_key(key: &p256::ecdsa::VerifyingKey) -> [u8; 64] {
    use p256::elliptic_curve::sec1::ToEncodedPoint;
    let encoded = key.to_encoded_point(false);
    let mut raw = [0u8; 64];
    raw.copy_from_slice(&encoded.as_bytes()[1..]);
    raw
}

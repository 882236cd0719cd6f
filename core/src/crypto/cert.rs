//! Model-certificate parsing and chain verification.
//!
//! The device frames `cert_m` with a non-standard two-byte length
//! prefix; recovering the certificate's own encoded length (by walking
//! its DER structure) is what lets the buffer-form connect verifier
//! know where `cert_m` ends and `pk_d` begins.

use p256::ecdsa::VerifyingKey;
use x509_parser::prelude::{FromDer, X509Certificate};

/// Errors raised while parsing or verifying a model certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CertError {
    /// The DER structure could not be parsed.
    #[error("certificate could not be parsed")]
    Parse,
    /// The certificate's subject public key was not a P-256 point.
    #[error("certificate public key is not a valid P-256 point")]
    BadKey,
    /// The certificate did not verify against the trust anchor.
    #[error("certificate chain did not verify against the trust anchor")]
    ChainInvalid,
    /// The certificate's subject does not match the advertised model.
    #[error("certificate subject does not match the advertised model")]
    ModelMismatch,
}

/// The parsed, chain-verified model certificate: just what the SDCP
/// Session needs from it (the model's P-256 public key `pk_m`).
pub struct ModelCertificate {
    /// The model's signing public key, recovered from the certificate.
    pub pk_m: VerifyingKey,
    /// The certificate subject's common name, if present.
    pub subject_cn: Option<String>,
}

/// The collaborator-provided SDCP model-root trust anchor.
pub struct TrustAnchor {
    /// DER encoding of the root certificate `cert_m` must chain to.
    pub root_certificate_der: Vec<u8>,
    /// If set, `cert_m`'s subject CN must equal this exactly.
    pub expected_model: Option<String>,
}

/// Recover the total DER-encoded length of `cert_m` from the front of
/// `buf`, without verifying anything. Used by the buffer-form connect
/// entry point to know how many bytes `cert_m` occupies.
pub fn cert_encoded_len(buf: &[u8]) -> Result<usize, CertError> {
    let (rem, _cert) = X509Certificate::from_der(buf).map_err(|_| CertError::Parse)?;
    Ok(buf.len() - rem.len())
}

/// Parse and verify `cert_m_der` chains to `anchor`, returning the
/// model's public key on success.
pub fn verify_chain(cert_m_der: &[u8], anchor: &TrustAnchor) -> Result<ModelCertificate, CertError> {
    let (_, root_cert) =
        X509Certificate::from_der(&anchor.root_certificate_der).map_err(|_| CertError::Parse)?;
    let (_, cert) = X509Certificate::from_der(cert_m_der).map_err(|_| CertError::Parse)?;

    cert.verify_signature(Some(root_cert.public_key()))
        .map_err(|_| CertError::ChainInvalid)?;

    let spki = cert.public_key();
    let pk_m = VerifyingKey::from_sec1_bytes(spki.subject_public_key.data.as_ref())
        .map_err(|_| CertError::BadKey)?;

    let subject_cn = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(|s| s.to_string());

    if let Some(expected) = &anchor.expected_model {
        if subject_cn.as_deref() != Some(expected.as_str()) {
            return Err(CertError::ModelMismatch);
        }
    }

    Ok(ModelCertificate { pk_m, subject_cn })
}

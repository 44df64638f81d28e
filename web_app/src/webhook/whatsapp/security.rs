//! Payload signature verification for incoming WhatsApp webhook requests.
//!
//! Meta signs every webhook payload with HMAC-SHA256 keyed by the app secret
//! and sends it in the `X-Hub-Signature-256` header as `sha256=<hex>`.
//!
//! - The signature MUST be computed on the raw request body bytes, not parsed JSON
//! - The comparison must be constant-time

use derive_more::{Display, Error};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[display("signature header is missing")]
    Missing,
    #[display("signature header must start with 'sha256='")]
    InvalidFormat,
    #[display("signature is not valid hex")]
    InvalidHex,
    #[display("app secret can not be used as an hmac key")]
    InvalidKey,
    #[display("signature does not match payload")]
    Mismatch,
}

/// Verifies an `X-Hub-Signature-256` header value against the raw payload.
pub fn verify_signature(
    signature_header: Option<&str>,
    payload: &[u8],
    app_secret: &str,
) -> Result<(), SignatureError> {
    let signature_hex = signature_header
        .ok_or(SignatureError::Missing)?
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::InvalidFormat)?;

    let received = hex::decode(signature_hex).map_err(|_| SignatureError::InvalidHex)?;

    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(payload);
    let computed = mac.finalize().into_bytes();

    if !bool::from(computed.ct_eq(&received[..])) {
        return Err(SignatureError::Mismatch);
    }

    Ok(())
}

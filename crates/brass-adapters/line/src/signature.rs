//! `X-Line-Signature` verification.
//!
//! The header carries `base64(HMAC-SHA256(channel_secret, raw_body))`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use brass_core::{AdapterError, AdapterResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

fn new_mac(secret: &str) -> AdapterResult<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AdapterError::Config(format!("unusable channel secret: {e}")))
}

/// Computes the signature of `body`.
pub fn sign(secret: &str, body: &[u8]) -> AdapterResult<String> {
    let mut mac = new_mac(secret)?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verifies `signature` (the header value) against `body` in constant time.
pub fn verify(secret: &str, body: &[u8], signature: Option<&str>) -> AdapterResult<()> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AdapterError::Signature("missing signature header".into()))?;

    let expected = STANDARD
        .decode(signature)
        .map_err(|_| AdapterError::Signature("signature is not valid base64".into()))?;

    let mut mac = new_mac(secret)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| AdapterError::Signature("signature mismatch".into()))
}

//! §4.3 `handle_mfa`: the original source decodes a QR code out of a
//! screenshot with `pyzbar`, looks for an `otpauth://totp/...?secret=...`
//! payload, and feeds the secret into `pyotp.TOTP(...).now()`. We use
//! `totp-rs`'s `otpauth` URL parser as the direct analog of that last step.

use totp_rs::TOTP;

/// Find the first QR payload that looks like an `otpauth://totp/` URI with a
/// `secret=` parameter (§4.3). Order mirrors whatever order the QR capability
/// returned candidates in.
pub fn find_totp_payload(payloads: &[String]) -> Option<&str> {
    payloads
        .iter()
        .map(|s| s.as_str())
        .find(|p| p.starts_with("otpauth://totp/") && p.contains("secret="))
}

#[derive(Debug, thiserror::Error)]
pub enum TotpError {
    #[error("malformed otpauth payload: {0}")]
    MalformedPayload(String),
    #[error("failed to generate TOTP code: {0}")]
    GenerationFailed(String),
}

/// Parse an `otpauth://totp/...` payload and generate the current code
/// (RFC 6238, the instant it's called).
pub fn generate_totp(payload: &str) -> Result<String, TotpError> {
    let totp = TOTP::from_url(payload).map_err(|e| TotpError::MalformedPayload(e.to_string()))?;
    totp.generate_current()
        .map_err(|e| TotpError::GenerationFailed(e.to_string()))
}

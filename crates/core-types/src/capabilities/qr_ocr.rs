//! §6.3 QR/OCR capabilities (optional). Unavailability degrades `handle_mfa`
//! and `extract_text` to graceful failures rather than exceptions, per the
//! original source's `missing_dependencies` handling.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum QrOcrError {
    #[error("capability unavailable: {0}")]
    Unavailable(String),
    #[error("decode failed: {0}")]
    DecodeFailed(String),
}

#[async_trait]
pub trait QrOcr: Send + Sync {
    /// Decode any QR payloads present in a PNG screenshot.
    async fn decode_qr(&self, png_bytes: &[u8]) -> Result<Vec<String>, QrOcrError>;

    /// Run OCR over a PNG screenshot, returning the recognized text.
    async fn ocr(&self, png_bytes: &[u8]) -> Result<String, QrOcrError>;
}

//! Content digest (§4.2, GLOSSARY): a short hex fingerprint used to detect
//! page changes without full text comparison. Any 128-bit hash is sufficient
//! for this non-cryptographic purpose; we use `md-5` as the literal analog of
//! the original source's `hashlib.md5(...).hexdigest()`.

use md5::{Digest, Md5};

pub fn content_digest(data: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

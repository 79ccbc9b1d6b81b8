use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn verify_sha256(bytes: &[u8], expected_hex: &str) -> Result<bool> {
    let expected = expected_hex.trim();
    if expected.len() != 64 || !expected.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(anyhow!("invalid sha256 hex digest: '{expected_hex}'"));
    }
    Ok(sha256_hex(bytes).eq_ignore_ascii_case(expected))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobDigestCheck {
    Verified,
    Mismatch { actual: String },
    /// Digest algorithm other than sha256; content is not checked.
    Unsupported,
}

/// Checks downloaded blob content against an OCI-style `algorithm:hex` digest.
pub fn verify_blob_digest(bytes: &[u8], digest: &str) -> Result<BlobDigestCheck> {
    let Some((algorithm, expected)) = digest.split_once(':') else {
        return Err(anyhow!("invalid blob digest: '{digest}'"));
    };
    if algorithm != "sha256" {
        return Ok(BlobDigestCheck::Unsupported);
    }

    if verify_sha256(bytes, expected)? {
        Ok(BlobDigestCheck::Verified)
    } else {
        Ok(BlobDigestCheck::Mismatch {
            actual: format!("sha256:{}", sha256_hex(bytes)),
        })
    }
}

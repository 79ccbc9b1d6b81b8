mod checksum;

pub use checksum::{sha256_hex, verify_blob_digest, verify_sha256, BlobDigestCheck};

use sha2::{Digest, Sha256};

/// Returns the hex encoded SHA-256 digest of `bytes`.
///
/// Used as a change-token for rendered configuration, not for anything security relevant.
pub fn sha256sum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

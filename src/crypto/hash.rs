use sha2::{Digest, Sha256};

/// SHA-256 digest length in bytes
pub const SHA256_LEN: usize = 32;

/// Quick SHA256 hash function
pub fn sha256(data: &[u8]) -> [u8; SHA256_LEN] {
    Sha256::digest(data).into()
}

/// SHA256 over the concatenation of several pieces, without copying them together
pub fn sha256_all(data: &[&[u8]]) -> [u8; SHA256_LEN] {
    let mut hasher = Sha256::new();
    for piece in data {
        hasher.update(piece);
    }
    hasher.finalize().into()
}

//! Hashing utilities for CardVault

use sha3::{Digest, Keccak256};

/// Compute Keccak-256 of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Compute Keccak-256 over the concatenation of several items
pub fn keccak256_all(items: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for item in items {
        hasher.update(item);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        // Well-known digest of the empty input
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak256_all_matches_concatenation() {
        let joined = keccak256(b"card-vault");
        let parts = keccak256_all(&[&b"card"[..], &b"-"[..], &b"vault"[..]]);
        assert_eq!(joined, parts);
    }
}

// Cryptographic Hashing Wrappers
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// SHA-256: transaction hashes, merkle tree nodes, address digests and the
/// deterministic genesis hash.
pub fn hash_sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 Concat: hashes a then b without allocating a temporary Vec
pub fn hash_sha256_concat(a: &[u8], b: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(a);
    hasher.update(b);
    hasher.finalize().into()
}

/// Blake3: used exclusively for proof-of-work candidate hashing.
pub fn hash_blake3(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// HMAC-SHA256 keyed digest. Derives the per-algorithm signing seeds from
/// the wallet's master entropy.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_length() {
        let hash = hash_sha256(b"bastille");
        assert_eq!(hash.len(), 32);
    }

    #[test]
    fn test_sha256_concat_matches_joined() {
        assert_eq!(hash_sha256(b"ab"), hash_sha256_concat(b"a", b"b"));
    }

    #[test]
    fn test_blake3_differs_from_sha256() {
        assert_ne!(hash_blake3(b"bastille"), hash_sha256(b"bastille"));
    }

    #[test]
    fn test_hmac_is_keyed() {
        let a = hmac_sha256(b"key-a", b"msg");
        let b = hmac_sha256(b"key-b", b"msg");
        assert_ne!(a, b);
    }
}

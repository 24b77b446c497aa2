// SPHINCS+-SHAKE-128f (SLH-DSA-SHAKE-128f) Digital Signatures — NIST FIPS 205
//
// Stateless hash-based signatures: large and slow, but with security
// assumptions independent of the two lattice schemes. Third leg of the
// 2-of-3 threshold.
//
// Key sizes (fips205 reference implementation):
//   Public key  : 32 bytes
//   Secret key  : 64 bytes
//   Signature   : 17,088 bytes

use fips205::slh_dsa_shake_128f;
use fips205::traits::{SerDes, Signer, Verifier};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

pub const SPHINCS_PUBKEY_BYTES: usize = 32;
pub const SPHINCS_PRIVKEY_BYTES: usize = 64;
pub const SPHINCS_SIG_BYTES: usize = 17_088;

#[derive(Clone)]
pub struct PublicKey(pub [u8; SPHINCS_PUBKEY_BYTES]);

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({SPHINCS_PUBKEY_BYTES} bytes)")
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[derive(Clone)]
pub struct SecretKey(pub [u8; SPHINCS_PRIVKEY_BYTES]);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// Generates a SPHINCS+ keypair deterministically from a 32-byte seed.
pub fn generate_keypair(seed: &[u8; 32]) -> Result<(PublicKey, SecretKey), &'static str> {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    let (fips_pk, fips_sk) = slh_dsa_shake_128f::try_keygen_with_rng(&mut rng)?;
    Ok((PublicKey(fips_pk.into_bytes()), SecretKey(fips_sk.into_bytes())))
}

/// Signs a message (hedged variant), producing a detached signature.
pub fn sign(message: &[u8], sk: &SecretKey) -> Result<Box<[u8; SPHINCS_SIG_BYTES]>, &'static str> {
    let fips_sk = slh_dsa_shake_128f::PrivateKey::try_from_bytes(&sk.0)?;
    let sig = fips_sk.try_sign(message, &[], true)?;
    Ok(Box::new(sig))
}

/// Verifies a detached signature. Returns false on any malformed input —
/// never panics.
pub fn verify(message: &[u8], sig: &[u8], pk: &PublicKey) -> bool {
    let fips_pk = match slh_dsa_shake_128f::PublicKey::try_from_bytes(&pk.0) {
        Ok(k) => k,
        Err(_) => return false,
    };
    let sig: [u8; SPHINCS_SIG_BYTES] = match sig.try_into() {
        Ok(s) => s,
        Err(_) => return false,
    };
    fips_pk.verify(message, &sig, &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let (pk, sk) = generate_keypair(&[3u8; 32]).unwrap();
        let msg = b"bastille sphincs";
        let sig = sign(msg, &sk).unwrap();
        assert!(verify(msg, sig.as_slice(), &pk));
        assert!(!verify(b"other message", sig.as_slice(), &pk));
    }

    #[test]
    fn test_corrupted_signature_rejected() {
        let (pk, sk) = generate_keypair(&[3u8; 32]).unwrap();
        let msg = b"bastille";
        let mut sig = sign(msg, &sk).unwrap();
        sig[1000] ^= 0xFF;
        assert!(!verify(msg, sig.as_slice(), &pk));
    }

    #[test]
    fn test_deterministic_keygen() {
        let (pk1, _) = generate_keypair(&[5u8; 32]).unwrap();
        let (pk2, _) = generate_keypair(&[5u8; 32]).unwrap();
        assert_eq!(pk1.0, pk2.0);
    }
}

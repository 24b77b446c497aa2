// Dilithium2 (ML-DSA-44) Digital Signatures — NIST FIPS 204
//
// Lattice-based signature scheme, NIST Security Level 2. One of the three
// schemes in the 2-of-3 account signature threshold.
//
// Key sizes (fips204 reference implementation):
//   Public key  : 1,312 bytes
//   Secret key  : 2,560 bytes
//   Signature   : 2,420 bytes
//
// Key generation is deterministic from a 32-byte seed: the seed feeds a
// ChaCha20 RNG, so the same wallet entropy always reproduces the same keys.

use fips204::ml_dsa_44;
use fips204::traits::{SerDes, Signer, Verifier};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

pub const DILITHIUM_PUBKEY_BYTES: usize = 1312;
pub const DILITHIUM_PRIVKEY_BYTES: usize = 2560;
pub const DILITHIUM_SIG_BYTES: usize = 2420;

#[derive(Clone)]
pub struct PublicKey(pub [u8; DILITHIUM_PUBKEY_BYTES]);

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({DILITHIUM_PUBKEY_BYTES} bytes)")
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

#[derive(Clone)]
pub struct SecretKey(pub [u8; DILITHIUM_PRIVKEY_BYTES]);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// Generates a Dilithium2 keypair deterministically from a 32-byte seed.
pub fn generate_keypair(seed: &[u8; 32]) -> Result<(PublicKey, SecretKey), &'static str> {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    let (fips_pk, fips_sk) = ml_dsa_44::try_keygen_with_rng(&mut rng)?;
    Ok((PublicKey(fips_pk.into_bytes()), SecretKey(fips_sk.into_bytes())))
}

/// Signs a message, producing a detached signature.
pub fn sign(message: &[u8], sk: &SecretKey) -> Result<[u8; DILITHIUM_SIG_BYTES], &'static str> {
    let fips_sk = ml_dsa_44::PrivateKey::try_from_bytes(sk.0)?;
    fips_sk.try_sign(message, &[])
}

/// Verifies a detached signature. Returns false on any malformed input —
/// never panics.
pub fn verify(message: &[u8], sig: &[u8], pk: &PublicKey) -> bool {
    let fips_pk = match ml_dsa_44::PublicKey::try_from_bytes(pk.0) {
        Ok(k) => k,
        Err(_) => return false,
    };
    let sig: [u8; DILITHIUM_SIG_BYTES] = match sig.try_into() {
        Ok(s) => s,
        Err(_) => return false,
    };
    fips_pk.verify(message, &sig, &[])
}

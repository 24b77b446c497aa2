// Falcon-512 Digital Signatures
//
// NTRU-lattice signature scheme with compact signatures; the second scheme
// of the 2-of-3 threshold. fn-dsa takes a caller-supplied RNG, which gives
// us deterministic keygen from wallet entropy.
//
// Key sizes:
//   Verifying key : 897 bytes
//   Signing key   : 1,281 bytes
//   Signature     : 666 bytes (padded format)

use fn_dsa::{
    DOMAIN_NONE, FN_DSA_LOGN_512, HASH_ID_RAW, KeyPairGenerator, KeyPairGeneratorStandard,
    SigningKey, SigningKeyStandard, VerifyingKey, VerifyingKeyStandard, sign_key_size,
    signature_size, vrfy_key_size,
};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

pub const FALCON_PUBKEY_BYTES: usize = vrfy_key_size(FN_DSA_LOGN_512);
pub const FALCON_PRIVKEY_BYTES: usize = sign_key_size(FN_DSA_LOGN_512);
pub const FALCON_SIG_BYTES: usize = signature_size(FN_DSA_LOGN_512);

#[derive(Clone)]
pub struct PublicKey(pub [u8; FALCON_PUBKEY_BYTES]);

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({FALCON_PUBKEY_BYTES} bytes)")
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

#[derive(Clone)]
pub struct SecretKey(pub [u8; FALCON_PRIVKEY_BYTES]);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// Generates a Falcon-512 keypair deterministically from a 32-byte seed.
pub fn generate_keypair(seed: &[u8; 32]) -> Result<(PublicKey, SecretKey), &'static str> {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    let mut kg = KeyPairGeneratorStandard::default();
    let mut sign_key = [0u8; FALCON_PRIVKEY_BYTES];
    let mut vrfy_key = [0u8; FALCON_PUBKEY_BYTES];
    kg.keygen(FN_DSA_LOGN_512, &mut rng, &mut sign_key, &mut vrfy_key);
    Ok((PublicKey(vrfy_key), SecretKey(sign_key)))
}

/// Signs a message. Falcon signing is randomized; a fresh ChaCha20 RNG is
/// seeded from OS entropy for each signature.
pub fn sign(message: &[u8], sk: &SecretKey) -> Result<[u8; FALCON_SIG_BYTES], &'static str> {
    let mut signer = SigningKeyStandard::decode(&sk.0).ok_or("invalid Falcon signing key")?;
    let mut seed = [0u8; 32];
    getrandom::getrandom(&mut seed).map_err(|_| "RNG failure")?;
    let mut rng = ChaCha20Rng::from_seed(seed);
    let mut sig = [0u8; FALCON_SIG_BYTES];
    signer.sign(&mut rng, &DOMAIN_NONE, &HASH_ID_RAW, message, &mut sig);
    Ok(sig)
}

/// Verifies a signature. Returns false on any malformed input — never panics.
pub fn verify(message: &[u8], sig: &[u8], pk: &PublicKey) -> bool {
    if sig.len() != FALCON_SIG_BYTES {
        return false;
    }
    match VerifyingKeyStandard::decode(&pk.0) {
        Some(vk) => vk.verify(sig, &DOMAIN_NONE, &HASH_ID_RAW, message),
        None => false,
    }
}

// Key Derivation, 2-of-3 Threshold Signatures and Address Management
//
// A wallet is a 32-byte master entropy. Each signature algorithm gets its
// own seed via HMAC-SHA256(entropy, algorithm-name), so one mnemonic always
// reproduces the same Dilithium2 / Falcon-512 / SPHINCS+ triple.
//
// A transaction is authentic iff at least two of the three schemes verify.

use serde::{Deserialize, Serialize};

use crate::crypto::hash::{hash_sha256, hmac_sha256};
use crate::crypto::{dilithium, falcon, sphincs};

pub const ADDRESS_DIGEST_BYTES: usize = 20;
pub const ADDRESS_HEX_CHARS: usize = 2 * ADDRESS_DIGEST_BYTES;

const ALGO_DILITHIUM: &str = "dilithium";
const ALGO_FALCON: &str = "falcon";
const ALGO_SPHINCS: &str = "sphincs";

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key generation failed: {0}")]
    Keygen(&'static str),
    #[error("signing failed: {0}")]
    Sign(&'static str),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address prefix")]
    InvalidPrefix,
    #[error("invalid address length")]
    InvalidLength,
    #[error("address suffix is not lowercase hex")]
    InvalidEncoding,
}

/// Per-algorithm signing seed: HMAC-SHA256 keyed by the master entropy over
/// the algorithm's ASCII name.
pub fn derive_algorithm_seed(entropy: &[u8; 32], algorithm: &str) -> [u8; 32] {
    hmac_sha256(entropy, algorithm.as_bytes())
}

/// The three public keys bound to an account address.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicKeyTriple {
    pub dilithium: dilithium::PublicKey,
    pub falcon: falcon::PublicKey,
    pub sphincs: sphincs::PublicKey,
}

impl PublicKeyTriple {
    pub fn from_bytes(d: &[u8], f: &[u8], s: &[u8]) -> Result<Self, &'static str> {
        Ok(PublicKeyTriple {
            dilithium: dilithium::PublicKey(
                d.try_into().map_err(|_| "invalid Dilithium public key length")?,
            ),
            falcon: falcon::PublicKey(
                f.try_into().map_err(|_| "invalid Falcon public key length")?,
            ),
            sphincs: sphincs::PublicKey(
                s.try_into().map_err(|_| "invalid SPHINCS+ public key length")?,
            ),
        })
    }

    /// Address digest: first 20 bytes of SHA-256(pub_d ‖ pub_f ‖ pub_s).
    pub fn digest(&self) -> [u8; ADDRESS_DIGEST_BYTES] {
        let mut buf =
            Vec::with_capacity(self.dilithium.0.len() + self.falcon.0.len() + self.sphincs.0.len());
        buf.extend_from_slice(&self.dilithium.0);
        buf.extend_from_slice(&self.falcon.0);
        buf.extend_from_slice(&self.sphincs.0);
        let hash = hash_sha256(&buf);
        let mut digest = [0u8; ADDRESS_DIGEST_BYTES];
        digest.copy_from_slice(&hash[..ADDRESS_DIGEST_BYTES]);
        digest
    }
}

/// The full signing identity derived from one master entropy.
pub struct Keyring {
    pub public: PublicKeyTriple,
    dilithium_sk: dilithium::SecretKey,
    falcon_sk: falcon::SecretKey,
    sphincs_sk: sphincs::SecretKey,
}

impl std::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keyring(secret material redacted)")
    }
}

impl Keyring {
    pub fn from_entropy(entropy: &[u8; 32]) -> Result<Self, KeyError> {
        let (d_pk, d_sk) =
            dilithium::generate_keypair(&derive_algorithm_seed(entropy, ALGO_DILITHIUM))
                .map_err(KeyError::Keygen)?;
        let (f_pk, f_sk) = falcon::generate_keypair(&derive_algorithm_seed(entropy, ALGO_FALCON))
            .map_err(KeyError::Keygen)?;
        let (s_pk, s_sk) = sphincs::generate_keypair(&derive_algorithm_seed(entropy, ALGO_SPHINCS))
            .map_err(KeyError::Keygen)?;
        Ok(Keyring {
            public: PublicKeyTriple { dilithium: d_pk, falcon: f_pk, sphincs: s_pk },
            dilithium_sk: d_sk,
            falcon_sk: f_sk,
            sphincs_sk: s_sk,
        })
    }

    pub fn address(&self, prefix: &str) -> String {
        derive_address(prefix, &self.public)
    }

    /// Signs a message with all three schemes.
    pub fn sign(&self, message: &[u8]) -> Result<ThresholdSignature, KeyError> {
        let d = dilithium::sign(message, &self.dilithium_sk).map_err(KeyError::Sign)?;
        let f = falcon::sign(message, &self.falcon_sk).map_err(KeyError::Sign)?;
        let s = sphincs::sign(message, &self.sphincs_sk).map_err(KeyError::Sign)?;
        Ok(ThresholdSignature {
            dilithium: d.to_vec(),
            falcon: f.to_vec(),
            sphincs: s.to_vec(),
        })
    }
}

/// One signature per scheme over the same signing message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSignature {
    #[serde(with = "serde_bytes")]
    pub dilithium: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub falcon: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub sphincs: Vec<u8>,
}

/// 2-of-3 verification: authentic iff at least two schemes accept.
pub fn verify_threshold(
    message: &[u8],
    sig: &ThresholdSignature,
    keys: &PublicKeyTriple,
) -> bool {
    let mut valid = 0u32;
    if dilithium::verify(message, &sig.dilithium, &keys.dilithium) {
        valid += 1;
    }
    if falcon::verify(message, &sig.falcon, &keys.falcon) {
        valid += 1;
    }
    if valid < 2 && sphincs::verify(message, &sig.sphincs, &keys.sphincs) {
        valid += 1;
    }
    valid >= 2
}

/// address = prefix ‖ lowercase-hex(SHA-256(pub_d ‖ pub_f ‖ pub_s)[0..20])
pub fn derive_address(prefix: &str, keys: &PublicKeyTriple) -> String {
    format!("{prefix}{}", hex::encode(keys.digest()))
}

/// Checks the standard address shape: `prefix` + 40 lowercase hex chars.
pub fn is_valid_address(prefix: &str, addr: &str) -> bool {
    decode_address(prefix, addr).is_ok()
}

/// Recovers the 20-byte digest from an address string.
pub fn decode_address(prefix: &str, addr: &str) -> Result<[u8; ADDRESS_DIGEST_BYTES], AddressError> {
    if addr.len() != prefix.len() + ADDRESS_HEX_CHARS {
        return Err(AddressError::InvalidLength);
    }
    let suffix = addr.strip_prefix(prefix).ok_or(AddressError::InvalidPrefix)?;
    if !suffix.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
        return Err(AddressError::InvalidEncoding);
    }
    let bytes = hex::decode(suffix).map_err(|_| AddressError::InvalidEncoding)?;
    let mut digest = [0u8; ADDRESS_DIGEST_BYTES];
    digest.copy_from_slice(&bytes);
    Ok(digest)
}

/// The coinbase source sentinel, `"<prefix>Genesis"`. Only ever valid as the
/// `from` of a coinbase transaction.
pub fn genesis_source(prefix: &str) -> String {
    format!("{prefix}Genesis")
}

pub fn is_genesis_source(prefix: &str, addr: &str) -> bool {
    addr == genesis_source(prefix)
}

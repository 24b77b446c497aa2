// Data Structures: Transaction
use crate::crypto::hash::hash_sha256;
use crate::crypto::keys::{
    self, Keyring, PublicKeyTriple, ThresholdSignature, verify_threshold,
};
use crate::crypto::{dilithium, falcon, sphincs};

pub const JUILLETS_PER_BAST: u64 = 100_000_000_000_000; // 10^14
pub const BLOCK_REWARD: u64 = 1789 * JUILLETS_PER_BAST;

pub const DEFAULT_FEE_PER_BYTE: u64 = 10_000;
pub const DEFAULT_MIN_FEE: u64 = 100_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TxError {
    #[error("invalid transaction structure: {0}")]
    InvalidTransactionStructure(&'static str),
    #[error("transaction hash does not match contents")]
    InvalidHash,
    #[error("bad address format: {0}")]
    BadAddressFormat(String),
    #[error("fewer than two of three signature schemes verify")]
    InvalidSignature,
    #[error("no public keys known for {0}")]
    PublicKeysMissing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureType {
    Regular,
    Coinbase,
}

impl SignatureType {
    /// The ASCII tag hashed into the transaction preimage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureType::Regular => "Regular",
            SignatureType::Coinbase => "Coinbase",
        }
    }
}

/// A single-asset transfer between two account addresses, or a coinbase
/// minting the block reward. Regular transactions carry the sender's three
/// public keys so first-time senders can be verified and registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u64,
    pub timestamp: i64,
    pub data: Vec<u8>,
    pub signature_type: SignatureType,
    pub signature: Option<ThresholdSignature>,
    pub public_keys: Option<PublicKeyTriple>,
    pub hash: [u8; 32],
}

impl Transaction {
    /// Canonical hash preimage:
    /// from ‖ to ‖ u64_be(amount) ‖ u32_be(fee) ‖ u64_be(nonce) ‖
    /// u64_be(timestamp) ‖ data ‖ ascii(signature_type)
    pub fn hash_preimage(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.from.len() + self.to.len() + self.data.len() + 40);
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(&(self.fee as u32).to_be_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&(self.timestamp as u64).to_be_bytes());
        buf.extend_from_slice(&self.data);
        buf.extend_from_slice(self.signature_type.as_str().as_bytes());
        buf
    }

    pub fn compute_hash(&self) -> [u8; 32] {
        hash_sha256(&self.hash_preimage())
    }

    /// Signing message, kept short so three PQ schemes sign quickly:
    /// from ‖ to ‖ u64_be(amount) ‖ u64_be(nonce) ‖ u64_be(timestamp)
    pub fn signing_message(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.from.len() + self.to.len() + 24);
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&(self.timestamp as u64).to_be_bytes());
        buf
    }

    /// Canonical serialized size with all signatures and public keys at
    /// their fixed lengths. Stable before signing, which lets the fee be
    /// part of the hashed contents.
    pub fn estimated_size(&self) -> usize {
        self.hash_preimage().len()
            + dilithium::DILITHIUM_SIG_BYTES
            + falcon::FALCON_SIG_BYTES
            + sphincs::SPHINCS_SIG_BYTES
            + dilithium::DILITHIUM_PUBKEY_BYTES
            + falcon::FALCON_PUBKEY_BYTES
            + sphincs::SPHINCS_PUBKEY_BYTES
            + 64
    }

    /// fee = max(min_fee, size_bytes × fee_per_byte)
    pub fn required_fee(size_bytes: usize, fee_per_byte: u64, min_fee: u64) -> u64 {
        (size_bytes as u64).saturating_mul(fee_per_byte).max(min_fee)
    }

    /// Builds a coinbase transaction. `from` is the sentinel
    /// `"<prefix>Genesis"`, the fee is zero and there is no signature.
    pub fn coinbase(prefix: &str, to: String, amount: u64, timestamp: i64, data: Vec<u8>) -> Self {
        let mut tx = Transaction {
            from: keys::genesis_source(prefix),
            to,
            amount,
            fee: 0,
            nonce: 0,
            timestamp,
            data,
            signature_type: SignatureType::Coinbase,
            signature: None,
            public_keys: None,
            hash: [0u8; 32],
        };
        tx.hash = tx.compute_hash();
        tx
    }

    /// Builds and signs a regular transfer. The caller-independent fee
    /// schedule is applied regardless of any requested fee.
    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        keyring: &Keyring,
        prefix: &str,
        to: String,
        amount: u64,
        nonce: u64,
        timestamp: i64,
        data: Vec<u8>,
        fee_per_byte: u64,
        min_fee: u64,
    ) -> Result<Self, TxError> {
        let mut tx = Transaction {
            from: keyring.address(prefix),
            to,
            amount,
            fee: 0,
            nonce,
            timestamp,
            data,
            signature_type: SignatureType::Regular,
            signature: None,
            public_keys: Some(keyring.public.clone()),
            hash: [0u8; 32],
        };
        tx.fee = Self::required_fee(tx.estimated_size(), fee_per_byte, min_fee);
        let sig = keyring
            .sign(&tx.signing_message())
            .map_err(|_| TxError::InvalidTransactionStructure("signing failed"))?;
        tx.signature = Some(sig);
        tx.hash = tx.compute_hash();
        Ok(tx)
    }

    pub fn is_coinbase(&self) -> bool {
        self.signature_type == SignatureType::Coinbase
    }

    /// Structural checks only; state (balance, nonce, stored keys) is the
    /// chain engine's concern.
    pub fn validate_structure(&self, prefix: &str) -> Result<(), TxError> {
        if self.hash != self.compute_hash() {
            return Err(TxError::InvalidHash);
        }
        if self.amount.checked_add(self.fee).is_none() {
            return Err(TxError::InvalidTransactionStructure("amount + fee overflows"));
        }
        match self.signature_type {
            SignatureType::Coinbase => {
                if !keys::is_genesis_source(prefix, &self.from) {
                    return Err(TxError::BadAddressFormat(self.from.clone()));
                }
                if self.fee != 0 {
                    return Err(TxError::InvalidTransactionStructure("coinbase fee must be zero"));
                }
                if !keys::is_valid_address(prefix, &self.to) {
                    return Err(TxError::BadAddressFormat(self.to.clone()));
                }
            }
            SignatureType::Regular => {
                if !keys::is_valid_address(prefix, &self.from) {
                    return Err(TxError::BadAddressFormat(self.from.clone()));
                }
                if !keys::is_valid_address(prefix, &self.to) {
                    return Err(TxError::BadAddressFormat(self.to.clone()));
                }
                if self.signature.is_none() {
                    return Err(TxError::InvalidTransactionStructure("missing signature"));
                }
                if let Some(embedded) = &self.public_keys
                    && keys::derive_address(prefix, embedded) != self.from
                {
                    return Err(TxError::InvalidTransactionStructure(
                        "embedded public keys do not match sender address",
                    ));
                }
            }
        }
        Ok(())
    }

    /// 2-of-3 verification of the signing message against a key triple.
    pub fn verify_signature(&self, keys: &PublicKeyTriple) -> Result<(), TxError> {
        let sig = self.signature.as_ref().ok_or(TxError::InvalidSignature)?;
        if verify_threshold(&self.signing_message(), sig, keys) {
            Ok(())
        } else {
            Err(TxError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyring() -> Keyring {
        Keyring::from_entropy(&[21u8; 32]).unwrap()
    }

    fn recipient() -> String {
        format!("1789{}", hex::encode([0xEEu8; 20]))
    }

    #[test]
    fn test_transfer_hash_and_fee() {
        let ring = keyring();
        let tx = Transaction::transfer(
            &ring,
            "1789",
            recipient(),
            JUILLETS_PER_BAST,
            1,
            1_700_000_000,
            Vec::new(),
            DEFAULT_FEE_PER_BYTE,
            DEFAULT_MIN_FEE,
        )
        .unwrap();

        assert_eq!(tx.hash, tx.compute_hash());
        assert_eq!(
            tx.fee,
            Transaction::required_fee(tx.estimated_size(), DEFAULT_FEE_PER_BYTE, DEFAULT_MIN_FEE)
        );
        assert!(tx.fee >= DEFAULT_MIN_FEE);
        tx.validate_structure("1789").unwrap();
        tx.verify_signature(&ring.public).unwrap();
    }

    #[test]
    fn test_min_fee_floor() {
        assert_eq!(Transaction::required_fee(1, 10_000, 100_000), 100_000);
        assert_eq!(Transaction::required_fee(100, 10_000, 100_000), 1_000_000);
    }

    #[test]
    fn test_mutation_invalidates_hash() {
        let ring = keyring();
        let mut tx = Transaction::transfer(
            &ring,
            "1789",
            recipient(),
            5,
            1,
            1_700_000_000,
            Vec::new(),
            DEFAULT_FEE_PER_BYTE,
            DEFAULT_MIN_FEE,
        )
        .unwrap();
        tx.amount = 6;
        assert_eq!(tx.validate_structure("1789"), Err(TxError::InvalidHash));
    }

    #[test]
    fn test_two_of_three_on_transaction() {
        let ring = keyring();
        let mut tx = Transaction::transfer(
            &ring,
            "1789",
            recipient(),
            5,
            1,
            1_700_000_000,
            Vec::new(),
            DEFAULT_FEE_PER_BYTE,
            DEFAULT_MIN_FEE,
        )
        .unwrap();

        // One corrupted leg still verifies.
        tx.signature.as_mut().unwrap().sphincs[0] ^= 0xFF;
        tx.verify_signature(&ring.public).unwrap();

        // Two corrupted legs do not.
        tx.signature.as_mut().unwrap().dilithium[0] ^= 0xFF;
        assert_eq!(tx.verify_signature(&ring.public), Err(TxError::InvalidSignature));
    }

    #[test]
    fn test_coinbase_structure() {
        let tx = Transaction::coinbase(
            "1789",
            recipient(),
            BLOCK_REWARD,
            1_700_000_000,
            Vec::new(),
        );
        assert_eq!(tx.from, "1789Genesis");
        assert_eq!(tx.fee, 0);
        assert!(tx.is_coinbase());
        tx.validate_structure("1789").unwrap();
    }

    #[test]
    fn test_foreign_pubkeys_rejected() {
        let ring = keyring();
        let other = Keyring::from_entropy(&[22u8; 32]).unwrap();
        let mut tx = Transaction::transfer(
            &ring,
            "1789",
            recipient(),
            5,
            1,
            1_700_000_000,
            Vec::new(),
            DEFAULT_FEE_PER_BYTE,
            DEFAULT_MIN_FEE,
        )
        .unwrap();
        tx.public_keys = Some(other.public.clone());
        // Hash does not cover keys, so the binding check has to catch this.
        assert!(matches!(
            tx.validate_structure("1789"),
            Err(TxError::InvalidTransactionStructure(_))
        ));
    }
}

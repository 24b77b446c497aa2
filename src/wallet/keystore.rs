// Wallet keystore — plaintext JSON persistence of the wallet identity.
//
// The file holds the mnemonic, the raw entropy and the derived address.
// Keys are not stored: they re-derive deterministically from the entropy.
// Writes go through a temp file + rename so a crash never leaves a
// half-written wallet.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::keys::{KeyError, Keyring};
use crate::crypto::mnemonic::{self, MnemonicError};

pub const WALLET_FILE: &str = "wallet_keys.json";

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("malformed wallet file: {0}")]
    Format(#[from] serde_json::Error),
    #[error("corrupt wallet file: {0}")]
    Corrupt(&'static str),
}

#[derive(Serialize, Deserialize)]
struct WalletFileV1 {
    version: u32,
    mnemonic: String,
    entropy: String,
    address: String,
}

pub struct Wallet {
    pub entropy: [u8; 32],
    pub mnemonic: String,
    pub keyring: Keyring,
    pub address: String,
}

impl Wallet {
    pub fn create(prefix: &str) -> Result<Self, WalletError> {
        Self::from_entropy(mnemonic::generate_entropy()?, prefix)
    }

    pub fn from_entropy(entropy: [u8; 32], prefix: &str) -> Result<Self, WalletError> {
        let keyring = Keyring::from_entropy(&entropy)?;
        let address = keyring.address(prefix);
        Ok(Wallet { entropy, mnemonic: mnemonic::to_mnemonic(&entropy), keyring, address })
    }

    pub fn from_mnemonic(phrase: &str, prefix: &str) -> Result<Self, WalletError> {
        Self::from_entropy(mnemonic::from_mnemonic(phrase)?, prefix)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WalletError> {
        let record = WalletFileV1 {
            version: 1,
            mnemonic: self.mnemonic.clone(),
            entropy: hex::encode(self.entropy),
            address: self.address.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;

        let path = path.as_ref();
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, WalletError> {
        let record: WalletFileV1 = serde_json::from_str(&fs::read_to_string(path)?)?;
        let entropy_bytes =
            hex::decode(&record.entropy).map_err(|_| WalletError::Corrupt("entropy is not hex"))?;
        let entropy: [u8; 32] = entropy_bytes
            .as_slice()
            .try_into()
            .map_err(|_| WalletError::Corrupt("entropy must be 32 bytes"))?;

        let wallet = Self::from_entropy(entropy, prefix)?;
        if wallet.mnemonic != record.mnemonic {
            return Err(WalletError::Corrupt("mnemonic does not match entropy"));
        }
        if wallet.address != record.address {
            return Err(WalletError::Corrupt("address does not match derived keys"));
        }
        Ok(wallet)
    }

    /// Load the wallet at `path`, or create and persist a fresh one.
    pub fn load_or_create<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, WalletError> {
        let path = path.as_ref();
        if path.exists() {
            Wallet::load(path, prefix)
        } else {
            let wallet = Wallet::create(prefix)?;
            wallet.save(path)?;
            Ok(wallet)
        }
    }
}

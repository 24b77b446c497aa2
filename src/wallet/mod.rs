pub mod keystore;

pub use keystore::{Wallet, WalletError};

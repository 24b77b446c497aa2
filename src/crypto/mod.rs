pub mod dilithium;
pub mod falcon;
pub mod hash;
pub mod keys;
pub mod mnemonic;
pub mod sphincs;
pub mod wordlist;

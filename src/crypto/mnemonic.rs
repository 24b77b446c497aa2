// 24-word mnemonic encoding of the 32-byte wallet entropy.
//
// BIP-39 style: entropy (256 bits) + 8-bit checksum (first byte of
// SHA-256(entropy)) chopped into 24 × 11-bit indices into the 2048-word
// list. Decoding is the exact inverse and rejects bad checksums and
// unknown words.

use crate::crypto::hash::hash_sha256;
use crate::crypto::wordlist::ENGLISH;

pub const MNEMONIC_WORDS: usize = 24;
pub const ENTROPY_BYTES: usize = 32;

const TOTAL_BITS: usize = ENTROPY_BYTES * 8 + 8; // 256 entropy + 8 checksum

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("expected {MNEMONIC_WORDS} words, got {0}")]
    WordCount(usize),
    #[error("unknown word: {0}")]
    UnknownWord(String),
    #[error("checksum mismatch")]
    Checksum,
    #[error("RNG failure")]
    Rng,
}

/// Fresh 32-byte master entropy from the OS RNG.
pub fn generate_entropy() -> Result<[u8; ENTROPY_BYTES], MnemonicError> {
    let mut entropy = [0u8; ENTROPY_BYTES];
    getrandom::getrandom(&mut entropy).map_err(|_| MnemonicError::Rng)?;
    Ok(entropy)
}

/// Encodes entropy as a 24-word phrase.
pub fn to_mnemonic(entropy: &[u8; ENTROPY_BYTES]) -> String {
    let checksum = hash_sha256(entropy)[0];

    let mut bits = Vec::with_capacity(TOTAL_BITS);
    for byte in entropy.iter().chain(std::iter::once(&checksum)) {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1);
        }
    }

    let mut words = Vec::with_capacity(MNEMONIC_WORDS);
    for chunk in bits.chunks(11) {
        let mut index = 0usize;
        for (i, bit) in chunk.iter().enumerate() {
            if *bit == 1 {
                index |= 1 << (10 - i);
            }
        }
        words.push(ENGLISH[index]);
    }
    words.join(" ")
}

/// Decodes a 24-word phrase back to entropy, verifying the checksum.
pub fn from_mnemonic(phrase: &str) -> Result<[u8; ENTROPY_BYTES], MnemonicError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(MnemonicError::WordCount(words.len()));
    }

    let mut bits = Vec::with_capacity(TOTAL_BITS);
    for word in words {
        // The list is alphabetical, so index lookup is a binary search.
        let index = ENGLISH
            .binary_search(&word)
            .map_err(|_| MnemonicError::UnknownWord(word.to_string()))?;
        for i in (0..11).rev() {
            bits.push(((index >> i) & 1) as u8);
        }
    }

    let mut entropy = [0u8; ENTROPY_BYTES];
    for (i, chunk) in bits[..ENTROPY_BYTES * 8].chunks(8).enumerate() {
        let mut byte = 0u8;
        for (j, bit) in chunk.iter().enumerate() {
            byte |= bit << (7 - j);
        }
        entropy[i] = byte;
    }

    let mut checksum = 0u8;
    for (j, bit) in bits[ENTROPY_BYTES * 8..].iter().enumerate() {
        checksum |= bit << (7 - j);
    }
    if checksum != hash_sha256(&entropy)[0] {
        return Err(MnemonicError::Checksum);
    }

    Ok(entropy)
}

//! Proof of work: find or check a nonce whose header hash falls below the target
//!
//! The target is `2^(256 - difficulty_bits)`, fixed when the engine is built.
//! The header preimage is the string rendering of `prev_block_hash`,
//! `merkle_root`, `timestamp`, `height` and `nonce`, concatenated in that order.

use log::{info, trace, warn};
use std::time::{Duration, Instant};

use crate::block::BlockHeader;
use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::hash::sha256_hex;

/// A nonce that satisfies the target, with the search statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowSolution {
    pub nonce: u64,
    pub hash: String,
    pub attempts: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ProofOfWork {
    difficulty_bits: u32,
    target: U256,
    max_nonce: u64,
}

impl ProofOfWork {
    /// Build an engine for `difficulty_bits` in `1..=256`
    pub fn new(difficulty_bits: u32) -> Result<Self> {
        if difficulty_bits == 0 || difficulty_bits > MAX_TARGET_BITS {
            return Err(LedgerError::InvalidDifficulty(difficulty_bits));
        }
        Ok(ProofOfWork {
            difficulty_bits,
            target: U256::one().shl(MAX_TARGET_BITS - difficulty_bits),
            max_nonce: u64::MAX,
        })
    }

    /// Bound the nonce search to `0..=max_nonce`
    pub fn with_max_nonce(mut self, max_nonce: u64) -> Self {
        self.max_nonce = max_nonce;
        self
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.difficulty_bits
    }

    pub fn max_nonce(&self) -> u64 {
        self.max_nonce
    }

    /// Target as 64 hex digits, big-endian
    pub fn target_hex(&self) -> String {
        hex::encode(self.target.to_be_bytes())
    }

    pub fn header_preimage(header: &BlockHeader, nonce: u64) -> Vec<u8> {
        format!(
            "{}{}{}{}{}",
            header.prev_block_hash, header.merkle_root, header.timestamp, header.height, nonce
        )
        .into_bytes()
    }

    pub fn header_hash(header: &BlockHeader, nonce: u64) -> String {
        sha256_hex(&Self::header_preimage(header, nonce))
    }

    /// Whether a hex hash, read as a 256-bit unsigned integer, is strictly below the target
    pub fn meets_target(&self, hash_hex: &str) -> bool {
        match U256::from_hex(hash_hex) {
            Some(value) => value < self.target,
            None => false,
        }
    }

    /// Search nonces from 0 upward until one satisfies the target
    ///
    /// Blocks the calling thread. Fails with [`LedgerError::NonceNotFound`] once
    /// the nonce space is exhausted.
    pub fn run(&self, header: &BlockHeader) -> Result<PowSolution> {
        info!(
            "Mining block at height {} with {} difficulty bits",
            header.height, self.difficulty_bits
        );
        let start = Instant::now();

        for nonce in 0..=self.max_nonce {
            let hash = Self::header_hash(header, nonce);
            trace!("try nonce == {} hash == {}", nonce, hash);

            if self.meets_target(&hash) {
                let elapsed = start.elapsed();
                info!("Found nonce {} for height {} in {:?}", nonce, header.height, elapsed);
                return Ok(PowSolution {
                    nonce,
                    hash,
                    attempts: attempts_through(nonce),
                    elapsed,
                });
            }
        }

        warn!("Nonce not found for height {}", header.height);
        Err(LedgerError::NonceNotFound {
            max_nonce: self.max_nonce,
        })
    }

    /// Recompute the hash with the header's recorded nonce and check it against the target
    pub fn validate(&self, header: &BlockHeader) -> bool {
        self.meets_target(&Self::header_hash(header, header.nonce))
    }
}

/// Hashes tried by a search that stopped at `nonce`
fn attempts_through(nonce: u64) -> u64 {
    nonce.saturating_add(1)
}

/// 256-bit unsigned integer, little-endian words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct U256([u64; 4]);

impl U256 {
    fn zero() -> Self {
        U256([0; 4])
    }

    fn one() -> Self {
        U256([1, 0, 0, 0])
    }

    fn shl(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::zero();
        }

        let mut result = U256::zero();
        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        for i in 0..4 {
            if i + word_shift < 4 {
                result.0[i + word_shift] |= self.0[i] << bit_shift;
                if bit_shift > 0 && i + word_shift + 1 < 4 {
                    result.0[i + word_shift + 1] |= self.0[i] >> (64 - bit_shift);
                }
            }
        }

        result
    }

    fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (i, word) in words.iter_mut().enumerate() {
            let start = (3 - i) * 8;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[start..start + 8]);
            *word = u64::from_be_bytes(chunk);
        }
        U256(words)
    }

    fn to_be_bytes(self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, word) in self.0.iter().enumerate() {
            let start = (3 - i) * 8;
            bytes[start..start + 8].copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    fn from_hex(hash_hex: &str) -> Option<Self> {
        let bytes: [u8; 32] = hex::decode(hash_hex).ok()?.try_into().ok()?;
        Some(Self::from_be_bytes(&bytes))
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for (a, b) in self.0.iter().rev().zip(other.0.iter().rev()) {
            match a.cmp(b) {
                std::cmp::Ordering::Equal => continue,
                other => return other,
            }
        }
        std::cmp::Ordering::Equal
    }
}

//! Block assembly and mining

use log::debug;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::block::{Block, BlockHeader};
use crate::error::Result;
use crate::hash::sha256_hex;
use crate::pow::ProofOfWork;
use crate::types::*;

/// Build an unmined block on top of `prev` (or a genesis block when `prev` is `None`)
pub fn assemble_block(prev: Option<&Block>, transactions: Vec<Transaction>, timestamp: u64) -> Block {
    let (height, prev_block_hash) = match prev {
        Some(prev) => (prev.height() + 1, prev.hash.clone()),
        None => (0, String::new()),
    };

    let header = BlockHeader {
        prev_block_hash,
        merkle_root: calculate_merkle_root(&transactions),
        timestamp,
        height,
        nonce: 0,
    };

    Block {
        header,
        transactions,
        hash: String::new(),
    }
}

/// Run proof of work for `block` and record the winning nonce and hash
pub fn mine_block(mut block: Block, pow: &ProofOfWork) -> Result<Block> {
    let solution = pow.run(&block.header)?;
    debug!(
        "Block {} mined after {} attempts",
        block.height(),
        solution.attempts
    );
    block.header.nonce = solution.nonce;
    block.hash = solution.hash;
    Ok(block)
}

/// Merkle root over transaction ids
///
/// Pairs are hashed as SHA-256 of the two hex ids concatenated; an odd node
/// out is paired with itself. A single transaction's id is the root.
pub fn calculate_merkle_root(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return sha256_hex(&[]);
    }

    let mut hashes: Vec<String> = transactions.iter().map(|tx| tx.id.clone()).collect();
    while hashes.len() > 1 {
        let mut next_level = Vec::with_capacity((hashes.len() + 1) / 2);
        for chunk in hashes.chunks(2) {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left);
            next_level.push(sha256_hex(format!("{}{}", left, right).as_bytes()));
        }
        hashes = next_level;
    }

    hashes.remove(0)
}

/// Seconds since the Unix epoch
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

//! Blocks and block validation

use log::debug;
use serde::{Deserialize, Serialize};

use crate::chain::ChainStore;
use crate::error::Result;
use crate::mining::calculate_merkle_root;
use crate::pow::ProofOfWork;
use crate::types::*;

/// Block header: the fields hashed by proof of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub prev_block_hash: String,
    pub merkle_root: String,
    pub timestamp: u64,
    pub height: u64,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    /// Header hash at the recorded nonce; empty until mined
    pub hash: String,
}

impl Block {
    pub fn height(&self) -> u64 {
        self.header.height
    }

    pub fn find_transaction(&self, txid: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == txid)
    }
}

/// Check a received block without re-mining it
///
/// A block is valid when its recorded nonce satisfies `pow`, its stored hash
/// and merkle root match its contents, and every transaction verifies against
/// the chain plus the transactions before it in the same block. A source
/// transaction that cannot be found anywhere is a reference error.
pub fn validate_block<C: ChainStore>(block: &Block, pow: &ProofOfWork, chain: &C) -> Result<bool> {
    if !pow.validate(&block.header) {
        debug!("Block {} fails proof of work", block.height());
        return Ok(false);
    }

    if block.hash != ProofOfWork::header_hash(&block.header, block.header.nonce) {
        debug!("Block {} hash does not match its header", block.height());
        return Ok(false);
    }

    if block.header.merkle_root != calculate_merkle_root(&block.transactions) {
        debug!("Block {} merkle root mismatch", block.height());
        return Ok(false);
    }

    let mut earlier = TxLookup::new();
    for tx in &block.transactions {
        if tx.id != tx.compute_id() {
            debug!("Transaction {} id does not match its contents", tx.id);
            return Ok(false);
        }

        let mut prev_txs = TxLookup::new();
        if !tx.is_coinbase() {
            for input in &tx.inputs {
                if prev_txs.contains_key(&input.txid) {
                    continue;
                }
                let source = match earlier.get(&input.txid) {
                    Some(source) => Some(source.clone()),
                    None => chain.find_transaction(&input.txid)?,
                };
                if let Some(source) = source {
                    prev_txs.insert(source.id.clone(), source);
                }
            }
        }

        if !tx.verify(&prev_txs)? {
            return Ok(false);
        }
        earlier.insert(tx.id.clone(), tx.clone());
    }

    Ok(true)
}

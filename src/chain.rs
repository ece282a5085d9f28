//! Chain storage collaborator
//!
//! The ledger engine does not own block persistence. It reads the chain through
//! [`ChainStore`]; [`MemoryChain`] is an in-process implementation that answers
//! every query by scanning its blocks.

use std::collections::{BTreeMap, HashSet};

use crate::block::Block;
use crate::error::{LedgerError, Result};
use crate::types::*;

/// Unspent outputs per transaction id, as `(output index, output)` pairs in index order
pub type UnspentOutputs = BTreeMap<String, Vec<(usize, TxOutput)>>;

pub trait ChainStore {
    fn last_block(&self) -> Result<Option<Block>>;

    fn block_at_height(&self, height: u64) -> Result<Option<Block>>;

    /// Every output in the chain not consumed by a later input
    fn find_all_unspent_outputs(&self) -> Result<UnspentOutputs>;

    fn find_transaction(&self, txid: &str) -> Result<Option<Transaction>>;

    /// Append a block at the tip; its height must be one past the current tip
    fn append_block(&mut self, block: Block) -> Result<()>;

    /// Remove and return the tip block
    fn remove_last_block(&mut self) -> Result<Option<Block>>;

    fn tip_height(&self) -> Result<Option<u64>> {
        Ok(self.last_block()?.map(|block| block.height()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryChain {
    blocks: Vec<Block>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl ChainStore for MemoryChain {
    fn last_block(&self) -> Result<Option<Block>> {
        Ok(self.blocks.last().cloned())
    }

    fn block_at_height(&self, height: u64) -> Result<Option<Block>> {
        Ok(usize::try_from(height)
            .ok()
            .and_then(|h| self.blocks.get(h))
            .cloned())
    }

    fn find_all_unspent_outputs(&self) -> Result<UnspentOutputs> {
        let spent: HashSet<(&str, i64)> = self
            .blocks
            .iter()
            .flat_map(|block| &block.transactions)
            .filter(|tx| !tx.is_coinbase())
            .flat_map(|tx| &tx.inputs)
            .map(|input| (input.txid.as_str(), input.vout))
            .collect();

        let mut unspent = UnspentOutputs::new();
        for tx in self.blocks.iter().flat_map(|block| &block.transactions) {
            let outputs: Vec<(usize, TxOutput)> = tx
                .outputs
                .iter()
                .enumerate()
                .filter(|(index, _)| !spent.contains(&(tx.id.as_str(), *index as i64)))
                .map(|(index, output)| (index, output.clone()))
                .collect();
            if !outputs.is_empty() {
                unspent.insert(tx.id.clone(), outputs);
            }
        }
        Ok(unspent)
    }

    fn find_transaction(&self, txid: &str) -> Result<Option<Transaction>> {
        Ok(self
            .blocks
            .iter()
            .rev()
            .find_map(|block| block.find_transaction(txid))
            .cloned())
    }

    fn append_block(&mut self, block: Block) -> Result<()> {
        let expected = self.blocks.len() as u64;
        if block.height() != expected {
            return Err(LedgerError::Chain(format!(
                "Block height {} does not extend tip (expected {})",
                block.height(),
                expected
            )));
        }
        if let Some(tip) = self.blocks.last() {
            if block.header.prev_block_hash != tip.hash {
                return Err(LedgerError::Chain(format!(
                    "Block {} does not link to tip hash {}",
                    block.height(),
                    tip.hash
                )));
            }
        }
        self.blocks.push(block);
        Ok(())
    }

    fn remove_last_block(&mut self) -> Result<Option<Block>> {
        Ok(self.blocks.pop())
    }
}

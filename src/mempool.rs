//! Pending transaction pool
//!
//! A bounded buffer of transactions waiting for a block. [`TxPool::add`] never
//! rejects; the caller checks [`TxPool::is_full`] afterwards and flushes the
//! pool with [`TxPool::take`] or [`TxPool::clear`].

use log::warn;
use std::collections::HashSet;

use crate::constants::DEFAULT_POOL_CAPACITY;
use crate::types::*;

#[derive(Debug, Clone)]
pub struct TxPool {
    txs: Vec<Transaction>,
    capacity: usize,
}

impl Default for TxPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl TxPool {
    pub fn new(capacity: usize) -> Self {
        TxPool {
            txs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append unconditionally, in insertion order, without deduplication
    pub fn add(&mut self, tx: Transaction) {
        self.txs.push(tx);
    }

    pub fn is_full(&self) -> bool {
        self.txs.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.txs.clear();
    }

    /// Remove and return every buffered transaction in one step
    pub fn take(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.txs)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.txs
    }

    /// Outputs consumed by buffered transactions, as `(txid, output index)`
    pub fn spent_outpoints(&self) -> HashSet<(String, i64)> {
        self.txs
            .iter()
            .filter(|tx| !tx.is_coinbase())
            .flat_map(|tx| &tx.inputs)
            .map(|input| (input.txid.clone(), input.vout))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Drop transactions that spend an output already consumed earlier in `txs`
pub fn remove_conflicting_spends(txs: Vec<Transaction>) -> Vec<Transaction> {
    let mut spent: HashSet<(String, i64)> = HashSet::new();
    let mut kept = Vec::with_capacity(txs.len());

    for tx in txs {
        if tx.is_coinbase() {
            kept.push(tx);
            continue;
        }

        let conflicts = tx
            .inputs
            .iter()
            .any(|input| spent.contains(&(input.txid.clone(), input.vout)));
        if conflicts {
            warn!("Dropping transaction {}: it spends an output already spent in this batch", tx.id);
            continue;
        }

        spent.extend(tx.inputs.iter().map(|input| (input.txid.clone(), input.vout)));
        kept.push(tx);
    }

    kept
}

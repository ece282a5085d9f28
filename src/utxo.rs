//! UTXO index: a rebuildable cache of spendable outputs
//!
//! Each unspent output is one document keyed `UTXO<txid>-<index>`, holding the
//! output value, its hex public key hash and its index. The `UTXOl` sentinel
//! records the last block height the index has absorbed.
//!
//! Maintenance favours forward progress over atomicity: an entry that already
//! exists on insert, or is already gone on delete, is logged and skipped.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;

use crate::block::Block;
use crate::chain::ChainStore;
use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::hash::address_to_pubkey_hash;
use crate::store::{DocumentStore, Query, StoreError};
use crate::types::*;

/// Stored form of an index entry
#[derive(Debug, Serialize, Deserialize)]
struct OutputDocument {
    value: u64,
    #[serde(with = "hex::serde")]
    pub_key_hash: ByteString,
    index: usize,
}

fn output_key(txid: &str, index: usize) -> String {
    format!("{}{}-{}", UTXO_KEY_PREFIX, txid, index)
}

fn add_value(total: u64, value: u64, address: &str) -> Result<u64> {
    total
        .checked_add(value)
        .ok_or_else(|| LedgerError::ValueOverflow(format!("unspent outputs of {}", address)))
}

/// Recover the transaction id embedded in an entry key
fn txid_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(UTXO_KEY_PREFIX)?
        .rsplit_once('-')
        .map(|(txid, _)| txid)
}

#[derive(Debug)]
pub struct UtxoIndex<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> UtxoIndex<S> {
    pub fn new(store: S) -> Self {
        UtxoIndex { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Bring the index up to the chain tip
    ///
    /// Without a sentinel the index is rebuilt from the chain's full unspent
    /// output set. With one, blocks in `(last indexed height, tip]` are applied
    /// in order. A sentinel ahead of the tip means the chain was cut back behind
    /// the index's back; the index is cleared and rebuilt.
    pub fn reindex<C: ChainStore>(&mut self, chain: &C) -> Result<()> {
        let tip = chain.tip_height()?;

        let last = match self.last_height()? {
            Some(last) if tip.map_or(true, |tip| tip < last) => {
                warn!("UTXO index at height {} is ahead of chain tip {:?}; rebuilding", last, tip);
                self.clear()?;
                None
            }
            last => last,
        };

        match (last, tip) {
            (None, _) => {
                let unspent = chain.find_all_unspent_outputs()?;
                info!("Rebuilding UTXO index from {} transactions", unspent.len());
                for (txid, outputs) in &unspent {
                    for (index, output) in outputs {
                        self.insert_output(txid, *index, output)?;
                    }
                }
                if let Some(tip) = tip {
                    self.set_last_height(tip)?;
                }
            }
            (Some(last), Some(tip)) => {
                for height in (last + 1)..=tip {
                    let block = chain.block_at_height(height)?.ok_or_else(|| {
                        LedgerError::Chain(format!("Missing block at height {}", height))
                    })?;
                    self.update(&block)?;
                }
            }
            (Some(_), None) => {}
        }

        Ok(())
    }

    /// Absorb a block: add its outputs, drop the outputs its inputs consume
    pub fn update(&mut self, block: &Block) -> Result<()> {
        for tx in &block.transactions {
            for (index, output) in tx.outputs.iter().enumerate() {
                self.insert_output(&tx.id, index, output)?;
            }

            if tx.is_coinbase() {
                continue;
            }
            for input in &tx.inputs {
                match usize::try_from(input.vout) {
                    Ok(vout) => self.remove_output(&input.txid, vout)?,
                    Err(_) => debug!("Skipping input with output index {}", input.vout),
                }
            }
        }

        debug!("UTXO index absorbed block {}", block.height());
        self.set_last_height(block.height())
    }

    /// Undo [`update`](Self::update) for `block`
    ///
    /// Transactions are undone last-first so that outputs both created and
    /// spent inside the block end up absent. Consumed outputs are restored from
    /// their source transaction, looked up in the block itself and then in the
    /// chain. Rolling back height 0 clears the sentinel.
    pub fn roll_back<C: ChainStore>(&mut self, block: &Block, chain: &C) -> Result<()> {
        for tx in block.transactions.iter().rev() {
            for index in 0..tx.outputs.len() {
                self.remove_output(&tx.id, index)?;
            }

            if tx.is_coinbase() {
                continue;
            }
            for input in &tx.inputs {
                let source = match block.find_transaction(&input.txid) {
                    Some(source) => Some(source.clone()),
                    None => chain.find_transaction(&input.txid)?,
                };
                let restored = source.and_then(|source| {
                    let vout = usize::try_from(input.vout).ok()?;
                    source.outputs.get(vout).cloned().map(|output| (vout, output))
                });
                match restored {
                    Some((vout, output)) => self.insert_output(&input.txid, vout, &output)?,
                    None => warn!(
                        "Cannot restore output {}:{} consumed by {}",
                        input.txid, input.vout, tx.id
                    ),
                }
            }
        }

        match block.height().checked_sub(1) {
            Some(height) => self.set_last_height(height),
            None => self.clear_last_height(),
        }
    }

    /// Every indexed output locked to `address`, in index-query order
    pub fn find_utxo(&self, address: &str) -> Result<Vec<FullTxOutput>> {
        let pub_key_hash = address_to_pubkey_hash(address)?;
        let query = Query::new()
            .key_prefix(UTXO_KEY_PREFIX)
            .field_eq("pub_key_hash", json!(hex::encode(&pub_key_hash)));

        let mut utxos = Vec::new();
        for doc in self.store.find(&query)? {
            let Some(txid) = txid_from_key(&doc.id) else {
                continue;
            };
            let entry: OutputDocument = match serde_json::from_value(doc.body.clone()) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping malformed UTXO document {}: {}", doc.id, e);
                    continue;
                }
            };
            utxos.push(FullTxOutput {
                txid: txid.to_string(),
                output: TxOutput {
                    value: entry.value,
                    pub_key_hash: entry.pub_key_hash,
                },
                index: entry.index,
            });
        }
        Ok(utxos)
    }

    /// First-fit selection of outputs covering `amount`
    ///
    /// Returns the accumulated value and the selected entries. When the balance
    /// is below `amount` every entry is returned.
    pub fn find_spendable_outputs(&self, address: &str, amount: u64) -> Result<(u64, Vec<FullTxOutput>)> {
        self.find_spendable_outputs_except(address, amount, &HashSet::new())
    }

    /// [`find_spendable_outputs`](Self::find_spendable_outputs) skipping the
    /// `(txid, output index)` pairs in `reserved`
    pub fn find_spendable_outputs_except(
        &self,
        address: &str,
        amount: u64,
        reserved: &HashSet<(String, i64)>,
    ) -> Result<(u64, Vec<FullTxOutput>)> {
        let mut accumulated = 0u64;
        let mut spendable = Vec::new();
        for utxo in self.find_utxo(address)? {
            if reserved.contains(&(utxo.txid.clone(), utxo.index as i64)) {
                continue;
            }
            accumulated = add_value(accumulated, utxo.output.value, address)?;
            spendable.push(utxo);
            if accumulated >= amount {
                break;
            }
        }
        Ok((accumulated, spendable))
    }

    /// Whether output `index` of `txid` is currently indexed as unspent
    pub fn is_unspent(&self, txid: &str, index: usize) -> Result<bool> {
        Ok(self.store.contains(&output_key(txid, index))?)
    }

    pub fn balance(&self, address: &str) -> Result<u64> {
        self.find_utxo(address)?
            .iter()
            .try_fold(0u64, |total, utxo| add_value(total, utxo.output.value, address))
    }

    /// Last block height absorbed, `None` if the index has never been built
    pub fn last_height(&self) -> Result<Option<u64>> {
        Ok(self
            .store
            .get(LAST_HEIGHT_KEY)?
            .and_then(|doc| doc.get("height").and_then(|h| h.as_u64())))
    }

    pub fn set_last_height(&mut self, height: u64) -> Result<()> {
        match self.store.get(LAST_HEIGHT_KEY)? {
            Some(mut doc) => {
                doc.body = json!({ "height": height });
                self.store.update(&[doc])?;
            }
            None => {
                self.store.create(LAST_HEIGHT_KEY, json!({ "height": height }))?;
            }
        }
        Ok(())
    }

    fn clear_last_height(&mut self) -> Result<()> {
        if let Some(doc) = self.store.get(LAST_HEIGHT_KEY)? {
            self.store.delete(&doc)?;
        }
        Ok(())
    }

    /// Drop every entry and the sentinel
    fn clear(&mut self) -> Result<()> {
        let query = Query::new().key_prefix(UTXO_KEY_PREFIX);
        for doc in self.store.find(&query)? {
            self.store.delete(&doc)?;
        }
        Ok(())
    }

    fn insert_output(&mut self, txid: &str, index: usize, output: &TxOutput) -> Result<()> {
        let body = serde_json::to_value(OutputDocument {
            value: output.value,
            pub_key_hash: output.pub_key_hash.clone(),
            index,
        })
        .map_err(|e| LedgerError::Serialization(e.to_string()))?;

        match self.store.create(&output_key(txid, index), body) {
            Ok(_) => Ok(()),
            Err(StoreError::Conflict(key)) => {
                warn!("UTXO entry {} already indexed", key);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn remove_output(&mut self, txid: &str, index: usize) -> Result<()> {
        let Some(doc) = self.store.get(&output_key(txid, index))? else {
            return Ok(());
        };
        match self.store.delete(&doc) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound(key)) => {
                warn!("UTXO entry {} already removed", key);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MemoryChain;
    use crate::mining::assemble_block;
    use crate::store::MemoryStore;
    use crate::wallet::Wallet;

    fn push_block(chain: &mut MemoryChain, txs: Vec<Transaction>) -> Block {
        let tip = chain.last_block().unwrap();
        let mut block = assemble_block(tip.as_ref(), txs, 0);
        block.hash = format!("block-{}", block.height());
        chain.append_block(block.clone()).unwrap();
        block
    }

    fn signed_spend(
        chain: &MemoryChain,
        index: &UtxoIndex<MemoryStore>,
        from: &Wallet,
        to: &str,
        amount: u64,
    ) -> Transaction {
        let (accumulated, utxos) = index.find_spendable_outputs(from.address(), amount).unwrap();
        let mut tx = Transaction::new_spend(from, to, amount, accumulated, &utxos).unwrap();
        let prev: TxLookup = utxos
            .iter()
            .map(|u| (u.txid.clone(), chain.find_transaction(&u.txid).unwrap().unwrap()))
            .collect();
        tx.sign(from.secret_key(), &prev).unwrap();
        tx
    }

    fn scan_balance(chain: &MemoryChain, wallet: &Wallet) -> u64 {
        chain
            .find_all_unspent_outputs()
            .unwrap()
            .values()
            .flatten()
            .filter(|(_, output)| output.is_locked_with_key(&wallet.public_key_hash()))
            .map(|(_, output)| output.value)
            .sum()
    }

    fn entry_keys(index: &UtxoIndex<MemoryStore>) -> Vec<String> {
        index
            .store()
            .keys()
            .filter(|key| *key != LAST_HEIGHT_KEY)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_txid_from_key() {
        assert_eq!(txid_from_key("UTXOabc-3"), Some("abc"));
        assert_eq!(txid_from_key("UTXOl"), None);
        assert_eq!(txid_from_key("other"), None);
    }

    #[test]
    fn test_last_height_sentinel() {
        let mut index = UtxoIndex::new(MemoryStore::new());
        assert_eq!(index.last_height().unwrap(), None);
        index.set_last_height(3).unwrap();
        assert_eq!(index.last_height().unwrap(), Some(3));
        index.set_last_height(7).unwrap();
        assert_eq!(index.last_height().unwrap(), Some(7));
        assert_eq!(index.store().get(LAST_HEIGHT_KEY).unwrap().unwrap().body["height"], 7);
    }

    #[test]
    fn test_reindex_empty_chain() {
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.reindex(&MemoryChain::new()).unwrap();
        assert_eq!(index.last_height().unwrap(), None);
        assert!(index.store().is_empty());
    }

    #[test]
    fn test_full_reindex_matches_chain_scan() {
        let alice = Wallet::generate();
        let bob = Wallet::generate();
        let mut chain = MemoryChain::new();
        let mut index = UtxoIndex::new(MemoryStore::new());

        push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        index.reindex(&chain).unwrap();
        let spend = signed_spend(&chain, &index, &alice, bob.address(), 400);
        push_block(&mut chain, vec![spend]);

        let mut rebuilt = UtxoIndex::new(MemoryStore::new());
        rebuilt.reindex(&chain).unwrap();

        assert_eq!(rebuilt.last_height().unwrap(), Some(1));
        assert_eq!(rebuilt.balance(alice.address()).unwrap(), scan_balance(&chain, &alice));
        assert_eq!(rebuilt.balance(bob.address()).unwrap(), scan_balance(&chain, &bob));
        assert_eq!(rebuilt.balance(alice.address()).unwrap(), 600);
        assert_eq!(rebuilt.balance(bob.address()).unwrap(), 400);
    }

    #[test]
    fn test_incremental_reindex_applies_new_blocks() {
        let alice = Wallet::generate();
        let bob = Wallet::generate();
        let mut chain = MemoryChain::new();
        let mut index = UtxoIndex::new(MemoryStore::new());

        push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        index.reindex(&chain).unwrap();
        assert_eq!(index.last_height().unwrap(), Some(0));

        let spend = signed_spend(&chain, &index, &alice, bob.address(), 250);
        push_block(&mut chain, vec![spend]);
        push_block(&mut chain, vec![Transaction::new_coinbase(bob.address(), None).unwrap()]);

        index.reindex(&chain).unwrap();
        assert_eq!(index.last_height().unwrap(), Some(2));
        assert_eq!(index.balance(alice.address()).unwrap(), 750);
        assert_eq!(index.balance(bob.address()).unwrap(), 1250);
    }

    #[test]
    fn test_incremental_reindex_bounds_exclude_last_and_include_tip() {
        let alice = Wallet::generate();
        let bob = Wallet::generate();
        let carol = Wallet::generate();
        let mut chain = MemoryChain::new();
        push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        push_block(&mut chain, vec![Transaction::new_coinbase(bob.address(), None).unwrap()]);
        push_block(&mut chain, vec![Transaction::new_coinbase(carol.address(), None).unwrap()]);

        // Claim height 1 is already absorbed without ever indexing it
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.set_last_height(1).unwrap();
        index.reindex(&chain).unwrap();

        assert_eq!(index.balance(alice.address()).unwrap(), 0);
        assert_eq!(index.balance(bob.address()).unwrap(), 0);
        assert_eq!(index.balance(carol.address()).unwrap(), SUBSIDY);
        assert_eq!(index.last_height().unwrap(), Some(2));
    }

    #[test]
    fn test_reindex_at_tip_is_noop() {
        let alice = Wallet::generate();
        let mut chain = MemoryChain::new();
        push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.reindex(&chain).unwrap();
        let before = entry_keys(&index);
        index.reindex(&chain).unwrap();
        assert_eq!(entry_keys(&index), before);
    }

    #[test]
    fn test_update_twice_is_not_fatal() {
        let alice = Wallet::generate();
        let mut chain = MemoryChain::new();
        let block = push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        let mut index = UtxoIndex::new(MemoryStore::new());

        index.update(&block).unwrap();
        index.update(&block).unwrap();
        assert_eq!(index.find_utxo(alice.address()).unwrap().len(), 1);
        assert_eq!(index.last_height().unwrap(), Some(0));
    }

    #[test]
    fn test_update_then_roll_back_restores_entries() {
        let alice = Wallet::generate();
        let bob = Wallet::generate();
        let mut chain = MemoryChain::new();
        let mut index = UtxoIndex::new(MemoryStore::new());

        push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        index.reindex(&chain).unwrap();
        let before_alice = index.find_utxo(alice.address()).unwrap();
        let before_keys = entry_keys(&index);

        let spend = signed_spend(&chain, &index, &alice, bob.address(), 100);
        let block = push_block(&mut chain, vec![spend]);
        index.update(&block).unwrap();
        assert_eq!(index.last_height().unwrap(), Some(1));
        assert_eq!(index.balance(bob.address()).unwrap(), 100);

        index.roll_back(&block, &chain).unwrap();
        assert_eq!(index.find_utxo(alice.address()).unwrap(), before_alice);
        assert!(index.find_utxo(bob.address()).unwrap().is_empty());
        assert_eq!(entry_keys(&index), before_keys);
        assert_eq!(index.last_height().unwrap(), Some(0));
    }

    #[test]
    fn test_roll_back_spend_within_same_block() {
        let alice = Wallet::generate();
        let bob = Wallet::generate();
        let carol = Wallet::generate();
        let mut chain = MemoryChain::new();
        let mut index = UtxoIndex::new(MemoryStore::new());

        push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        index.reindex(&chain).unwrap();
        let before_keys = entry_keys(&index);

        // bob re-spends an output created earlier in the same block
        let first = signed_spend(&chain, &index, &alice, bob.address(), SUBSIDY);
        let source = FullTxOutput { txid: first.id.clone(), output: first.outputs[0].clone(), index: 0 };
        let mut second = Transaction::new_spend(&bob, carol.address(), SUBSIDY, SUBSIDY, &[source]).unwrap();
        let prev: TxLookup = [(first.id.clone(), first.clone())].into_iter().collect();
        second.sign(bob.secret_key(), &prev).unwrap();

        let block = push_block(&mut chain, vec![first, second]);
        index.update(&block).unwrap();
        assert_eq!(index.balance(bob.address()).unwrap(), 0);
        assert_eq!(index.balance(carol.address()).unwrap(), SUBSIDY);

        index.roll_back(&block, &chain).unwrap();
        assert_eq!(entry_keys(&index), before_keys);
        assert_eq!(index.balance(alice.address()).unwrap(), SUBSIDY);
    }

    #[test]
    fn test_roll_back_genesis_clears_sentinel() {
        let alice = Wallet::generate();
        let mut chain = MemoryChain::new();
        let block = push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.reindex(&chain).unwrap();

        index.roll_back(&block, &chain).unwrap();
        assert_eq!(index.last_height().unwrap(), None);
        assert!(index.store().is_empty());
    }

    #[test]
    fn test_find_spendable_outputs_first_fit() {
        let alice = Wallet::generate();
        let mut chain = MemoryChain::new();
        for note in ["a", "b", "c"] {
            push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), Some(note)).unwrap()]);
        }
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.reindex(&chain).unwrap();

        let (total, selected) = index.find_spendable_outputs(alice.address(), 1500).unwrap();
        assert_eq!(total, 2 * SUBSIDY);
        assert_eq!(selected.len(), 2);

        let (total, selected) = index.find_spendable_outputs(alice.address(), 5000).unwrap();
        assert_eq!(total, 3 * SUBSIDY);
        assert_eq!(selected.len(), 3);

        let all = index.find_utxo(alice.address()).unwrap();
        assert_eq!(selected, all);
    }

    #[test]
    fn test_find_utxo_reconstructs_entries() {
        let alice = Wallet::generate();
        let mut chain = MemoryChain::new();
        let block = push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.update(&block).unwrap();

        let utxos = index.find_utxo(alice.address()).unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].txid, block.transactions[0].id);
        assert_eq!(utxos[0].index, 0);
        assert_eq!(utxos[0].output, block.transactions[0].outputs[0]);
    }

    #[test]
    fn test_find_utxo_rejects_invalid_address() {
        let index = UtxoIndex::new(MemoryStore::new());
        assert!(matches!(
            index.find_utxo("nonsense"),
            Err(LedgerError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_reindex_rebuilds_when_ahead_of_tip() {
        let alice = Wallet::generate();
        let bob = Wallet::generate();
        let mut chain = MemoryChain::new();
        push_block(&mut chain, vec![Transaction::new_coinbase(alice.address(), None).unwrap()]);
        push_block(&mut chain, vec![Transaction::new_coinbase(bob.address(), None).unwrap()]);
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.reindex(&chain).unwrap();
        assert_eq!(index.last_height().unwrap(), Some(1));

        // Tip removed without rolling the index back
        chain.remove_last_block().unwrap();
        index.reindex(&chain).unwrap();
        assert_eq!(index.last_height().unwrap(), Some(0));
        assert_eq!(index.balance(bob.address()).unwrap(), 0);
        assert_eq!(index.balance(alice.address()).unwrap(), scan_balance(&chain, &alice));

        let mut fresh = UtxoIndex::new(MemoryStore::new());
        fresh.reindex(&chain).unwrap();
        assert_eq!(entry_keys(&index), entry_keys(&fresh));

        chain.remove_last_block().unwrap();
        index.reindex(&chain).unwrap();
        assert_eq!(index.last_height().unwrap(), None);
        assert!(index.store().is_empty());
    }

    #[test]
    fn test_value_overflow_is_an_error() {
        let alice = Wallet::generate();
        let mut chain = MemoryChain::new();
        let outputs = vec![
            TxOutput::new(1, alice.address()).unwrap(),
            TxOutput::new(u64::MAX, alice.address()).unwrap(),
        ];
        let tx = Transaction::new(vec![TxInput::new("", COINBASE_OUTPUT_INDEX, b"big".to_vec())], outputs);
        let block = push_block(&mut chain, vec![tx]);
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.update(&block).unwrap();

        assert!(matches!(index.balance(alice.address()), Err(LedgerError::ValueOverflow(_))));
        assert!(matches!(
            index.find_spendable_outputs(alice.address(), u64::MAX),
            Err(LedgerError::ValueOverflow(_))
        ));
        let (accumulated, selected) = index.find_spendable_outputs(alice.address(), 1).unwrap();
        assert_eq!((accumulated, selected.len()), (1, 1));
    }

    #[test]
    fn test_find_spendable_outputs_skips_reserved() {
        let alice = Wallet::generate();
        let mut chain = MemoryChain::new();
        let first = Transaction::new_coinbase_with_reward(alice.address(), Some("a"), 30).unwrap();
        let second = Transaction::new_coinbase_with_reward(alice.address(), Some("b"), 40).unwrap();
        push_block(&mut chain, vec![first.clone(), second.clone()]);
        let mut index = UtxoIndex::new(MemoryStore::new());
        index.reindex(&chain).unwrap();

        let reserved: HashSet<(String, i64)> = [(first.id.clone(), 0)].into_iter().collect();
        let (accumulated, selected) = index
            .find_spendable_outputs_except(alice.address(), 100, &reserved)
            .unwrap();
        assert_eq!(accumulated, 40);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].txid, second.id);
    }
}

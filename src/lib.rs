//! # UTXO Ledger
//!
//! A minimal unspent-transaction-output ledger engine: transactions that spend
//! and create outputs locked to public-key-hash addresses, a proof-of-work
//! block format, a bounded pending-transaction pool and a persistent index of
//! unspent outputs kept in step with the chain.
//!
//! ## Architecture
//!
//! The engine sits between two collaborators it does not own:
//! - a [`ChainStore`] holding the blocks (append, remove tip, scan)
//! - a [`DocumentStore`] holding one document per unspent output plus a
//!   last-indexed-height sentinel
//!
//! An optional [`Broadcaster`] relays new transactions to peers. In-memory
//! implementations of both stores ship with the crate.
//!
//! ## Design Principles
//!
//! 1. **Deterministic identity**: transaction ids and block hashes are SHA-256
//!    over fixed textual renderings, so they are stable across processes
//! 2. **Index follows chain**: the UTXO index is rebuilt or advanced from the
//!    chain before every read, never the other way round
//! 3. **Best-effort relay**: a failed broadcast never rolls back a local spend
//!
//! ## Usage
//!
//! ```rust
//! use utxo_ledger::{Ledger, LedgerConfig, MemoryChain, MemoryStore};
//!
//! let config = LedgerConfig { pool_capacity: 1, ..LedgerConfig::default() };
//! let mut ledger = Ledger::new(config, MemoryChain::new(), MemoryStore::new()).unwrap();
//!
//! let alice = ledger.create_wallet();
//! let bob = ledger.create_wallet();
//! ledger.create_genesis_block(alice.address()).unwrap();
//!
//! let receipt = ledger.send(&alice, bob.address(), 300).unwrap();
//! assert!(receipt.mined.is_some());
//! assert_eq!(ledger.balance(bob.address()).unwrap(), 300);
//! assert_eq!(ledger.balance(alice.address()).unwrap(), 700);
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod hash;
pub mod wallet;
pub mod transaction;
pub mod store;
pub mod chain;
pub mod block;
pub mod mining;
pub mod pow;
pub mod utxo;
pub mod mempool;
pub mod network;
pub mod config;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{LedgerError, Result};
pub use block::{Block, BlockHeader};
pub use chain::{ChainStore, MemoryChain, UnspentOutputs};
pub use config::LedgerConfig;
pub use mempool::TxPool;
pub use network::{BroadcastStatus, Broadcaster};
pub use pow::{PowSolution, ProofOfWork};
pub use store::{Document, DocumentStore, MemoryStore, Query, StoreError};
pub use utxo::UtxoIndex;
pub use wallet::{Wallet, Wallets};

use log::{info, warn};

/// Outcome of [`Ledger::send`]
#[derive(Debug, Clone)]
pub struct SpendReceipt {
    pub txid: String,
    pub broadcast: BroadcastStatus,
    /// The block assembled because this spend filled the pool, if any
    pub mined: Option<Block>,
}

/// Ledger service tying the chain, UTXO index, pool and miner together
///
/// Mutating operations take `&mut self`; callers sharing a ledger across
/// threads serialize access themselves.
pub struct Ledger<C: ChainStore, S: DocumentStore> {
    config: LedgerConfig,
    pow: ProofOfWork,
    chain: C,
    utxo: UtxoIndex<S>,
    pool: TxPool,
    wallets: Wallets,
    broadcaster: Option<Box<dyn Broadcaster>>,
}

impl<C: ChainStore, S: DocumentStore> Ledger<C, S> {
    /// Build a ledger over existing stores
    ///
    /// The configuration is validated; the index is brought up to date lazily
    /// on first use.
    pub fn new(config: LedgerConfig, chain: C, store: S) -> Result<Self> {
        config.validate()?;
        let pow = ProofOfWork::new(config.difficulty_bits)?;
        Ok(Ledger {
            pool: TxPool::new(config.pool_capacity),
            config,
            pow,
            chain,
            utxo: UtxoIndex::new(store),
            wallets: Wallets::new(),
            broadcaster: None,
        })
    }

    pub fn with_broadcaster(mut self, broadcaster: Box<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn utxo(&self) -> &UtxoIndex<S> {
        &self.utxo
    }

    pub fn pool(&self) -> &TxPool {
        &self.pool
    }

    pub fn wallets(&self) -> &Wallets {
        &self.wallets
    }

    /// Generate a wallet and keep it in the ledger's registry
    pub fn create_wallet(&mut self) -> Wallet {
        self.wallets.create_wallet().clone()
    }

    pub fn import_wallet(&mut self, wallet: Wallet) -> String {
        self.wallets.add(wallet).address().to_string()
    }

    pub fn wallet_addresses(&self) -> Vec<String> {
        self.wallets.addresses()
    }

    pub fn genesis_transaction(&self, address: &str) -> Result<Transaction> {
        Transaction::new_coinbase_with_reward(address, Some("genesis"), self.config.subsidy)
    }

    /// Mine the height-0 block paying the subsidy to `address`
    pub fn create_genesis_block(&mut self, address: &str) -> Result<Block> {
        if self.chain.last_block()?.is_some() {
            return Err(LedgerError::Chain("Chain already has a genesis block".to_string()));
        }

        let coinbase = self.genesis_transaction(address)?;
        let block = mining::assemble_block(None, vec![coinbase], mining::current_timestamp());
        let block = mining::mine_block(block, &self.pow)?;
        self.chain.append_block(block.clone())?;
        self.utxo.reindex(&self.chain)?;

        info!("Created genesis block {} paying {}", block.hash, address);
        Ok(block)
    }

    pub fn balance(&mut self, address: &str) -> Result<u64> {
        self.utxo.reindex(&self.chain)?;
        self.utxo.balance(address)
    }

    pub fn find_utxo(&mut self, address: &str) -> Result<Vec<FullTxOutput>> {
        self.utxo.reindex(&self.chain)?;
        self.utxo.find_utxo(address)
    }

    /// Build, sign, pool and relay a spend of `amount` from `from` to `to`
    ///
    /// Outputs already spent by pooled transactions are not selected again.
    /// When the spend fills the pool a block is assembled and mined before
    /// returning, whatever the broadcast outcome. If mining fails the error is
    /// returned and the spend stays pooled for a later [`mine_pending`](Self::mine_pending).
    pub fn send(&mut self, from: &Wallet, to: &str, amount: u64) -> Result<SpendReceipt> {
        self.utxo.reindex(&self.chain)?;

        let reserved = self.pool.spent_outpoints();
        let (accumulated, spendable) =
            self.utxo.find_spendable_outputs_except(from.address(), amount, &reserved)?;
        let mut tx = Transaction::new_spend(from, to, amount, accumulated, &spendable)?;
        let prev_txs = self.source_transactions(&tx)?;
        tx.sign(from.secret_key(), &prev_txs)?;

        info!("Pooled transaction {}: {} from {} to {}", tx.id, amount, from.address(), to);
        self.pool.add(tx.clone());
        let broadcast = network::broadcast_best_effort(self.broadcaster.as_deref(), &tx);

        let mined = if self.pool.is_full() {
            self.mine_pending()?
        } else {
            None
        };

        Ok(SpendReceipt {
            txid: tx.id,
            broadcast,
            mined,
        })
    }

    /// [`send`](Self::send) for a wallet held in the registry
    pub fn send_from(&mut self, from: &str, to: &str, amount: u64) -> Result<SpendReceipt> {
        let wallet = self
            .wallets
            .get(from)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownWallet(from.to_string()))?;
        self.send(&wallet, to, amount)
    }

    /// Mine the pooled transactions into a new block on the tip
    ///
    /// Transactions that double-spend within the batch, reference outputs no
    /// longer unspent, or fail verification are dropped. Returns `None` when
    /// nothing is left to include. The pool is cleared only once the block is
    /// appended; on error it is left as it was.
    pub fn mine_pending(&mut self) -> Result<Option<Block>> {
        self.utxo.reindex(&self.chain)?;

        let pending = self.pool.transactions().to_vec();
        let mut transactions = Vec::new();
        for tx in mempool::remove_conflicting_spends(pending) {
            if self.is_includable(&tx)? {
                transactions.push(tx);
            }
        }

        let tip = self.chain.last_block()?;
        let height = tip.as_ref().map_or(0, |block| block.height() + 1);

        if let Some(miner) = &self.config.miner_address {
            let note = format!("Reward to '{}' at height {}", miner, height);
            let coinbase = Transaction::new_coinbase_with_reward(miner, Some(&note), self.config.subsidy)?;
            transactions.insert(0, coinbase);
        }
        if transactions.is_empty() {
            self.pool.clear();
            return Ok(None);
        }

        let block = mining::assemble_block(tip.as_ref(), transactions, mining::current_timestamp());
        let block = mining::mine_block(block, &self.pow)?;
        self.chain.append_block(block.clone())?;
        self.pool.clear();
        self.utxo.reindex(&self.chain)?;

        info!(
            "Mined block {} at height {} with {} transactions",
            block.hash,
            block.height(),
            block.transactions.len()
        );
        Ok(Some(block))
    }

    /// Remove the tip block and restore the index to the state before it
    pub fn roll_back_tip(&mut self) -> Result<Option<Block>> {
        self.utxo.reindex(&self.chain)?;
        let Some(block) = self.chain.remove_last_block()? else {
            return Ok(None);
        };
        self.utxo.roll_back(&block, &self.chain)?;
        info!("Rolled back block {} at height {}", block.hash, block.height());
        Ok(Some(block))
    }

    pub fn validate_block(&self, block: &Block) -> Result<bool> {
        block::validate_block(block, &self.pow, &self.chain)
    }

    /// Pretty JSON of the header at `height`
    pub fn print_block(&self, height: u64) -> Result<String> {
        let block = self
            .chain
            .block_at_height(height)?
            .ok_or_else(|| LedgerError::Chain(format!("No block at height {}", height)))?;
        serde_json::to_string_pretty(&block.header)
            .map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    fn source_transactions(&self, tx: &Transaction) -> Result<TxLookup> {
        let mut prev_txs = TxLookup::new();
        for input in &tx.inputs {
            if prev_txs.contains_key(&input.txid) {
                continue;
            }
            let source = self.chain.find_transaction(&input.txid)?.ok_or_else(|| {
                LedgerError::Reference(format!("Transaction {} not found in chain", input.txid))
            })?;
            prev_txs.insert(input.txid.clone(), source);
        }
        Ok(prev_txs)
    }

    fn is_includable(&self, tx: &Transaction) -> Result<bool> {
        if tx.is_coinbase() {
            return Ok(true);
        }

        for input in &tx.inputs {
            let unspent = usize::try_from(input.vout)
                .map(|index| self.utxo.is_unspent(&input.txid, index))
                .unwrap_or(Ok(false))?;
            if !unspent {
                warn!("Dropping transaction {}: output {}:{} is not unspent", tx.id, input.txid, input.vout);
                return Ok(false);
            }
        }

        let prev_txs = match self.source_transactions(tx) {
            Ok(prev_txs) => prev_txs,
            Err(LedgerError::Reference(reason)) => {
                warn!("Dropping transaction {}: {}", tx.id, reason);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        if !tx.verify(&prev_txs)? {
            warn!("Dropping transaction {}: signature verification failed", tx.id);
            return Ok(false);
        }
        Ok(true)
    }
}

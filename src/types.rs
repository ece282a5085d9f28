//! Core ledger types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Byte string type
pub type ByteString = Vec<u8>;

/// Source transactions keyed by id, as handed to signing and verification
pub type TxLookup = HashMap<String, Transaction>;

/// Transaction output: a value locked to a public key hash
///
/// `pub_key_hash` stays empty until [`TxOutput::lock`](crate::transaction) stores
/// the hash decoded from an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: u64,
    #[serde(with = "hex::serde")]
    pub pub_key_hash: ByteString,
}

/// Transaction input: a reference to a previous output plus its unlocking data
///
/// A coinbase input has an empty `txid` and `vout == -1`; its `pub_key` field
/// carries an arbitrary note instead of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub txid: String,
    pub vout: i64,
    #[serde(with = "hex::serde")]
    pub signature: ByteString,
    #[serde(with = "hex::serde")]
    pub pub_key: ByteString,
}

/// Transaction: ordered inputs and outputs identified by a SHA-256 hex id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

/// An output known to be unspent, as reconstructed from the UTXO index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullTxOutput {
    pub txid: String,
    pub output: TxOutput,
    pub index: usize,
}

// The Display forms below are the identity rendering hashed into transaction
// ids and signature preimages. Changing them changes every id.

impl fmt::Display for TxInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{txid: {}, vout: {}, signature: {}, pub_key: {}}}",
            self.txid,
            self.vout,
            hex::encode(&self.signature),
            hex::encode(&self.pub_key)
        )
    }
}

impl fmt::Display for TxOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{value: {}, pub_key_hash: {}}}",
            self.value,
            hex::encode(&self.pub_key_hash)
        )
    }
}

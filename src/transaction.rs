//! Transaction construction, identity, signing and verification
//!
//! Signing binds each input to exactly one previous output. For input `i` the
//! signed payload is the id of a *trimmed copy* of the transaction in which
//! every signature and every public key is blank, except that input `i`'s
//! public key field holds the referenced output's public key hash.
//! [`Transaction::signature_preimage`] produces those bytes; signer and verifier
//! both go through it, so the two sides cannot drift apart.

use log::debug;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};

use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::hash::{address_to_pubkey_hash, hash_public_key, sha256_bytes, sha256_hex};
use crate::types::*;
use crate::wallet::Wallet;

impl TxOutput {
    /// Create an output of `value` locked to `address`
    pub fn new(value: u64, address: &str) -> Result<Self> {
        let mut output = TxOutput {
            value,
            pub_key_hash: Vec::new(),
        };
        output.lock(address)?;
        Ok(output)
    }

    /// Lock the output to the public key hash embedded in `address`
    pub fn lock(&mut self, address: &str) -> Result<()> {
        self.pub_key_hash = address_to_pubkey_hash(address)?;
        Ok(())
    }

    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.pub_key_hash == pub_key_hash
    }
}

impl TxInput {
    pub fn new(txid: impl Into<String>, vout: i64, pub_key: ByteString) -> Self {
        TxInput {
            txid: txid.into(),
            vout,
            signature: Vec::new(),
            pub_key,
        }
    }

    /// Whether this input's public key hashes to `pub_key_hash`
    pub fn uses_key(&self, pub_key_hash: &[u8]) -> bool {
        hash_public_key(&self.pub_key) == pub_key_hash
    }
}

impl Transaction {
    /// Build a transaction and assign its id
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        let mut tx = Transaction {
            id: String::new(),
            inputs,
            outputs,
        };
        tx.set_id();
        tx
    }

    /// Coinbase paying the standard subsidy to `to`
    ///
    /// `note` is stored in the input's public key field; a default note naming
    /// the recipient is used when none is given.
    pub fn new_coinbase(to: &str, note: Option<&str>) -> Result<Self> {
        Self::new_coinbase_with_reward(to, note, SUBSIDY)
    }

    pub fn new_coinbase_with_reward(to: &str, note: Option<&str>, reward: u64) -> Result<Self> {
        let note = match note {
            Some(note) if !note.is_empty() => note.to_string(),
            _ => format!("Reward to '{}'", to),
        };
        let input = TxInput::new("", COINBASE_OUTPUT_INDEX, note.into_bytes());
        let output = TxOutput::new(reward, to)?;
        Ok(Self::new(vec![input], vec![output]))
    }

    /// Spend `amount` from `from` to `to` using a first-fit selection of unspent outputs
    ///
    /// `accumulated` is the total value of `spendable`. Any excess is returned to
    /// the sender as a change output. The result is unsigned.
    pub fn new_spend(
        from: &Wallet,
        to: &str,
        amount: u64,
        accumulated: u64,
        spendable: &[FullTxOutput],
    ) -> Result<Self> {
        if amount == 0 {
            return Err(LedgerError::InvalidTransaction(
                "Spend amount must be positive".to_string(),
            ));
        }
        if accumulated < amount {
            return Err(LedgerError::InsufficientFunds {
                address: from.address().to_string(),
                available: accumulated,
                required: amount,
            });
        }

        let pub_key = from.public_key();
        let inputs = spendable
            .iter()
            .map(|utxo| TxInput::new(utxo.txid.clone(), utxo.index as i64, pub_key.clone()))
            .collect();

        let mut outputs = vec![TxOutput::new(amount, to)?];
        if accumulated > amount {
            outputs.push(TxOutput::new(accumulated - amount, from.address())?);
        }

        Ok(Self::new(inputs, outputs))
    }

    /// A transaction is coinbase iff it has one input with no source and output index -1
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].txid.is_empty()
            && self.inputs[0].vout == COINBASE_OUTPUT_INDEX
    }

    /// SHA-256 hex over the rendering of every input, then every output
    pub fn compute_id(&self) -> String {
        sha256_hex(identity_preimage(&self.inputs, &self.outputs).as_bytes())
    }

    pub fn set_id(&mut self) {
        self.id = self.compute_id();
    }

    /// Copy with every signature and every public key cleared
    pub fn trimmed_copy(&self) -> Transaction {
        let inputs = self
            .inputs
            .iter()
            .map(|input| TxInput::new(input.txid.clone(), input.vout, Vec::new()))
            .collect();
        Transaction {
            id: self.id.clone(),
            inputs,
            outputs: self.outputs.clone(),
        }
    }

    /// The exact bytes whose SHA-256 is signed for input `input_index`
    pub fn signature_preimage(&self, prev_txs: &TxLookup, input_index: usize) -> Result<Vec<u8>> {
        let input = self.inputs.get(input_index).ok_or_else(|| {
            LedgerError::Reference(format!(
                "Input {} out of range for transaction {}",
                input_index, self.id
            ))
        })?;
        let referenced = referenced_output(input, prev_txs)?;

        let mut copy = self.trimmed_copy();
        copy.inputs[input_index].pub_key = referenced.pub_key_hash.clone();
        Ok(identity_preimage(&copy.inputs, &copy.outputs).into_bytes())
    }

    /// Hex id of the trimmed copy prepared for input `input_index`
    pub fn signature_hash(&self, prev_txs: &TxLookup, input_index: usize) -> Result<String> {
        Ok(sha256_hex(&self.signature_preimage(prev_txs, input_index)?))
    }

    /// Sign every input with `secret_key`. No-op for coinbase transactions.
    pub fn sign(&mut self, secret_key: &SecretKey, prev_txs: &TxLookup) -> Result<()> {
        if self.is_coinbase() {
            return Ok(());
        }

        let secp = Secp256k1::signing_only();
        for index in 0..self.inputs.len() {
            let message = signing_message(&self.signature_preimage(prev_txs, index)?)?;
            let signature = secp.sign_ecdsa(&message, secret_key);
            self.inputs[index].signature = signature.serialize_compact().to_vec();
        }

        debug!("Signed {} input(s) of transaction {}", self.inputs.len(), self.id);
        Ok(())
    }

    /// Verify every input's signature. Coinbase transactions always verify.
    ///
    /// Returns `Ok(false)` for a bad signature, an unparsable key or signature,
    /// or an input whose key does not own the referenced output. A missing
    /// source transaction is a [`LedgerError::Reference`].
    pub fn verify(&self, prev_txs: &TxLookup) -> Result<bool> {
        if self.is_coinbase() {
            return Ok(true);
        }

        let secp = Secp256k1::verification_only();
        for (index, input) in self.inputs.iter().enumerate() {
            let referenced = referenced_output(input, prev_txs)?;
            if !input.uses_key(&referenced.pub_key_hash) {
                debug!("Input {} of {} does not own its referenced output", index, self.id);
                return Ok(false);
            }

            let message = signing_message(&self.signature_preimage(prev_txs, index)?)?;
            let public_key = match PublicKey::from_slice(&input.pub_key) {
                Ok(pk) => pk,
                Err(_) => return Ok(false),
            };
            let signature = match Signature::from_compact(&input.signature) {
                Ok(sig) => sig,
                Err(_) => return Ok(false),
            };

            if secp.verify_ecdsa(&message, &signature, &public_key).is_err() {
                debug!("Signature check failed for input {} of {}", index, self.id);
                return Ok(false);
            }
        }

        Ok(true)
    }
}

fn identity_preimage(inputs: &[TxInput], outputs: &[TxOutput]) -> String {
    let mut data = String::new();
    for input in inputs {
        data.push_str(&input.to_string());
    }
    for output in outputs {
        data.push_str(&output.to_string());
    }
    data
}

fn signing_message(preimage: &[u8]) -> Result<Message> {
    Message::from_digest_slice(&sha256_bytes(preimage))
        .map_err(|e| LedgerError::InvalidTransaction(e.to_string()))
}

/// Resolve the previous output an input spends
fn referenced_output<'a>(input: &TxInput, prev_txs: &'a TxLookup) -> Result<&'a TxOutput> {
    let prev_tx = prev_txs.get(&input.txid).ok_or_else(|| {
        LedgerError::Reference(format!("Previous transaction {} not supplied", input.txid))
    })?;
    usize::try_from(input.vout)
        .ok()
        .and_then(|vout| prev_tx.outputs.get(vout))
        .ok_or_else(|| {
            LedgerError::Reference(format!(
                "Transaction {} has no output {}",
                input.txid, input.vout
            ))
        })
}

//! Key pairs and addresses
//!
//! A [`Wallet`] holds a secp256k1 key pair and the address derived from it.
//! The address is computed once at construction, so reading it never mutates
//! the wallet.

use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{LedgerError, Result};
use crate::hash::{address_to_pubkey_hash, hash_public_key, pubkey_hash_to_address};
use crate::types::ByteString;

#[derive(Clone)]
pub struct Wallet {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: String,
}

impl Wallet {
    /// Generate a fresh key pair on secp256k1
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut secp256k1::rand::thread_rng());
        Self::from_keys(secret_key, public_key)
    }

    /// Rebuild a wallet from a 32-byte secret key
    pub fn from_secret_key(secret_key_bytes: &[u8]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(secret_key_bytes)
            .map_err(|e| LedgerError::InvalidKey(e.to_string()))?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::new(), &secret_key);
        Ok(Self::from_keys(secret_key, public_key))
    }

    /// Rebuild a wallet from a hex-encoded secret key
    pub fn from_secret_key_hex(secret_key_hex: &str) -> Result<Self> {
        let bytes = hex::decode(secret_key_hex).map_err(|e| LedgerError::InvalidKey(e.to_string()))?;
        Self::from_secret_key(&bytes)
    }

    fn from_keys(secret_key: SecretKey, public_key: PublicKey) -> Self {
        let address = pubkey_hash_to_address(&hash_public_key(&public_key.serialize()));
        Self {
            secret_key,
            public_key,
            address,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Compressed SEC1 encoding of the public key, as carried by transaction inputs
    pub fn public_key(&self) -> ByteString {
        self.public_key.serialize().to_vec()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    pub fn public_key_hash(&self) -> ByteString {
        hash_public_key(&self.public_key.serialize())
    }

    /// The raw secret key. Only for signing and explicit wallet persistence.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Wallets held in memory, keyed by address
#[derive(Debug, Default, Clone)]
pub struct Wallets {
    wallets: BTreeMap<String, Wallet>,
}

impl Wallets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a wallet and keep it
    pub fn create_wallet(&mut self) -> &Wallet {
        self.add(Wallet::generate())
    }

    /// Keep `wallet`; an existing wallet at the same address is left in place
    pub fn add(&mut self, wallet: Wallet) -> &Wallet {
        self.wallets.entry(wallet.address().to_string()).or_insert(wallet)
    }

    pub fn get(&self, address: &str) -> Option<&Wallet> {
        self.wallets.get(address)
    }

    /// Addresses in sorted order
    pub fn addresses(&self) -> Vec<String> {
        self.wallets.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

/// Whether `address` is a well-formed base58-check address with a key hash payload
pub fn validate_address(address: &str) -> bool {
    address_to_pubkey_hash(address).is_ok()
}

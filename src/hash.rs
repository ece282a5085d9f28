//! Hashing and encoding helpers: SHA-256, public key hashing and base58-check

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::types::ByteString;

/// SHA-256 of `data` as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_bytes(data))
}

/// SHA-256 of `data`
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// RIPEMD160(SHA256(pubkey)): the hash an output is locked to
pub fn hash_public_key(pub_key: &[u8]) -> ByteString {
    let sha256_hash = Sha256::digest(pub_key);
    Ripemd160::digest(sha256_hash).to_vec()
}

/// First four bytes of double SHA-256
fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = sha256d::Hash::engine();
    hasher.input(payload);
    let digest = sha256d::Hash::from_engine(hasher).into_inner();
    let mut check = [0u8; CHECKSUM_LEN];
    check.copy_from_slice(&digest[..CHECKSUM_LEN]);
    check
}

/// base58(payload || checksum(payload))
pub fn base58check_encode(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    bs58::encode(data).into_string()
}

/// Decode base58-check, returning the payload with the checksum verified and stripped
pub fn base58check_decode(encoded: &str) -> Result<ByteString> {
    let data = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| LedgerError::InvalidAddress(format!("{}: {}", encoded, e)))?;

    if data.len() < CHECKSUM_LEN {
        return Err(LedgerError::InvalidAddress(format!(
            "{}: too short for a checksum",
            encoded
        )));
    }

    let (payload, check) = data.split_at(data.len() - CHECKSUM_LEN);
    if checksum(payload) != check {
        return Err(LedgerError::InvalidAddress(format!("{}: checksum mismatch", encoded)));
    }

    Ok(payload.to_vec())
}

/// Address for a public key hash: base58-check(version || hash)
pub fn pubkey_hash_to_address(pub_key_hash: &[u8]) -> String {
    let mut payload = Vec::with_capacity(1 + pub_key_hash.len());
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(pub_key_hash);
    base58check_encode(&payload)
}

/// Decode an address back to the public key hash it embeds
pub fn address_to_pubkey_hash(address: &str) -> Result<ByteString> {
    let payload = base58check_decode(address)?;

    match payload.split_first() {
        Some((&ADDRESS_VERSION, hash)) if hash.len() == PUBKEY_HASH_LEN => Ok(hash.to_vec()),
        Some((&version, _)) if version != ADDRESS_VERSION => Err(LedgerError::InvalidAddress(
            format!("{}: unexpected version byte {:#04x}", address, version),
        )),
        _ => Err(LedgerError::InvalidAddress(format!(
            "{}: payload is not a {}-byte key hash",
            address, PUBKEY_HASH_LEN
        ))),
    }
}

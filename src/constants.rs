//! Ledger constants

/// Reward paid by every coinbase transaction
pub const SUBSIDY: u64 = 1000;

/// Default proof-of-work difficulty: leading zero bits required of a header hash
pub const DEFAULT_DIFFICULTY_BITS: u32 = 4;

/// Width of a header hash in bits
pub const MAX_TARGET_BITS: u32 = 256;

/// Number of buffered transactions that triggers block assembly
pub const DEFAULT_POOL_CAPACITY: usize = 2;

/// Version byte prefixed to the public key hash before base58-check encoding
pub const ADDRESS_VERSION: u8 = 0x00;

/// Length of a RIPEMD160(SHA256(pubkey)) hash
pub const PUBKEY_HASH_LEN: usize = 20;

/// Length of the base58-check checksum
pub const CHECKSUM_LEN: usize = 4;

/// Output index carried by the single coinbase input
pub const COINBASE_OUTPUT_INDEX: i64 = -1;

/// Prefix shared by every UTXO index document key
pub const UTXO_KEY_PREFIX: &str = "UTXO";

/// Key of the UTXO index's last-indexed-height sentinel
pub const LAST_HEIGHT_KEY: &str = "UTXOl";

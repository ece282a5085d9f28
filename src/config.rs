//! Ledger configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::error::{LedgerError, Result};
use crate::wallet::validate_address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero bits a block header hash must have
    pub difficulty_bits: u32,
    /// Buffered transactions that trigger block assembly
    pub pool_capacity: usize,
    /// Coinbase reward
    pub subsidy: u64,
    /// Recipient of the coinbase added to each assembled block, if any
    pub miner_address: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            difficulty_bits: DEFAULT_DIFFICULTY_BITS,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            subsidy: SUBSIDY,
            miner_address: None,
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LedgerConfig =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty_bits == 0 || self.difficulty_bits > MAX_TARGET_BITS {
            return Err(LedgerError::Config(format!(
                "difficulty_bits must be in 1..={}, got {}",
                MAX_TARGET_BITS, self.difficulty_bits
            )));
        }
        if self.pool_capacity == 0 {
            return Err(LedgerError::Config("pool_capacity must be positive".to_string()));
        }
        if let Some(address) = &self.miner_address {
            if !validate_address(address) {
                return Err(LedgerError::Config(format!("invalid miner_address {}", address)));
            }
        }
        Ok(())
    }
}

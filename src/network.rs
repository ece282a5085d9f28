//! Peer broadcast collaborator
//!
//! Delivering a transaction to peers is best effort. A spend is committed
//! locally whether or not any peer received it; the outcome is reported as a
//! [`BroadcastStatus`] so the caller can decide whether to retry.

use log::{debug, warn};

use crate::error::Result;
use crate::types::Transaction;

/// Peer networking as seen by the ledger
pub trait Broadcaster {
    fn broadcast_transaction(&self, tx: &Transaction) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastStatus {
    Delivered,
    Failed(String),
    /// No broadcaster configured
    Skipped,
}

impl BroadcastStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, BroadcastStatus::Delivered)
    }
}

/// Broadcast `tx` if a broadcaster is available, converting failure into a status
pub fn broadcast_best_effort(broadcaster: Option<&dyn Broadcaster>, tx: &Transaction) -> BroadcastStatus {
    let Some(broadcaster) = broadcaster else {
        debug!("No broadcaster configured; transaction {} kept local", tx.id);
        return BroadcastStatus::Skipped;
    };

    match broadcaster.broadcast_transaction(tx) {
        Ok(()) => BroadcastStatus::Delivered,
        Err(e) => {
            warn!("Broadcast of transaction {} failed: {}", tx.id, e);
            BroadcastStatus::Failed(e.to_string())
        }
    }
}

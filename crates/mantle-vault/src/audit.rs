//! audit trail
//!
//! every state mutation appends one event and emits a structured tracing
//! record. the degraded fallback ownership check gets its own event kind so
//! it can never pass for a full proof check in the trail

use serde::{Deserialize, Serialize};

use mantle_verifier::{Hash256, ProofHash};

use crate::address::ProxyAddress;
use crate::config::VaultParams;
use crate::types::{Amount, BindingHash, OwnerId, Timestamp};
use crate::withdrawal::WithdrawalId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEvent {
    ProxyCreated {
        owner: OwnerId,
        proxy: ProxyAddress,
        nonce: u64,
        binding_hash: BindingHash,
        at: Timestamp,
    },
    Deposited {
        from: OwnerId,
        proxy: ProxyAddress,
        amount: Amount,
        at: Timestamp,
    },
    /// the only side effect of a successful consuming verification
    ProofConsumed {
        owner: OwnerId,
        proxy: ProxyAddress,
        proof_hash: ProofHash,
        timestamp: u64,
    },
    /// degraded ownership check used because no verifier key is configured
    FallbackCheckUsed {
        owner: OwnerId,
        proxy: ProxyAddress,
        at: Timestamp,
    },
    WithdrawalInstant {
        owner: OwnerId,
        proxy: ProxyAddress,
        amount: Amount,
        at: Timestamp,
    },
    WithdrawalRequested {
        id: WithdrawalId,
        owner: OwnerId,
        proxy: ProxyAddress,
        amount: Amount,
        unlock_time: Timestamp,
        at: Timestamp,
    },
    WithdrawalExecuted {
        id: WithdrawalId,
        owner: OwnerId,
        amount: Amount,
        at: Timestamp,
    },
    WithdrawalCancelled {
        id: WithdrawalId,
        by: OwnerId,
        amount: Amount,
        at: Timestamp,
    },
    /// key rotations must be independently observable mid-flight
    KeyRotated { fingerprint: Hash256 },
    /// verifier removed; subsequent requests use the fallback check
    KeyCleared,
    ParamsUpdated { params: VaultParams },
    Paused { by: OwnerId },
    Unpaused { by: OwnerId },
    AdminTransferred { from: OwnerId, to: OwnerId },
    GuardianChanged { guardian: OwnerId },
}

/// append-only in-memory event log
#[derive(Clone, Debug, Default)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: AuditEvent) {
        tracing::info!(target: "mantle::audit", event = ?event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//! versioned snapshot of persisted vault state
//!
//! the off-chain stand-in for upgrade-in-place: storage outlives logic.
//! collections are serialized as key-sorted pairs so snapshots of equal
//! state are byte-identical. the audit log is observability, not state,
//! and is not captured

use serde::{Deserialize, Serialize};

use mantle_verifier::{ProofHash, VerificationKey};

use crate::address::ProxyAddress;
use crate::config::VaultParams;
use crate::registry::ProxyBinding;
use crate::types::{Amount, OwnerId};
use crate::withdrawal::{PendingWithdrawal, WithdrawalId};

/// bump on any incompatible layout change; restore rejects anything else
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub schema_version: u32,
    pub params: VaultParams,
    pub admin: OwnerId,
    pub guardian: OwnerId,
    pub paused: bool,
    /// `None` means the vault was in degraded fallback mode
    pub verification_key: Option<VerificationKey>,
    /// consumed-proof hashes survive key rotations and fallback gaps
    pub used_proofs: Vec<ProofHash>,
    pub bindings: Vec<(ProxyAddress, ProxyBinding)>,
    pub proxies_by_owner: Vec<(OwnerId, Vec<ProxyAddress>)>,
    pub nonces: Vec<(OwnerId, u64)>,
    pub pending: Vec<(WithdrawalId, PendingWithdrawal)>,
    pub total_locked: Amount,
    pub sequence: u64,
}

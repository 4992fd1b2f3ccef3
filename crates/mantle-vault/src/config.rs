//! tunable vault parameters

use serde::{Deserialize, Serialize};

use crate::types::Amount;

/// administrative numeric parameters, admin-mutable, readable by anyone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultParams {
    /// withdrawals at or above this amount take the time-locked path
    pub instant_threshold: Amount,
    /// delay a time-locked withdrawal must wait out
    pub timelock_delay_secs: u64,
    /// how long after its embedded timestamp a proof stays fresh
    pub proof_validity_secs: u64,
}

impl Default for VaultParams {
    fn default() -> Self {
        Self {
            instant_threshold: Amount::new(1_000_000),
            timelock_delay_secs: 24 * 60 * 60,
            proof_validity_secs: 60 * 60,
        }
    }
}

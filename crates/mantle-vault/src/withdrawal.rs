//! pending withdrawals and their terminal-state guards
//!
//! a request at or above the instant threshold reserves its amount out of
//! the proxy balance and parks here until `unlock_time`. exactly one of
//! {executed, cancelled} may ever become true, and once set it never
//! reverts; re-transitions fail with distinct errors instead of no-opping

use serde::{Deserialize, Serialize};

use crate::address::ProxyAddress;
use crate::error::{Result, VaultError};
use crate::types::{Amount, OwnerId, Timestamp};

/// domain separator for withdrawal id derivation
pub const WITHDRAWAL_ID_DOMAIN: &[u8] = b"mantle.vault.withdrawal-id.v1";

/// collision-resistant key for one pending withdrawal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WithdrawalId(pub [u8; 32]);

impl WithdrawalId {
    /// derive the ledger key for a request
    ///
    /// `sequence` is a vault-global monotonic counter, so two identical
    /// (owner, proxy, amount) requests in the same instant still get
    /// distinct ids
    pub fn derive(
        owner: &OwnerId,
        proxy: &ProxyAddress,
        amount: Amount,
        request_time: Timestamp,
        sequence: u64,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(WITHDRAWAL_ID_DOMAIN);
        hasher.update(&owner.0);
        hasher.update(&proxy.0);
        hasher.update(&amount.to_le_bytes());
        hasher.update(&request_time.to_le_bytes());
        hasher.update(&sequence.to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl core::fmt::Display for WithdrawalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// one time-locked withdrawal request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingWithdrawal {
    /// requester, copied at request time, immutable
    pub owner: OwnerId,
    pub proxy: ProxyAddress,
    pub amount: Amount,
    /// request time + configured delay
    pub unlock_time: Timestamp,
    pub executed: bool,
    pub cancelled: bool,
}

impl PendingWithdrawal {
    pub fn new(
        owner: OwnerId,
        proxy: ProxyAddress,
        amount: Amount,
        unlock_time: Timestamp,
    ) -> Self {
        Self {
            owner,
            proxy,
            amount,
            unlock_time,
            executed: false,
            cancelled: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.executed || self.cancelled
    }

    /// distinct errors for the two terminal states
    pub fn ensure_open(&self) -> Result<()> {
        if self.executed {
            return Err(VaultError::AlreadyExecuted);
        }
        if self.cancelled {
            return Err(VaultError::AlreadyCancelled);
        }
        Ok(())
    }

    /// transition to executed; requires the time lock to have elapsed
    pub fn mark_executed(&mut self, now: Timestamp) -> Result<()> {
        self.ensure_open()?;
        if now < self.unlock_time {
            return Err(VaultError::TimelockActive {
                unlock_time: self.unlock_time,
            });
        }
        self.executed = true;
        Ok(())
    }

    /// transition to cancelled; allowed at any time before a terminal state
    pub fn mark_cancelled(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.cancelled = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = Timestamp(1_000);
    const UNLOCK: Timestamp = Timestamp(2_000);

    fn pending() -> PendingWithdrawal {
        PendingWithdrawal::new(
            OwnerId([1u8; 32]),
            ProxyAddress([2u8; 20]),
            Amount::new(500),
            UNLOCK,
        )
    }

    #[test]
    fn id_unique_per_sequence() {
        let owner = OwnerId([1u8; 32]);
        let proxy = ProxyAddress([2u8; 20]);
        let amount = Amount::new(500);

        // identical tuple, same instant, different sequence
        let a = WithdrawalId::derive(&owner, &proxy, amount, NOW, 0);
        let b = WithdrawalId::derive(&owner, &proxy, amount, NOW, 1);
        assert_ne!(a, b);

        // deterministic
        assert_eq!(a, WithdrawalId::derive(&owner, &proxy, amount, NOW, 0));
    }

    #[test]
    fn execute_respects_time_lock() {
        let mut w = pending();
        assert_eq!(
            w.mark_executed(Timestamp(1_999)).unwrap_err(),
            VaultError::TimelockActive {
                unlock_time: UNLOCK
            }
        );
        assert!(!w.is_terminal());

        // boundary: exactly at unlock_time is executable
        w.mark_executed(UNLOCK).unwrap();
        assert!(w.executed);
    }

    #[test]
    fn terminal_states_immutable() {
        let mut executed = pending();
        executed.mark_executed(Timestamp(3_000)).unwrap();
        assert_eq!(
            executed.mark_executed(Timestamp(4_000)).unwrap_err(),
            VaultError::AlreadyExecuted
        );
        assert_eq!(
            executed.mark_cancelled().unwrap_err(),
            VaultError::AlreadyExecuted
        );
        assert!(executed.executed && !executed.cancelled);

        let mut cancelled = pending();
        cancelled.mark_cancelled().unwrap();
        assert_eq!(
            cancelled.mark_cancelled().unwrap_err(),
            VaultError::AlreadyCancelled
        );
        assert_eq!(
            cancelled.mark_executed(Timestamp(4_000)).unwrap_err(),
            VaultError::AlreadyCancelled
        );
        assert!(cancelled.cancelled && !cancelled.executed);
    }
}

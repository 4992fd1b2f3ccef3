//! settlement ledger seam
//!
//! the host ledger's native value-transfer primitive, behind a trait so the
//! vault core never knows whether it is talking to a chain runtime or a test
//! double. any transfer failure aborts the triggering vault call entirely

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{Amount, OwnerId};

/// a rejected host-ledger transfer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransferError(pub String);

impl TransferError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// native value transfer of the host ledger
pub trait SettlementLedger {
    /// pull `amount` from `from` into vault custody (deposits)
    fn collect(&mut self, from: &OwnerId, amount: Amount) -> Result<(), TransferError>;

    /// push `amount` from vault custody to `to` (withdrawal payouts)
    fn payout(&mut self, to: &OwnerId, amount: Amount) -> Result<(), TransferError>;
}

/// in-memory ledger for tests and demos, with injectable payout failure
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    accounts: HashMap<OwnerId, Amount>,
    custodied: Amount,
    fail_payouts: bool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// seed an external account
    pub fn fund(&mut self, owner: OwnerId, amount: Amount) {
        let balance = self.accounts.entry(owner).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, owner: &OwnerId) -> Amount {
        self.accounts.get(owner).copied().unwrap_or(Amount::ZERO)
    }

    /// funds currently held by the vault's custody account
    pub fn custodied(&self) -> Amount {
        self.custodied
    }

    /// make every subsequent payout fail (transfer-failure atomicity tests)
    pub fn set_fail_payouts(&mut self, fail: bool) {
        self.fail_payouts = fail;
    }
}

impl SettlementLedger for InMemoryLedger {
    fn collect(&mut self, from: &OwnerId, amount: Amount) -> Result<(), TransferError> {
        let balance = self.accounts.entry(*from).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or_else(|| TransferError::new("insufficient external balance"))?;
        self.custodied = self.custodied.saturating_add(amount);
        Ok(())
    }

    fn payout(&mut self, to: &OwnerId, amount: Amount) -> Result<(), TransferError> {
        if self.fail_payouts {
            return Err(TransferError::new("payout rejected"));
        }
        self.custodied = self
            .custodied
            .checked_sub(amount)
            .ok_or_else(|| TransferError::new("custody account underfunded"))?;
        let balance = self.accounts.entry(*to).or_default();
        *balance = balance.saturating_add(amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_and_payout_move_custody() {
        let mut ledger = InMemoryLedger::new();
        let alice = OwnerId([1u8; 32]);
        ledger.fund(alice, Amount::new(100));

        ledger.collect(&alice, Amount::new(60)).unwrap();
        assert_eq!(ledger.balance_of(&alice), Amount::new(40));
        assert_eq!(ledger.custodied(), Amount::new(60));

        ledger.payout(&alice, Amount::new(10)).unwrap();
        assert_eq!(ledger.balance_of(&alice), Amount::new(50));
        assert_eq!(ledger.custodied(), Amount::new(50));
    }

    #[test]
    fn failed_transfers_change_nothing() {
        let mut ledger = InMemoryLedger::new();
        let alice = OwnerId([1u8; 32]);
        ledger.fund(alice, Amount::new(5));

        assert!(ledger.collect(&alice, Amount::new(10)).is_err());
        assert_eq!(ledger.balance_of(&alice), Amount::new(5));
        assert_eq!(ledger.custodied(), Amount::ZERO);

        ledger.collect(&alice, Amount::new(5)).unwrap();
        ledger.set_fail_payouts(true);
        assert!(ledger.payout(&alice, Amount::new(5)).is_err());
        assert_eq!(ledger.custodied(), Amount::new(5));
    }
}

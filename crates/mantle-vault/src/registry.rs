//! binding registry: the root of truth for who may move custodied funds
//!
//! exclusively owns ProxyBinding records, the per-owner creation nonces and
//! the owner → proxies index. balances mutate only through `credit`/`debit`
//! so no other component can adjust them and drift from the conservation
//! invariant

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::ProxyAddress;
use crate::error::{Result, VaultError};
use crate::types::{Amount, BindingHash, OwnerId, Timestamp};

/// one binding per proxy address
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyBinding {
    /// controlling identity, immutable after creation
    pub owner: OwnerId,
    /// public commitment supplied at creation
    pub binding_hash: BindingHash,
    /// spendable balance currently held for this proxy
    pub deposited: Amount,
    pub created_at: Timestamp,
    /// set at creation, never unset: proxies are permanent
    pub is_active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct BindingRegistry {
    bindings: HashMap<ProxyAddress, ProxyBinding>,
    by_owner: HashMap<OwnerId, Vec<ProxyAddress>>,
    nonces: HashMap<OwnerId, u64>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// derive and register a new proxy for `owner`
    ///
    /// the owner's nonce advances only on success, so a failed creation
    /// never burns a derivation slot. a derived address colliding with an
    /// existing binding fails loudly instead of overwriting
    pub fn create(
        &mut self,
        owner: OwnerId,
        binding_hash: BindingHash,
        now: Timestamp,
    ) -> Result<(ProxyAddress, u64)> {
        let nonce = self.nonce_of(&owner);
        let address = ProxyAddress::derive(&owner, nonce, &binding_hash);
        if self.bindings.contains_key(&address) {
            return Err(VaultError::ProxyCollision(address));
        }

        self.bindings.insert(
            address,
            ProxyBinding {
                owner,
                binding_hash,
                deposited: Amount::ZERO,
                created_at: now,
                is_active: true,
            },
        );
        self.by_owner.entry(owner).or_default().push(address);
        self.nonces.insert(owner, nonce + 1);
        Ok((address, nonce))
    }

    pub fn get(&self, address: &ProxyAddress) -> Option<&ProxyBinding> {
        self.bindings.get(address)
    }

    pub fn get_checked(&self, address: &ProxyAddress) -> Result<&ProxyBinding> {
        self.bindings
            .get(address)
            .filter(|b| b.is_active)
            .ok_or(VaultError::ProxyNotFound(*address))
    }

    /// add to a proxy's balance
    pub fn credit(&mut self, address: &ProxyAddress, amount: Amount) -> Result<()> {
        let binding = self
            .bindings
            .get_mut(address)
            .ok_or(VaultError::ProxyNotFound(*address))?;
        binding.deposited = binding
            .deposited
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        Ok(())
    }

    /// remove from a proxy's balance; cannot go negative
    pub fn debit(&mut self, address: &ProxyAddress, amount: Amount) -> Result<()> {
        let binding = self
            .bindings
            .get_mut(address)
            .ok_or(VaultError::ProxyNotFound(*address))?;
        binding.deposited =
            binding
                .deposited
                .checked_sub(amount)
                .ok_or(VaultError::InsufficientFunds {
                    requested: amount,
                    available: binding.deposited,
                })?;
        Ok(())
    }

    /// every proxy ever derived for this owner, in creation order
    pub fn proxies_of(&self, owner: &OwnerId) -> &[ProxyAddress] {
        self.by_owner.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// next derivation nonce for this owner
    pub fn nonce_of(&self, owner: &OwnerId) -> u64 {
        self.nonces.get(owner).copied().unwrap_or(0)
    }

    /// sum of all active balances (conservation checks)
    pub fn total_balance(&self) -> Amount {
        self.bindings
            .values()
            .filter(|b| b.is_active)
            .fold(Amount::ZERO, |acc, b| acc.saturating_add(b.deposited))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProxyAddress, &ProxyBinding)> {
        self.bindings.iter()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        HashMap<ProxyAddress, ProxyBinding>,
        HashMap<OwnerId, Vec<ProxyAddress>>,
        HashMap<OwnerId, u64>,
    ) {
        (self.bindings, self.by_owner, self.nonces)
    }

    pub(crate) fn from_parts(
        bindings: HashMap<ProxyAddress, ProxyBinding>,
        by_owner: HashMap<OwnerId, Vec<ProxyAddress>>,
        nonces: HashMap<OwnerId, u64>,
    ) -> Self {
        Self {
            bindings,
            by_owner,
            nonces,
        }
    }
}

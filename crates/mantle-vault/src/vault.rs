//! the escrow vault: orchestrates verifier, registry and pending ledger
//!
//! the canonical execution model is strictly serialized — every entry point
//! takes `&mut self`, so a call runs to completion before the next and the
//! reserve-by-debit pattern needs no further locking. callers hosting this
//! behind a concurrent service must keep that exclusivity (a mutex around
//! the vault is the direct translation).
//!
//! each entry point is independently atomic: validate everything, stage the
//! external transfer, and only then commit in-process state. a rejected
//! payout or collect aborts the call with every balance, the replay set and
//! the pending ledger untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use mantle_verifier::{
    Hash256, Proof, ProofHash, PublicInputs, UsedProofSet, VerificationKey, Verifier,
};

use crate::address::{self, ProxyAddress};
use crate::audit::{AuditEvent, AuditLog};
use crate::config::VaultParams;
use crate::error::{Result, VaultError};
use crate::ledger::SettlementLedger;
use crate::policy::Policy;
use crate::registry::{BindingRegistry, ProxyBinding};
use crate::snapshot::{VaultSnapshot, SCHEMA_VERSION};
use crate::types::{Amount, BindingHash, OwnerId, Timestamp};
use crate::withdrawal::{PendingWithdrawal, WithdrawalId};

/// domain separator for the degraded fallback ownership check
pub const FALLBACK_DOMAIN: &[u8] = b"mantle.vault.fallback.v1";

/// the hash a caller must present when no verifier key is configured
///
/// strictly weaker than a proof: anyone who can hash public data can compute
/// it. kept as an explicit degraded mode, always distinguishable in the
/// audit trail
pub fn fallback_ownership_hash(owner: &OwnerId, proxy: &ProxyAddress) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(FALLBACK_DOMAIN);
    hasher.update(&address::owner_hash(owner).0);
    hasher.update(&address::proxy_hash(proxy).0);
    Hash256(*hasher.finalize().as_bytes())
}

/// which path a withdrawal request took
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalOutcome {
    /// below threshold: funds already paid out
    Instant,
    /// at or above threshold: reserved, waiting out the delay
    Timelocked {
        id: WithdrawalId,
        unlock_time: Timestamp,
    },
}

#[derive(Debug)]
pub struct Vault<L: SettlementLedger> {
    params: VaultParams,
    policy: Policy,
    verifier: Option<Verifier>,
    /// replay set kept alive while no verifier key is configured
    used_reserve: UsedProofSet,
    registry: BindingRegistry,
    pending: HashMap<WithdrawalId, PendingWithdrawal>,
    /// active balances plus nothing else: reserved pending amounts stay
    /// counted until executed (funds remain custodied)
    total_locked: Amount,
    /// discriminator folded into withdrawal ids, bumped per request
    sequence: u64,
    audit: AuditLog,
    ledger: L,
}

impl<L: SettlementLedger> Vault<L> {
    /// a vault with no verifier key starts in degraded fallback mode
    pub fn new(admin: OwnerId, guardian: OwnerId, params: VaultParams, ledger: L) -> Self {
        Self {
            params,
            policy: Policy::new(admin, guardian),
            verifier: None,
            used_reserve: UsedProofSet::new(),
            registry: BindingRegistry::new(),
            pending: HashMap::new(),
            total_locked: Amount::ZERO,
            sequence: 0,
            audit: AuditLog::new(),
            ledger,
        }
    }

    /// construct with a verifier key already configured
    pub fn with_verifier(mut self, key: VerificationKey) -> Self {
        let verifier = Verifier::new(key, self.params.proof_validity_secs);
        self.audit.record(AuditEvent::KeyRotated {
            fingerprint: verifier.key().fingerprint(),
        });
        self.verifier = Some(verifier);
        self
    }

    // === core operations ===

    /// derive and register a proxy for the caller's next nonce
    pub fn create_proxy(
        &mut self,
        caller: OwnerId,
        binding_hash: BindingHash,
        now: Timestamp,
    ) -> Result<ProxyAddress> {
        self.policy.ensure_not_paused()?;
        let (address, nonce) = self.registry.create(caller, binding_hash, now)?;
        self.audit.record(AuditEvent::ProxyCreated {
            owner: caller,
            proxy: address,
            nonce,
            binding_hash,
            at: now,
        });
        Ok(address)
    }

    /// move funds from `from` on the host ledger into a proxy's custody
    ///
    /// any funder may deposit; only the bound owner can ever withdraw
    pub fn deposit(
        &mut self,
        from: OwnerId,
        proxy: ProxyAddress,
        amount: Amount,
        now: Timestamp,
    ) -> Result<()> {
        self.policy.ensure_not_paused()?;
        if amount.is_zero() {
            return Err(VaultError::AmountZero);
        }
        let binding = self.registry.get_checked(&proxy)?;
        // pre-check both additions so a landed collect always commits
        binding
            .deposited
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        let new_total = self
            .total_locked
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        self.ledger
            .collect(&from, amount)
            .map_err(|e| VaultError::TransferFailed(e.0))?;

        self.registry.credit(&proxy, amount)?;
        self.total_locked = new_total;
        self.audit.record(AuditEvent::Deposited {
            from,
            proxy,
            amount,
            at: now,
        });
        Ok(())
    }

    /// withdraw against an ownership proof
    ///
    /// below the instant threshold the payout happens synchronously; at or
    /// above it the amount is reserved out of the spendable balance and a
    /// pending entry is created. either way the proof is consumed exactly
    /// once, and a failed check leaves no trace
    pub fn request_withdrawal(
        &mut self,
        caller: OwnerId,
        proxy: ProxyAddress,
        amount: Amount,
        proof_bytes: &[u8],
        public_inputs: &[Hash256],
        now: Timestamp,
    ) -> Result<WithdrawalOutcome> {
        self.policy.ensure_not_paused()?;
        if amount.is_zero() {
            return Err(VaultError::AmountZero);
        }
        let binding = self.registry.get_checked(&proxy)?;
        if binding.owner != caller {
            return Err(VaultError::Unauthorized);
        }
        let available = binding.deposited;
        let binding_hash = binding.binding_hash;
        if available < amount {
            return Err(VaultError::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        let proof = Proof::from_bytes(proof_bytes.to_vec()).map_err(VaultError::Proof)?;
        let checked = self.check_ownership(&caller, &proxy, &binding_hash, &proof, public_inputs, now)?;

        if amount < self.params.instant_threshold {
            // instant path: payout first, commit only once it lands
            let new_total = self
                .total_locked
                .checked_sub(amount)
                .ok_or(VaultError::Overflow)?;
            self.ledger
                .payout(&caller, amount)
                .map_err(|e| VaultError::TransferFailed(e.0))?;

            self.consume_ownership(checked, caller, proxy, now)?;
            self.registry.debit(&proxy, amount)?;
            self.total_locked = new_total;
            self.audit.record(AuditEvent::WithdrawalInstant {
                owner: caller,
                proxy,
                amount,
                at: now,
            });
            Ok(WithdrawalOutcome::Instant)
        } else {
            // timelocked path: reserve now so repeated requests cannot
            // double-spend the balance; funds stay custodied, so the
            // total-locked aggregate is untouched
            self.consume_ownership(checked, caller, proxy, now)?;
            self.registry.debit(&proxy, amount)?;

            let sequence = self.sequence;
            self.sequence += 1;
            let id = WithdrawalId::derive(&caller, &proxy, amount, now, sequence);
            let unlock_time = now.plus_secs(self.params.timelock_delay_secs);
            self.pending
                .insert(id, PendingWithdrawal::new(caller, proxy, amount, unlock_time));
            self.audit.record(AuditEvent::WithdrawalRequested {
                id,
                owner: caller,
                proxy,
                amount,
                unlock_time,
                at: now,
            });
            Ok(WithdrawalOutcome::Timelocked { id, unlock_time })
        }
    }

    /// finalize a matured pending withdrawal
    pub fn execute_withdrawal(
        &mut self,
        caller: OwnerId,
        id: WithdrawalId,
        now: Timestamp,
    ) -> Result<()> {
        // pause blocks this funds-out path too; cancellation stays open
        self.policy.ensure_not_paused()?;
        let entry = self
            .pending
            .get(&id)
            .ok_or(VaultError::WithdrawalNotFound(id))?;
        if entry.owner != caller {
            return Err(VaultError::Unauthorized);
        }
        entry.ensure_open()?;
        if now < entry.unlock_time {
            return Err(VaultError::TimelockActive {
                unlock_time: entry.unlock_time,
            });
        }
        let amount = entry.amount;
        let new_total = self
            .total_locked
            .checked_sub(amount)
            .ok_or(VaultError::Overflow)?;

        self.ledger
            .payout(&caller, amount)
            .map_err(|e| VaultError::TransferFailed(e.0))?;

        let entry = self
            .pending
            .get_mut(&id)
            .ok_or(VaultError::WithdrawalNotFound(id))?;
        entry.mark_executed(now)?;
        self.total_locked = new_total;
        self.audit.record(AuditEvent::WithdrawalExecuted {
            id,
            owner: caller,
            amount,
            at: now,
        });
        Ok(())
    }

    /// cancel a pending withdrawal, restoring the reserved amount
    ///
    /// open to the requester and the guardian, and deliberately not
    /// pause-gated: trapping funds during an incident would be its own bug
    pub fn cancel_withdrawal(
        &mut self,
        caller: OwnerId,
        id: WithdrawalId,
        now: Timestamp,
    ) -> Result<()> {
        let entry = self
            .pending
            .get(&id)
            .ok_or(VaultError::WithdrawalNotFound(id))?;
        if entry.owner != caller && !self.policy.is_guardian(&caller) {
            return Err(VaultError::Unauthorized);
        }
        entry.ensure_open()?;
        let proxy = entry.proxy;
        let amount = entry.amount;

        // funds never left custody; restore spendability, total untouched
        self.registry.credit(&proxy, amount)?;
        let entry = self
            .pending
            .get_mut(&id)
            .ok_or(VaultError::WithdrawalNotFound(id))?;
        entry.mark_cancelled()?;
        self.audit.record(AuditEvent::WithdrawalCancelled {
            id,
            by: caller,
            amount,
            at: now,
        });
        Ok(())
    }

    // === proof plumbing ===

    /// run the configured ownership check without consuming anything
    ///
    /// returns the proof hash to consume at commit time when a verifier is
    /// configured, `None` when the degraded fallback matched
    fn check_ownership(
        &self,
        caller: &OwnerId,
        proxy: &ProxyAddress,
        binding_hash: &BindingHash,
        proof: &Proof,
        public_inputs: &[Hash256],
        now: Timestamp,
    ) -> Result<Option<(ProofHash, u64)>> {
        match &self.verifier {
            Some(verifier) => {
                let inputs =
                    PublicInputs::from_words(public_inputs).map_err(VaultError::Proof)?;
                if inputs.owner_hash != address::owner_hash(caller)
                    || inputs.proxy_hash != address::proxy_hash(proxy)
                    || inputs.binding_hash != Hash256(binding_hash.0)
                {
                    return Err(VaultError::ProofBindingMismatch);
                }
                let hash = verifier
                    .check(proof, &inputs, now.secs())
                    .map_err(VaultError::Proof)?;
                Ok(Some((hash, inputs.timestamp)))
            }
            None => {
                if proof.commitment() != fallback_ownership_hash(caller, proxy) {
                    return Err(VaultError::OwnershipCheckFailed);
                }
                Ok(None)
            }
        }
    }

    /// commit half: mark the proof spent and write the audit record
    fn consume_ownership(
        &mut self,
        checked: Option<(ProofHash, u64)>,
        owner: OwnerId,
        proxy: ProxyAddress,
        now: Timestamp,
    ) -> Result<()> {
        match checked {
            Some((proof_hash, timestamp)) => {
                if let Some(verifier) = &mut self.verifier {
                    verifier.consume(proof_hash).map_err(VaultError::Proof)?;
                }
                self.audit.record(AuditEvent::ProofConsumed {
                    owner,
                    proxy,
                    proof_hash,
                    timestamp,
                });
            }
            None => {
                self.audit.record(AuditEvent::FallbackCheckUsed {
                    owner,
                    proxy,
                    at: now,
                });
            }
        }
        Ok(())
    }

    // === administrative surface ===

    /// replace (or clear) the verifier key wholesale
    ///
    /// the consumed-proof set survives rotations and fallback gaps: a proof
    /// spent under an old key stays spent forever
    pub fn set_verification_key(
        &mut self,
        caller: OwnerId,
        key: Option<VerificationKey>,
    ) -> Result<()> {
        self.policy.ensure_admin(&caller)?;
        match key {
            Some(key) => {
                let fingerprint = match &mut self.verifier {
                    Some(verifier) => verifier.set_key(key),
                    None => {
                        let used = std::mem::take(&mut self.used_reserve);
                        let verifier =
                            Verifier::from_parts(key, self.params.proof_validity_secs, used);
                        let fingerprint = verifier.key().fingerprint();
                        self.verifier = Some(verifier);
                        fingerprint
                    }
                };
                self.audit.record(AuditEvent::KeyRotated { fingerprint });
            }
            None => {
                if let Some(verifier) = self.verifier.take() {
                    let (_, _, used) = verifier.into_parts();
                    self.used_reserve = used;
                }
                self.audit.record(AuditEvent::KeyCleared);
            }
        }
        Ok(())
    }

    pub fn set_params(&mut self, caller: OwnerId, params: VaultParams) -> Result<()> {
        self.policy.ensure_admin(&caller)?;
        self.params = params;
        if let Some(verifier) = &mut self.verifier {
            verifier.set_validity_window(params.proof_validity_secs);
        }
        self.audit.record(AuditEvent::ParamsUpdated { params });
        Ok(())
    }

    pub fn pause(&mut self, caller: OwnerId) -> Result<()> {
        self.policy.ensure_guardian(&caller)?;
        self.policy.set_paused(true);
        self.audit.record(AuditEvent::Paused { by: caller });
        Ok(())
    }

    pub fn unpause(&mut self, caller: OwnerId) -> Result<()> {
        self.policy.ensure_guardian(&caller)?;
        self.policy.set_paused(false);
        self.audit.record(AuditEvent::Unpaused { by: caller });
        Ok(())
    }

    pub fn transfer_admin(&mut self, caller: OwnerId, new_admin: OwnerId) -> Result<()> {
        self.policy.ensure_admin(&caller)?;
        self.policy.set_admin(new_admin);
        self.audit.record(AuditEvent::AdminTransferred {
            from: caller,
            to: new_admin,
        });
        Ok(())
    }

    pub fn set_guardian(&mut self, caller: OwnerId, guardian: OwnerId) -> Result<()> {
        self.policy.ensure_admin(&caller)?;
        self.policy.set_guardian(guardian);
        self.audit.record(AuditEvent::GuardianChanged { guardian });
        Ok(())
    }

    // === query surface ===

    pub fn proxy(&self, address: &ProxyAddress) -> Option<&ProxyBinding> {
        self.registry.get(address)
    }

    pub fn proxies_of(&self, owner: &OwnerId) -> &[ProxyAddress] {
        self.registry.proxies_of(owner)
    }

    pub fn nonce_of(&self, owner: &OwnerId) -> u64 {
        self.registry.nonce_of(owner)
    }

    pub fn withdrawal(&self, id: &WithdrawalId) -> Option<&PendingWithdrawal> {
        self.pending.get(id)
    }

    pub fn total_locked(&self) -> Amount {
        self.total_locked
    }

    pub fn params(&self) -> &VaultParams {
        &self.params
    }

    pub fn is_paused(&self) -> bool {
        self.policy.is_paused()
    }

    pub fn verification_key(&self) -> Option<&VerificationKey> {
        self.verifier.as_ref().map(|v| v.key())
    }

    pub fn is_proof_consumed(&self, hash: &ProofHash) -> bool {
        match &self.verifier {
            Some(verifier) => verifier.is_consumed(hash),
            None => self.used_reserve.contains(hash),
        }
    }

    pub fn audit_log(&self) -> &[AuditEvent] {
        self.audit.events()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// conservation invariant: total locked equals the sum of active
    /// balances plus amounts reserved in non-terminal pending withdrawals
    pub fn check_conservation(&self) -> bool {
        let reserved = self
            .pending
            .values()
            .filter(|w| !w.is_terminal())
            .fold(Amount::ZERO, |acc, w| acc.saturating_add(w.amount));
        self.registry.total_balance().saturating_add(reserved) == self.total_locked
    }

    // === snapshot / restore ===

    pub fn snapshot(&self) -> VaultSnapshot {
        let (bindings, by_owner, nonces) = self.registry.clone().into_parts();
        let mut bindings: Vec<_> = bindings.into_iter().collect();
        bindings.sort_by_key(|(a, _)| a.0);
        let mut proxies_by_owner: Vec<_> = by_owner.into_iter().collect();
        proxies_by_owner.sort_by_key(|(o, _)| o.0);
        let mut nonces: Vec<_> = nonces.into_iter().collect();
        nonces.sort_by_key(|(o, _)| o.0);
        let mut pending: Vec<_> = self
            .pending
            .iter()
            .map(|(id, w)| (*id, w.clone()))
            .collect();
        pending.sort_by_key(|(id, _)| id.0);
        let used_set = match &self.verifier {
            Some(verifier) => verifier.used_proofs(),
            None => &self.used_reserve,
        };
        let mut used_proofs: Vec<_> = used_set.iter().copied().collect();
        used_proofs.sort_by_key(|h| h.0);

        VaultSnapshot {
            schema_version: SCHEMA_VERSION,
            params: self.params,
            admin: *self.policy.admin(),
            guardian: *self.policy.guardian(),
            paused: self.policy.is_paused(),
            verification_key: self.verifier.as_ref().map(|v| v.key().clone()),
            used_proofs,
            bindings,
            proxies_by_owner,
            nonces,
            pending,
            total_locked: self.total_locked,
            sequence: self.sequence,
        }
    }

    /// rebuild a vault from a snapshot; the audit log starts fresh
    pub fn restore(snapshot: VaultSnapshot, ledger: L) -> Result<Self> {
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(VaultError::SchemaVersionMismatch(snapshot.schema_version));
        }
        let mut used = UsedProofSet::new();
        for hash in snapshot.used_proofs {
            used.insert(hash);
        }
        let (verifier, used_reserve) = match snapshot.verification_key {
            Some(key) => (
                Some(Verifier::from_parts(
                    key,
                    snapshot.params.proof_validity_secs,
                    used,
                )),
                UsedProofSet::new(),
            ),
            None => (None, used),
        };
        let mut policy = Policy::new(snapshot.admin, snapshot.guardian);
        policy.set_paused(snapshot.paused);

        Ok(Self {
            params: snapshot.params,
            policy,
            verifier,
            used_reserve,
            registry: BindingRegistry::from_parts(
                snapshot.bindings.into_iter().collect(),
                snapshot.proxies_by_owner.into_iter().collect(),
                snapshot.nonces.into_iter().collect(),
            ),
            pending: snapshot.pending.into_iter().collect(),
            total_locked: snapshot.total_locked,
            sequence: snapshot.sequence,
            audit: AuditLog::new(),
            ledger,
        })
    }
}

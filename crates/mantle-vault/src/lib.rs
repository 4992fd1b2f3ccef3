//! mantle escrow vault
//!
//! custodies funds in pseudonymous proxy accounts and releases them only
//! against a consumed ownership proof, with large releases held behind a
//! time delay
//!
//! # architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        MANTLE VAULT                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  caller ── create_proxy ──▶ binding registry                 │
//! │         ── deposit ───────▶ proxy balance (+ total locked)   │
//! │                                                              │
//! │  caller ── request_withdrawal(proof) ─▶ verifier (consume)   │
//! │     ├─ amount <  threshold: instant payout                   │
//! │     └─ amount >= threshold: reserve → pending ledger         │
//! │                               │                              │
//! │            execute (after unlock) │ cancel (owner/guardian)  │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! state-mutating calls are strictly serialized (`&mut self`); each entry
//! point is independently atomic and fails fast with no partial commit

pub mod address;
pub mod audit;
pub mod config;
pub mod error;
pub mod ledger;
pub mod policy;
pub mod registry;
pub mod snapshot;
pub mod types;
pub mod vault;
pub mod withdrawal;

pub use address::{owner_hash, proxy_hash, ProxyAddress};
pub use audit::{AuditEvent, AuditLog};
pub use config::VaultParams;
pub use error::{Result, VaultError};
pub use ledger::{InMemoryLedger, SettlementLedger, TransferError};
pub use policy::Policy;
pub use registry::{BindingRegistry, ProxyBinding};
pub use snapshot::{VaultSnapshot, SCHEMA_VERSION};
pub use types::{Amount, BindingHash, OwnerId, Timestamp};
pub use vault::{fallback_ownership_hash, Vault, WithdrawalOutcome};
pub use withdrawal::{PendingWithdrawal, WithdrawalId};

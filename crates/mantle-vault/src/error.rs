//! error taxonomy for vault operations
//!
//! every entry point fails fast on the first violated check and commits
//! nothing; there is no best-effort path. terminal re-transitions get their
//! own variants so callers can tell a programming error from a race

use thiserror::Error;

use mantle_verifier::VerifierError;

use crate::address::ProxyAddress;
use crate::types::{Amount, Timestamp};
use crate::withdrawal::WithdrawalId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// malformed, expired, replayed or cryptographically invalid proof
    #[error(transparent)]
    Proof(#[from] VerifierError),

    /// guardian pause switch is engaged
    #[error("vault is paused")]
    Paused,

    /// caller lacks the required capability or does not own the resource
    #[error("caller is not authorized")]
    Unauthorized,

    /// zero-amount deposits and withdrawals are rejected
    #[error("amount must be positive")]
    AmountZero,

    #[error("unknown proxy address {0}")]
    ProxyNotFound(ProxyAddress),

    /// derivation collided with an existing active binding
    #[error("derived proxy address {0} already exists")]
    ProxyCollision(ProxyAddress),

    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Amount,
        available: Amount,
    },

    #[error("unknown withdrawal id {0}")]
    WithdrawalNotFound(WithdrawalId),

    #[error("withdrawal already executed")]
    AlreadyExecuted,

    #[error("withdrawal already cancelled")]
    AlreadyCancelled,

    #[error("time lock active until {unlock_time}")]
    TimelockActive { unlock_time: Timestamp },

    /// public inputs do not name the caller, proxy and stored binding
    #[error("proof public inputs not bound to caller and proxy")]
    ProofBindingMismatch,

    /// degraded fallback check (no verifier configured) did not match
    #[error("fallback ownership check failed")]
    OwnershipCheckFailed,

    /// balance or aggregate arithmetic would overflow
    #[error("balance arithmetic overflow")]
    Overflow,

    /// host-ledger transfer rejected; the whole call aborts
    #[error("settlement transfer failed: {0}")]
    TransferFailed(String),

    #[error("unsupported snapshot schema version {0}")]
    SchemaVersionMismatch(u32),
}

pub type Result<T> = core::result::Result<T, VaultError>;

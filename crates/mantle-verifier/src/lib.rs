//! ownership proof verification for the mantle escrow vault
//!
//! the scheme is a hash-chain commitment stand-in for a real proof system:
//! a proof is two 32-byte fields (commitment, response) recomputable from the
//! verification key and four public inputs. the external contract is what
//! matters — proof byte layout, public-input ordering, freshness window and
//! the replay set — so a real proof system can be slotted in behind it.
//!
//! ```text
//! commitment = H(alpha, owner_hash, proxy_hash, binding_hash, timestamp)
//! challenge  = H(commitment, beta, gamma)
//! response   = H(challenge, delta, binding_hash)
//! ```
//!
//! a consumed proof's hash goes into an append-only used set; consuming the
//! same proof twice fails regardless of which proxy or amount it targets.

pub mod key;
pub mod nullifier;
pub mod proof;
pub mod verifier;

pub use key::VerificationKey;
pub use nullifier::{ProofHash, UsedProofSet};
pub use proof::{Hash256, Proof, PublicInputs};
pub use verifier::Verifier;

use thiserror::Error;

/// domain separator for the commitment step
pub const COMMIT_DOMAIN: &[u8] = b"mantle.verifier.commitment.v1";
/// domain separator for the fiat-shamir challenge step
pub const CHALLENGE_DOMAIN: &[u8] = b"mantle.verifier.challenge.v1";
/// domain separator for the response step
pub const RESPONSE_DOMAIN: &[u8] = b"mantle.verifier.response.v1";
/// domain separator for hashing full proof bytes into the used set
pub const PROOF_HASH_DOMAIN: &[u8] = b"mantle.verifier.proof-hash.v1";
/// domain separator for verification-key fingerprints
pub const KEY_FINGERPRINT_DOMAIN: &[u8] = b"mantle.verifier.key.v1";

/// Error types for proof verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    /// proof bytes shorter than the two fixed 32-byte fields
    #[error("proof too short: {len} bytes, need at least {min}")]
    InvalidProofLength { len: usize, min: usize },
    /// public input sequence is not exactly four 256-bit values
    #[error("expected exactly 4 public inputs, got {count}")]
    InvalidPublicInputs { count: usize },
    /// timestamp word carries non-zero padding past the u64
    #[error("malformed timestamp word in public inputs")]
    InvalidTimestamp,
    /// embedded timestamp outside the configured validity window
    #[error("proof timestamp outside the validity window")]
    ProofExpired,
    /// proof hash already present in the used set
    #[error("proof already consumed")]
    ProofAlreadyUsed,
    /// commitment or response does not match the recomputed chain
    #[error("proof does not match expected commitment chain")]
    InvalidProof,
}

pub type Result<T> = core::result::Result<T, VerifierError>;

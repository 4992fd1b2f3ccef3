//! used-proof set for preventing replay
//!
//! when a proof is consumed, its hash is published into the set
//! if the hash already exists, the consumption is rejected
//!
//! the set stores hashes, not proof contents, and only ever grows

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// unique identifier of a consumed proof
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofHash(pub [u8; 32]);

impl ProofHash {
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ProofHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Display for ProofHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// append-only set of consumed proofs
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UsedProofSet {
    hashes: HashSet<ProofHash>,
}

impl UsedProofSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// check if a proof was already consumed
    pub fn contains(&self, hash: &ProofHash) -> bool {
        self.hashes.contains(hash)
    }

    /// insert a proof hash (mark as consumed)
    /// returns false if already present (replay attempt)
    pub fn insert(&mut self, hash: ProofHash) -> bool {
        self.hashes.insert(hash)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProofHash> {
        self.hashes.iter()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

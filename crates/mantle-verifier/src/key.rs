//! verification key material
//!
//! four fixed 32-byte components plus opaque auxiliary points, replaced
//! wholesale on rotation. the key is public parameter data, not a secret:
//! anyone holding it can both produce and check proofs (documented stand-in
//! property of the hash-chain scheme).

use serde::{Deserialize, Serialize};

use crate::proof::Hash256;
use crate::KEY_FINGERPRINT_DOMAIN;

/// parameters the proof-check algorithm combines with public inputs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey {
    /// bound into the commitment step
    pub alpha: Hash256,
    /// bound into the challenge step
    pub beta: Hash256,
    /// bound into the challenge step
    pub gamma: Hash256,
    /// bound into the response step
    pub delta: Hash256,
    /// auxiliary points, carried opaquely for forward compatibility
    pub aux: Vec<Hash256>,
}

impl VerificationKey {
    pub fn new(alpha: Hash256, beta: Hash256, gamma: Hash256, delta: Hash256) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            delta,
            aux: Vec::new(),
        }
    }

    pub fn with_aux(mut self, aux: Vec<Hash256>) -> Self {
        self.aux = aux;
        self
    }

    /// fingerprint identifying this key in audit records
    ///
    /// covers every component so any rotation, including aux-only changes,
    /// is observable downstream
    pub fn fingerprint(&self) -> Hash256 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(KEY_FINGERPRINT_DOMAIN);
        hasher.update(&self.alpha.0);
        hasher.update(&self.beta.0);
        hasher.update(&self.gamma.0);
        hasher.update(&self.delta.0);
        for point in &self.aux {
            hasher.update(&point.0);
        }
        Hash256(*hasher.finalize().as_bytes())
    }
}

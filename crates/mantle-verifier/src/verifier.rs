//! the stateful verifier: key + validity window + replay set
//!
//! `check` is the explicit-error read-only decision; `verify` is its boolean
//! shadow for callers that only need validity; `verify_and_consume` records
//! the proof as spent. verification never touches balances — consuming the
//! replay slot is its only side effect.

use crate::key::VerificationKey;
use crate::nullifier::{ProofHash, UsedProofSet};
use crate::proof::{expected_commitment, expected_response, Hash256, Proof, PublicInputs};
use crate::{Result, VerifierError};

#[derive(Clone, Debug)]
pub struct Verifier {
    key: VerificationKey,
    validity_window_secs: u64,
    used: UsedProofSet,
}

impl Verifier {
    pub fn new(key: VerificationKey, validity_window_secs: u64) -> Self {
        Self {
            key,
            validity_window_secs,
            used: UsedProofSet::new(),
        }
    }

    pub fn key(&self) -> &VerificationKey {
        &self.key
    }

    /// replace the key wholesale; returns the new fingerprint so the caller
    /// can emit its rotation audit record
    pub fn set_key(&mut self, key: VerificationKey) -> Hash256 {
        let fingerprint = key.fingerprint();
        self.key = key;
        fingerprint
    }

    pub fn validity_window_secs(&self) -> u64 {
        self.validity_window_secs
    }

    pub fn set_validity_window(&mut self, secs: u64) {
        self.validity_window_secs = secs;
    }

    pub fn used_proofs(&self) -> &UsedProofSet {
        &self.used
    }

    pub fn is_consumed(&self, hash: &ProofHash) -> bool {
        self.used.contains(hash)
    }

    /// full decision with distinct errors, without consuming
    ///
    /// check order: freshness, replay, then the hash chain — cheap and
    /// state-dependent rejections come before any hashing of key material
    pub fn check(&self, proof: &Proof, inputs: &PublicInputs, now: u64) -> Result<ProofHash> {
        if now > inputs.timestamp.saturating_add(self.validity_window_secs) {
            return Err(VerifierError::ProofExpired);
        }
        // future-dated beyond one window is equally stale (clock-skew guard)
        if inputs.timestamp > now.saturating_add(self.validity_window_secs) {
            return Err(VerifierError::ProofExpired);
        }

        let hash = proof.hash();
        if self.used.contains(&hash) {
            return Err(VerifierError::ProofAlreadyUsed);
        }

        let commitment = expected_commitment(&self.key, inputs);
        if proof.commitment() != commitment {
            return Err(VerifierError::InvalidProof);
        }
        if proof.response() != expected_response(&self.key, inputs, &commitment) {
            return Err(VerifierError::InvalidProof);
        }
        Ok(hash)
    }

    /// pure boolean decision; any malformed, expired, replayed or mismatched
    /// condition is simply invalid
    pub fn verify(&self, proof: &Proof, inputs: &PublicInputs, now: u64) -> bool {
        self.check(proof, inputs, now).is_ok()
    }

    /// mark an already-checked proof as spent
    ///
    /// callers that stage an external transfer between `check` and commit use
    /// this for the commit half; under the serialized execution model nothing
    /// interleaves between the two
    pub fn consume(&mut self, hash: ProofHash) -> Result<()> {
        if !self.used.insert(hash) {
            return Err(VerifierError::ProofAlreadyUsed);
        }
        Ok(())
    }

    /// check and record in one step
    pub fn verify_and_consume(
        &mut self,
        proof: &Proof,
        inputs: &PublicInputs,
        now: u64,
    ) -> Result<ProofHash> {
        let hash = self.check(proof, inputs, now)?;
        self.consume(hash)?;
        Ok(hash)
    }

    /// restore state from a snapshot (used-proof set outlives the process)
    pub fn from_parts(
        key: VerificationKey,
        validity_window_secs: u64,
        used: UsedProofSet,
    ) -> Self {
        Self {
            key,
            validity_window_secs,
            used,
        }
    }

    pub fn into_parts(self) -> (VerificationKey, u64, UsedProofSet) {
        (self.key, self.validity_window_secs, self.used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 3600;
    const NOW: u64 = 1_700_000_000;

    fn test_key() -> VerificationKey {
        VerificationKey::new(
            Hash256([0x11; 32]),
            Hash256([0x22; 32]),
            Hash256([0x33; 32]),
            Hash256([0x44; 32]),
        )
    }

    fn test_inputs(ts: u64) -> PublicInputs {
        PublicInputs::new(Hash256([1; 32]), Hash256([2; 32]), Hash256([3; 32]), ts)
    }

    #[test]
    fn valid_proof_verifies_and_consumes() {
        let mut verifier = Verifier::new(test_key(), WINDOW);
        let inputs = test_inputs(NOW);
        let proof = Proof::generate(verifier.key(), &inputs);

        assert!(verifier.verify(&proof, &inputs, NOW));
        let hash = verifier.verify_and_consume(&proof, &inputs, NOW).unwrap();
        assert!(verifier.is_consumed(&hash));
    }

    #[test]
    fn replay_fails_even_with_different_inputs_elsewhere() {
        let mut verifier = Verifier::new(test_key(), WINDOW);
        let inputs = test_inputs(NOW);
        let proof = Proof::generate(verifier.key(), &inputs);

        verifier.verify_and_consume(&proof, &inputs, NOW).unwrap();

        assert!(!verifier.verify(&proof, &inputs, NOW));
        assert_eq!(
            verifier.verify_and_consume(&proof, &inputs, NOW).unwrap_err(),
            VerifierError::ProofAlreadyUsed
        );
    }

    #[test]
    fn expired_proof_rejected() {
        let mut verifier = Verifier::new(test_key(), WINDOW);
        let inputs = test_inputs(NOW - WINDOW - 1);
        let proof = Proof::generate(verifier.key(), &inputs);

        assert!(!verifier.verify(&proof, &inputs, NOW));
        assert_eq!(
            verifier.verify_and_consume(&proof, &inputs, NOW).unwrap_err(),
            VerifierError::ProofExpired
        );
        // boundary: exactly at the window edge is still fresh
        let edge = test_inputs(NOW - WINDOW);
        let proof = Proof::generate(verifier.key(), &edge);
        assert!(verifier.verify(&proof, &edge, NOW));
    }

    #[test]
    fn future_dated_proof_rejected() {
        let verifier = Verifier::new(test_key(), WINDOW);
        let inputs = test_inputs(NOW + WINDOW + 1);
        let proof = Proof::generate(verifier.key(), &inputs);
        assert_eq!(
            verifier.check(&proof, &inputs, NOW).unwrap_err(),
            VerifierError::ProofExpired
        );
    }

    #[test]
    fn tampered_fields_rejected() {
        let verifier = Verifier::new(test_key(), WINDOW);
        let inputs = test_inputs(NOW);
        let proof = Proof::generate(verifier.key(), &inputs);

        let mut bad_commitment = proof.as_bytes().to_vec();
        bad_commitment[0] ^= 1;
        let bad = Proof::from_bytes(bad_commitment).unwrap();
        assert_eq!(
            verifier.check(&bad, &inputs, NOW).unwrap_err(),
            VerifierError::InvalidProof
        );

        let mut bad_response = proof.as_bytes().to_vec();
        bad_response[63] ^= 1;
        let bad = Proof::from_bytes(bad_response).unwrap();
        assert_eq!(
            verifier.check(&bad, &inputs, NOW).unwrap_err(),
            VerifierError::InvalidProof
        );
    }

    #[test]
    fn proof_bound_to_inputs() {
        let verifier = Verifier::new(test_key(), WINDOW);
        let inputs = test_inputs(NOW);
        let proof = Proof::generate(verifier.key(), &inputs);

        let mut other = inputs;
        other.binding_hash = Hash256([9; 32]);
        assert!(!verifier.verify(&proof, &other, NOW));
    }

    #[test]
    fn rotation_invalidates_old_proofs() {
        let mut verifier = Verifier::new(test_key(), WINDOW);
        let inputs = test_inputs(NOW);
        let proof = Proof::generate(verifier.key(), &inputs);

        let new_key = VerificationKey::new(
            Hash256([0xAA; 32]),
            Hash256([0x22; 32]),
            Hash256([0x33; 32]),
            Hash256([0x44; 32]),
        );
        let fingerprint = verifier.set_key(new_key.clone());
        assert_eq!(fingerprint, new_key.fingerprint());
        assert!(!verifier.verify(&proof, &inputs, NOW));
    }
}

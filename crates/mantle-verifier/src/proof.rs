//! proof bytes and public inputs
//!
//! a proof is at least 64 bytes: commitment in [0..32], response in [32..64].
//! trailing bytes are permitted and still covered by the proof hash, so a
//! padded duplicate cannot dodge the replay set by re-padding — it is simply
//! a different proof that fails the chain check or burns its own hash.

use serde::{Deserialize, Serialize};

use crate::key::VerificationKey;
use crate::nullifier::ProofHash;
use crate::{
    Result, VerifierError, CHALLENGE_DOMAIN, COMMIT_DOMAIN, PROOF_HASH_DOMAIN, RESPONSE_DOMAIN,
};

/// 256-bit wire value (public inputs, key components, derived hashes)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// the four ordered public inputs a proof is checked against
///
/// wire order: [owner_hash, proxy_hash, binding_hash, timestamp]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInputs {
    pub owner_hash: Hash256,
    pub proxy_hash: Hash256,
    pub binding_hash: Hash256,
    /// seconds, embedded by the prover at generation time
    pub timestamp: u64,
}

impl PublicInputs {
    pub fn new(
        owner_hash: Hash256,
        proxy_hash: Hash256,
        binding_hash: Hash256,
        timestamp: u64,
    ) -> Self {
        Self {
            owner_hash,
            proxy_hash,
            binding_hash,
            timestamp,
        }
    }

    /// parse the wire representation: exactly four 256-bit words
    ///
    /// the timestamp word carries a little-endian u64 in its first 8 bytes;
    /// non-zero padding is rejected rather than truncated
    pub fn from_words(words: &[Hash256]) -> Result<Self> {
        if words.len() != 4 {
            return Err(VerifierError::InvalidPublicInputs { count: words.len() });
        }
        let ts_word = words[3].0;
        if ts_word[8..].iter().any(|b| *b != 0) {
            return Err(VerifierError::InvalidTimestamp);
        }
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&ts_word[..8]);
        Ok(Self {
            owner_hash: words[0],
            proxy_hash: words[1],
            binding_hash: words[2],
            timestamp: u64::from_le_bytes(ts),
        })
    }

    /// the timestamp as a zero-padded 256-bit word, as hashed on the wire
    pub fn timestamp_word(&self) -> Hash256 {
        let mut word = [0u8; 32];
        word[..8].copy_from_slice(&self.timestamp.to_le_bytes());
        Hash256(word)
    }

    pub fn to_words(&self) -> [Hash256; 4] {
        [
            self.owner_hash,
            self.proxy_hash,
            self.binding_hash,
            self.timestamp_word(),
        ]
    }
}

/// serialized ownership proof: commitment ‖ response (‖ extension bytes)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    bytes: Vec<u8>,
}

impl Proof {
    /// two fixed 32-byte fields
    pub const MIN_LEN: usize = 64;

    /// validate length and take ownership; shorter input is rejected,
    /// never truncated
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < Self::MIN_LEN {
            return Err(VerifierError::InvalidProofLength {
                len: bytes.len(),
                min: Self::MIN_LEN,
            });
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// first 32 bytes
    pub fn commitment(&self) -> Hash256 {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.bytes[..32]);
        Hash256(out)
    }

    /// bytes 32..64
    pub fn response(&self) -> Hash256 {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.bytes[32..64]);
        Hash256(out)
    }

    /// hash of the full proof bytes, the replay-set key
    pub fn hash(&self) -> ProofHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(PROOF_HASH_DOMAIN);
        hasher.update(&self.bytes);
        ProofHash(*hasher.finalize().as_bytes())
    }

    /// produce a proof for the given inputs
    ///
    /// the scheme is symmetric: the verification key is all a prover needs.
    /// owners embed `timestamp = now` so the proof is fresh when submitted
    pub fn generate(key: &VerificationKey, inputs: &PublicInputs) -> Self {
        let commitment = expected_commitment(key, inputs);
        let response = expected_response(key, inputs, &commitment);
        let mut bytes = Vec::with_capacity(Self::MIN_LEN);
        bytes.extend_from_slice(&commitment.0);
        bytes.extend_from_slice(&response.0);
        Self { bytes }
    }
}

/// step 1: commitment over the key's alpha and all four public inputs
pub(crate) fn expected_commitment(key: &VerificationKey, inputs: &PublicInputs) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(COMMIT_DOMAIN);
    hasher.update(&key.alpha.0);
    hasher.update(&inputs.owner_hash.0);
    hasher.update(&inputs.proxy_hash.0);
    hasher.update(&inputs.binding_hash.0);
    hasher.update(&inputs.timestamp_word().0);
    Hash256(*hasher.finalize().as_bytes())
}

/// steps 2 and 3: derived challenge, then the response binding it to delta
/// and the binding hash
pub(crate) fn expected_response(
    key: &VerificationKey,
    inputs: &PublicInputs,
    commitment: &Hash256,
) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CHALLENGE_DOMAIN);
    hasher.update(&commitment.0);
    hasher.update(&key.beta.0);
    hasher.update(&key.gamma.0);
    let challenge = Hash256(*hasher.finalize().as_bytes());

    let mut hasher = blake3::Hasher::new();
    hasher.update(RESPONSE_DOMAIN);
    hasher.update(&challenge.0);
    hasher.update(&key.delta.0);
    hasher.update(&inputs.binding_hash.0);
    Hash256(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> VerificationKey {
        VerificationKey::new(
            Hash256([0xA1; 32]),
            Hash256([0xB2; 32]),
            Hash256([0xC3; 32]),
            Hash256([0xD4; 32]),
        )
    }

    #[test]
    fn short_proof_rejected() {
        let err = Proof::from_bytes(vec![0u8; 63]).unwrap_err();
        assert_eq!(
            err,
            VerifierError::InvalidProofLength { len: 63, min: 64 }
        );
        assert!(Proof::from_bytes(vec![0u8; 64]).is_ok());
    }

    #[test]
    fn public_input_count_enforced() {
        let three = [Hash256::ZERO; 3];
        assert_eq!(
            PublicInputs::from_words(&three).unwrap_err(),
            VerifierError::InvalidPublicInputs { count: 3 }
        );
        let five = [Hash256::ZERO; 5];
        assert_eq!(
            PublicInputs::from_words(&five).unwrap_err(),
            VerifierError::InvalidPublicInputs { count: 5 }
        );
    }

    #[test]
    fn timestamp_padding_rejected() {
        let mut ts_word = [0u8; 32];
        ts_word[..8].copy_from_slice(&1_700_000_000u64.to_le_bytes());
        ts_word[31] = 1;
        let words = [Hash256::ZERO, Hash256::ZERO, Hash256::ZERO, Hash256(ts_word)];
        assert_eq!(
            PublicInputs::from_words(&words).unwrap_err(),
            VerifierError::InvalidTimestamp
        );
    }

    #[test]
    fn words_round_trip() {
        let inputs = PublicInputs::new(
            Hash256([1; 32]),
            Hash256([2; 32]),
            Hash256([3; 32]),
            1_700_000_000,
        );
        let parsed = PublicInputs::from_words(&inputs.to_words()).unwrap();
        assert_eq!(inputs, parsed);
    }

    #[test]
    fn generated_proof_matches_chain() {
        let key = test_key();
        let inputs = PublicInputs::new(
            Hash256([1; 32]),
            Hash256([2; 32]),
            Hash256([3; 32]),
            42,
        );
        let proof = Proof::generate(&key, &inputs);
        assert_eq!(proof.as_bytes().len(), Proof::MIN_LEN);
        assert_eq!(proof.commitment(), expected_commitment(&key, &inputs));
        assert_eq!(
            proof.response(),
            expected_response(&key, &inputs, &proof.commitment())
        );
    }

    #[test]
    fn proof_hash_covers_trailing_bytes() {
        let key = test_key();
        let inputs = PublicInputs::new(Hash256([1; 32]), Hash256([2; 32]), Hash256([3; 32]), 7);
        let proof = Proof::generate(&key, &inputs);

        let mut padded = proof.as_bytes().to_vec();
        padded.push(0);
        let padded = Proof::from_bytes(padded).unwrap();
        assert_ne!(proof.hash(), padded.hash());
    }
}

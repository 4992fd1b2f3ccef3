//! deterministic proxy address derivation
//!
//! a proxy address is the last 160 bits of a domain-tagged hash over
//! (owner, nonce, binding_hash). no secret material is involved: anyone can
//! re-derive an address to verify it, and authentication rests entirely on
//! the stored binding plus the ownership proof at withdrawal time

use serde::{Deserialize, Serialize};

use mantle_verifier::Hash256;

use crate::types::{BindingHash, OwnerId};

/// domain separator for address derivation, distinguishing it from every
/// other hash use in the system
pub const ADDRESS_DOMAIN: &[u8] = b"mantle.vault.address.v1";
/// domain separator for the owner-hash public input
pub const OWNER_HASH_DOMAIN: &[u8] = b"mantle.vault.owner-hash.v1";
/// domain separator for the proxy-hash public input
pub const PROXY_HASH_DOMAIN: &[u8] = b"mantle.vault.proxy-hash.v1";

/// pseudonymous account holding custodied funds for an owner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProxyAddress(pub [u8; 20]);

impl ProxyAddress {
    /// derive the address for (owner, nonce, binding_hash)
    ///
    /// pure and deterministic; the nonce makes repeated creations by the
    /// same owner with the same binding hash land on distinct addresses
    pub fn derive(owner: &OwnerId, nonce: u64, binding_hash: &BindingHash) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(&owner.0);
        hasher.update(&nonce.to_le_bytes());
        hasher.update(&binding_hash.0);
        let digest = hasher.finalize();
        // last 160 bits of the 256-bit digest
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest.as_bytes()[12..]);
        Self(out)
    }

    pub fn to_bytes(&self) -> [u8; 20] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ProxyAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// the owner-hash public input a proof must carry for this owner
pub fn owner_hash(owner: &OwnerId) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(OWNER_HASH_DOMAIN);
    hasher.update(&owner.0);
    Hash256(*hasher.finalize().as_bytes())
}

/// the proxy-hash public input a proof must carry for this proxy
pub fn proxy_hash(proxy: &ProxyAddress) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(PROXY_HASH_DOMAIN);
    hasher.update(&proxy.0);
    Hash256(*hasher.finalize().as_bytes())
}

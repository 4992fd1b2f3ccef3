//! capability gates for administrative mutation
//!
//! kept orthogonal to the state machine: the vault asks "may this caller do
//! X" and nothing else, so the policy can later become multi-signature or
//! threshold-based without touching withdrawal logic
//!
//! the guardian can pause and cancel but never move funds; the admin tunes
//! parameters and rotates keys and roles

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::types::OwnerId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    admin: OwnerId,
    guardian: OwnerId,
    paused: bool,
}

impl Policy {
    pub fn new(admin: OwnerId, guardian: OwnerId) -> Self {
        Self {
            admin,
            guardian,
            paused: false,
        }
    }

    pub fn admin(&self) -> &OwnerId {
        &self.admin
    }

    pub fn guardian(&self) -> &OwnerId {
        &self.guardian
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_guardian(&self, caller: &OwnerId) -> bool {
        caller == &self.guardian
    }

    pub fn ensure_admin(&self, caller: &OwnerId) -> Result<()> {
        if caller != &self.admin {
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }

    pub fn ensure_guardian(&self, caller: &OwnerId) -> Result<()> {
        if caller != &self.guardian {
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }

    pub fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(VaultError::Paused);
        }
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_admin(&mut self, admin: OwnerId) {
        self.admin = admin;
    }

    pub fn set_guardian(&mut self, guardian: OwnerId) {
        self.guardian = guardian;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_checks() {
        let admin = OwnerId([1u8; 32]);
        let guardian = OwnerId([2u8; 32]);
        let stranger = OwnerId([3u8; 32]);
        let mut policy = Policy::new(admin, guardian);

        assert!(policy.ensure_admin(&admin).is_ok());
        assert_eq!(
            policy.ensure_admin(&guardian).unwrap_err(),
            VaultError::Unauthorized
        );
        assert!(policy.ensure_guardian(&guardian).is_ok());
        assert_eq!(
            policy.ensure_guardian(&stranger).unwrap_err(),
            VaultError::Unauthorized
        );

        assert!(policy.ensure_not_paused().is_ok());
        policy.set_paused(true);
        assert_eq!(policy.ensure_not_paused().unwrap_err(), VaultError::Paused);
    }
}

//! Explicit session context for vault encryption.
//!
//! The caller builds this from what signup/login returned and passes it into
//! every encryption call. Nothing here is secret: the master password is
//! supplied per call and derived keys never outlive it.

use passvault_common::Result;
use passvault_crypto::{decode_salt, KdfParams, Salt};

/// Where the key-derivation salt of a new encryption comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaltPolicy {
    /// A fresh random salt for every encryption.
    #[default]
    PerItem,
    /// The account's `encSalt` for every item.
    PerUser,
}

/// Parameters an item encryption needs besides the master password.
#[derive(Debug, Clone)]
pub struct SessionContext {
    enc_salt: Option<Salt>,
    policy: SaltPolicy,
    kdf: KdfParams,
}

impl SessionContext {
    /// Context drawing a fresh salt for every item.
    pub fn per_item(kdf: KdfParams) -> Self {
        Self {
            enc_salt: None,
            policy: SaltPolicy::PerItem,
            kdf,
        }
    }

    /// Context deriving every item's key from the account salt.
    pub fn per_user(enc_salt: Salt, kdf: KdfParams) -> Self {
        Self {
            enc_salt: Some(enc_salt),
            policy: SaltPolicy::PerUser,
            kdf,
        }
    }

    /// Build a context from the base64 `encSalt` returned by signup/login.
    ///
    /// # Errors
    /// - Returns `EnvelopeFormat` if `enc_salt` is not a base64 16-byte value
    pub fn from_account(enc_salt: &str, policy: SaltPolicy, kdf: KdfParams) -> Result<Self> {
        let salt = decode_salt(enc_salt)?;
        Ok(Self {
            enc_salt: Some(salt),
            policy,
            kdf,
        })
    }

    /// Salt policy in effect.
    pub fn policy(&self) -> SaltPolicy {
        self.policy
    }

    /// KDF parameters for new encryptions.
    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    /// Salt for the next encryption.
    pub fn next_salt(&self) -> Salt {
        match (self.policy, self.enc_salt) {
            (SaltPolicy::PerUser, Some(salt)) => salt,
            _ => Salt::generate(),
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::per_item(KdfParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_item_salts_differ() {
        let ctx = SessionContext::default();
        assert_ne!(ctx.next_salt(), ctx.next_salt());
    }

    #[test]
    fn test_per_user_salt_is_stable() {
        let salt = Salt::from_bytes([3u8; 16]);
        let ctx = SessionContext::per_user(salt, KdfParams::default());
        assert_eq!(ctx.next_salt(), salt);
        assert_eq!(ctx.next_salt(), salt);
    }

    #[test]
    fn test_from_account() {
        let ctx = SessionContext::from_account(
            "AAECAwQFBgcICQoLDA0ODw==",
            SaltPolicy::PerUser,
            KdfParams::default(),
        )
        .unwrap();
        assert_eq!(ctx.next_salt().as_bytes()[15], 15);

        assert!(SessionContext::from_account("AAEC", SaltPolicy::PerUser, KdfParams::default())
            .is_err());
    }
}

//! Item-level encryption: plaintext fields to envelope and back.
//!
//! A key is derived once per call from the master password and the item
//! salt, used for the five fields, and dropped (zeroized) before returning.
//! Each field gets its own IV and has its name bound as associated data.

use tracing::debug;

use crate::context::SessionContext;
use crate::envelope::EncryptedItem;
use crate::item::{FieldName, PlainFields};
use passvault_common::{Error, Result};
use passvault_crypto::{
    aead, decode_field, decode_salt, derive_key, encode_field, encode_salt, EncodedField,
    KdfParams, SealedField, VaultKey,
};

/// Encrypt a vault item under a key derived from `master_password`.
///
/// # Preconditions
/// - `master_password` must not be empty
/// - `fields.title` and `fields.password` must not be empty
///
/// # Postconditions
/// - Every field is sealed with a distinct, freshly generated IV
/// - The envelope records the salt and iteration count used
///
/// # Errors
/// - `InvalidInput` for an empty password or missing required field,
///   reported before any key derivation runs
/// - `KeyDerivation` if the context's KDF parameters are invalid
pub fn encrypt_item(
    fields: &PlainFields,
    master_password: &[u8],
    ctx: &SessionContext,
) -> Result<EncryptedItem> {
    if master_password.is_empty() {
        return Err(Error::InvalidInput(
            "Master password cannot be empty".to_string(),
        ));
    }
    fields.validate()?;

    let salt = ctx.next_salt();
    let params = *ctx.kdf();
    let key = derive_key(master_password, &salt, &params)?;

    debug!(iterations = params.iterations, policy = ?ctx.policy(), "Encrypting vault item");

    Ok(EncryptedItem {
        salt: encode_salt(&salt),
        iterations: params.iterations,
        title: seal(&key, fields, FieldName::Title)?,
        username: seal(&key, fields, FieldName::Username)?,
        password: seal(&key, fields, FieldName::Password)?,
        url: seal(&key, fields, FieldName::Url)?,
        notes: seal(&key, fields, FieldName::Notes)?,
    })
}

/// Decrypt a vault item with `master_password`.
///
/// All fields must authenticate; if any one fails, nothing is returned and
/// whatever was already decrypted is zeroized.
///
/// # Errors
/// - `InvalidInput` for an empty password
/// - `EnvelopeFormat` if the envelope text is malformed (checked before deriving)
/// - `KeyDerivation` if the stored iteration count is out of range (no
///   stretching is attempted)
/// - `Integrity` for a wrong password or any tampering; the two are
///   indistinguishable
pub fn decrypt_item(item: &EncryptedItem, master_password: &[u8]) -> Result<PlainFields> {
    if master_password.is_empty() {
        return Err(Error::InvalidInput(
            "Master password cannot be empty".to_string(),
        ));
    }

    let salt = decode_salt(&item.salt)?;
    let sealed = FieldName::ALL
        .iter()
        .map(|name| decode_field(item.field(*name)))
        .collect::<Result<Vec<SealedField>>>()?;

    let key = derive_key(master_password, &salt, &KdfParams::new(item.iterations))?;

    let mut plain = PlainFields::default();
    for (name, field) in FieldName::ALL.iter().zip(sealed.iter()) {
        let bytes = aead::decrypt(&key, field, name.associated_data())?;
        let text = std::str::from_utf8(&bytes).map_err(|_| Error::Integrity)?;
        plain.set(*name, text.to_owned());
    }

    debug!("Decrypted vault item");
    Ok(plain)
}

/// Re-encrypt an item under a new master password.
///
/// The new envelope gets a new salt (per the context) and new IVs for
/// every field.
///
/// # Errors
/// - Anything `decrypt_item` or `encrypt_item` can return
pub fn rekey_item(
    item: &EncryptedItem,
    old_password: &[u8],
    new_password: &[u8],
    ctx: &SessionContext,
) -> Result<EncryptedItem> {
    if new_password.is_empty() {
        return Err(Error::InvalidInput(
            "New master password cannot be empty".to_string(),
        ));
    }
    let plain = decrypt_item(item, old_password)?;
    encrypt_item(&plain, new_password, ctx)
}

fn seal(key: &VaultKey, fields: &PlainFields, name: FieldName) -> Result<EncodedField> {
    let sealed = aead::encrypt(key, fields.get(name).as_bytes(), name.associated_data())?;
    Ok(encode_field(&sealed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use passvault_crypto::{KdfParams, Salt};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use tamper::flip_bit;

    const MASTER: &[u8] = b"correct horse";

    fn scenario_ctx() -> SessionContext {
        SessionContext::per_user(
            Salt::from_bytes(core::array::from_fn(|i| i as u8)),
            KdfParams::default(),
        )
    }

    fn full_fields() -> PlainFields {
        PlainFields::new("GitHub", "hunter2")
            .with_username("octocat")
            .with_url("https://github.com")
            .with_notes("2FA enabled")
    }

    mod tamper {
        use passvault_crypto::{decode_field, encode_field, EncodedField};

        pub fn flip_bit(field: &mut EncodedField, part: usize, bit: usize) {
            let mut sealed = decode_field(field).unwrap();
            match part {
                0 => {
                    let bit = bit % (sealed.ciphertext.len() * 8);
                    sealed.ciphertext[bit / 8] ^= 1 << (bit % 8);
                }
                1 => {
                    let mut iv = *sealed.iv.as_bytes();
                    let bit = bit % (iv.len() * 8);
                    iv[bit / 8] ^= 1 << (bit % 8);
                    sealed.iv = passvault_crypto::Iv::from_bytes(iv);
                }
                _ => {
                    let mut tag = *sealed.tag.as_bytes();
                    let bit = bit % (tag.len() * 8);
                    tag[bit / 8] ^= 1 << (bit % 8);
                    sealed.tag = passvault_crypto::AuthTag::from_bytes(tag);
                }
            }
            *field = encode_field(&sealed);
        }
    }

    #[test]
    fn test_roundtrip() {
        let fields = full_fields();
        let item = encrypt_item(&fields, MASTER, &SessionContext::default()).unwrap();
        let decrypted = decrypt_item(&item, MASTER).unwrap();
        assert_eq!(decrypted, fields);
    }

    #[test]
    fn test_unbounded_iteration_count_refused() {
        let mut item = encrypt_item(&full_fields(), MASTER, &SessionContext::default()).unwrap();
        item.iterations = u32::MAX;

        let started = std::time::Instant::now();
        assert!(matches!(
            decrypt_item(&item, MASTER),
            Err(Error::KeyDerivation(_))
        ));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_empty_optional_fields_roundtrip() {
        let fields = PlainFields::new("t", "p");
        let item = encrypt_item(&fields, MASTER, &SessionContext::default()).unwrap();
        assert_eq!(item.notes.ciphertext, "");
        assert_eq!(decrypt_item(&item, MASTER).unwrap(), fields);
    }

    #[test]
    fn test_scenario_fresh_ivs_hide_repeated_plaintext() {
        let ctx = scenario_ctx();
        let fields = PlainFields::new("GitHub", "hunter2");

        let first = encrypt_item(&fields, MASTER, &ctx).unwrap();
        let second = encrypt_item(&fields, MASTER, &ctx).unwrap();

        assert_eq!(first.salt, "AAECAwQFBgcICQoLDA0ODw==");
        assert_eq!(first.salt, second.salt);
        assert_ne!(first.title.iv, second.title.iv);
        assert_ne!(first.title.ciphertext, second.title.ciphertext);

        assert_eq!(decrypt_item(&first, MASTER).unwrap().title, "GitHub");
        assert_eq!(decrypt_item(&second, MASTER).unwrap().title, "GitHub");
    }

    #[test]
    fn test_every_field_has_its_own_iv() {
        let item = encrypt_item(&full_fields(), MASTER, &SessionContext::default()).unwrap();
        let ivs: HashSet<&str> = FieldName::ALL
            .iter()
            .map(|name| item.field(*name).iv.as_str())
            .collect();
        assert_eq!(ivs.len(), FieldName::ALL.len());
    }

    #[test]
    fn test_per_item_policy_uses_fresh_salts() {
        let ctx = SessionContext::default();
        let a = encrypt_item(&full_fields(), MASTER, &ctx).unwrap();
        let b = encrypt_item(&full_fields(), MASTER, &ctx).unwrap();
        assert_ne!(a.salt, b.salt);
    }

    #[test]
    fn test_empty_master_password_is_invalid_input() {
        let result = encrypt_item(&full_fields(), b"", &SessionContext::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_password_rejected_before_kdf_params() {
        // Zero iterations would be a KeyDerivation failure if derivation ran.
        let ctx = SessionContext::per_item(KdfParams::new(0));
        let result = encrypt_item(&full_fields(), b"", &ctx);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_missing_required_field_is_invalid_input() {
        let fields = PlainFields::new("", "hunter2");
        let result = encrypt_item(&fields, MASTER, &SessionContext::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_zero_iterations_is_key_derivation_failure() {
        let ctx = SessionContext::per_item(KdfParams::new(0));
        let result = encrypt_item(&full_fields(), MASTER, &ctx);
        assert!(matches!(result, Err(Error::KeyDerivation(_))));
    }

    #[test]
    fn test_wrong_password_looks_like_tampering() {
        let item = encrypt_item(&full_fields(), MASTER, &SessionContext::default()).unwrap();

        let wrong = decrypt_item(&item, b"correct horsd").unwrap_err();

        let mut tampered = item.clone();
        flip_bit(&mut tampered.password, 0, 3);
        let tamper = decrypt_item(&tampered, MASTER).unwrap_err();

        assert!(matches!(wrong, Error::Integrity));
        assert!(matches!(tamper, Error::Integrity));
        assert_eq!(wrong.to_string(), tamper.to_string());
    }

    #[test]
    fn test_swapped_fields_fail() {
        let mut item = encrypt_item(&full_fields(), MASTER, &SessionContext::default()).unwrap();
        std::mem::swap(&mut item.title, &mut item.password);
        assert!(matches!(decrypt_item(&item, MASTER), Err(Error::Integrity)));
    }

    #[test]
    fn test_malformed_envelope_reported_as_format_error() {
        let mut item = encrypt_item(&full_fields(), MASTER, &SessionContext::default()).unwrap();
        item.notes.auth_tag = "%%%".to_string();
        assert!(matches!(
            decrypt_item(&item, MASTER),
            Err(Error::EnvelopeFormat(_))
        ));
    }

    #[test]
    fn test_rekey() {
        let item = encrypt_item(&full_fields(), MASTER, &SessionContext::default()).unwrap();
        let rekeyed =
            rekey_item(&item, MASTER, b"battery staple", &SessionContext::default()).unwrap();

        assert_ne!(rekeyed.salt, item.salt);
        assert_eq!(decrypt_item(&rekeyed, b"battery staple").unwrap(), full_fields());
        assert!(matches!(
            decrypt_item(&rekeyed, MASTER),
            Err(Error::Integrity)
        ));
        assert!(matches!(
            rekey_item(&item, MASTER, b"", &SessionContext::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    proptest! {
        // Each case runs two PBKDF2 derivations, so keep the count small.
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_roundtrip(title in "\\PC{1,40}",
                          password in "\\PC{1,40}",
                          notes in "\\PC{0,80}") {
            let fields = PlainFields::new(title, password).with_notes(notes);
            let item = encrypt_item(&fields, MASTER, &scenario_ctx()).unwrap();
            prop_assert_eq!(decrypt_item(&item, MASTER).unwrap(), fields);
        }

        #[test]
        fn prop_single_bit_flip_rejected(field in 0usize..5, part in 0usize..3, bit in any::<usize>()) {
            let mut item = encrypt_item(&full_fields(), MASTER, &scenario_ctx()).unwrap();
            let target = match FieldName::ALL[field] {
                FieldName::Title => &mut item.title,
                FieldName::Username => &mut item.username,
                FieldName::Password => &mut item.password,
                FieldName::Url => &mut item.url,
                FieldName::Notes => &mut item.notes,
            };
            flip_bit(target, part, bit);
            prop_assert!(matches!(decrypt_item(&item, MASTER), Err(Error::Integrity)));
        }
    }
}

//! Fixtures for store tests.

use passvault_crypto::EncodedField;
use passvault_vault::EncryptedItem;

fn field(tag: &str, name: &str) -> EncodedField {
    EncodedField {
        ciphertext: format!("{}-{}", tag, name),
        iv: "AAAAAAAAAAAAAAAA".to_string(),
        auth_tag: "AAAAAAAAAAAAAAAAAAAAAA==".to_string(),
    }
}

/// An envelope whose contents differ by `tag`. Stores never look inside it.
pub(crate) fn sample_item(tag: &str) -> EncryptedItem {
    EncryptedItem {
        salt: "AAAAAAAAAAAAAAAAAAAAAA==".to_string(),
        iterations: 100_000,
        title: field(tag, "title"),
        username: field(tag, "username"),
        password: field(tag, "password"),
        url: field(tag, "url"),
        notes: field(tag, "notes"),
    }
}

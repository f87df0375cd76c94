//! Random password generator for new vault entries.

use rand::{rngs::OsRng, seq::SliceRandom, Rng};

use passvault_common::{Error, Result};

/// Shortest password the generator will produce.
pub const MIN_LENGTH: usize = 8;

/// Longest password the generator will produce.
pub const MAX_LENGTH: usize = 128;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?";

/// Character classes and length for a generated password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 20,
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl GeneratorOptions {
    fn classes(&self) -> Vec<&'static [u8]> {
        [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(enabled, class)| enabled.then_some(class))
        .collect()
    }
}

/// Generate a password from the enabled character classes.
///
/// At least one character of every enabled class is included; positions are
/// shuffled afterwards so they carry no information.
///
/// # Errors
/// - `InvalidInput` if no class is enabled or the length is outside
///   `MIN_LENGTH..=MAX_LENGTH`
pub fn generate_password(options: &GeneratorOptions) -> Result<String> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&options.length) {
        return Err(Error::InvalidInput(format!(
            "Password length must be between {} and {}",
            MIN_LENGTH, MAX_LENGTH
        )));
    }

    let classes = options.classes();
    if classes.is_empty() {
        return Err(Error::InvalidInput(
            "At least one character class must be enabled".to_string(),
        ));
    }

    let alphabet: Vec<u8> = classes.iter().flat_map(|c| c.iter().copied()).collect();
    let mut rng = OsRng;

    let mut chars: Vec<u8> = classes
        .iter()
        .filter_map(|class| class.choose(&mut rng).copied())
        .collect();
    while chars.len() < options.length {
        chars.push(alphabet[rng.gen_range(0..alphabet.len())]);
    }
    chars.shuffle(&mut rng);

    // Every byte comes from the ASCII tables above.
    Ok(chars.into_iter().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let password = generate_password(&GeneratorOptions::default()).unwrap();
        assert_eq!(password.len(), 20);
        assert!(password.bytes().any(|b| LOWERCASE.contains(&b)));
        assert!(password.bytes().any(|b| UPPERCASE.contains(&b)));
        assert!(password.bytes().any(|b| DIGITS.contains(&b)));
        assert!(password.bytes().any(|b| SYMBOLS.contains(&b)));
    }

    #[test]
    fn test_digits_only() {
        let options = GeneratorOptions {
            length: 12,
            lowercase: false,
            uppercase: false,
            digits: true,
            symbols: false,
        };
        let password = generate_password(&options).unwrap();
        assert_eq!(password.len(), 12);
        assert!(password.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_no_classes_fails() {
        let options = GeneratorOptions {
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: false,
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            generate_password(&options),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_length_bounds() {
        for length in [0, MIN_LENGTH - 1, MAX_LENGTH + 1] {
            let options = GeneratorOptions {
                length,
                ..GeneratorOptions::default()
            };
            assert!(generate_password(&options).is_err());
        }
        let options = GeneratorOptions {
            length: MAX_LENGTH,
            ..GeneratorOptions::default()
        };
        assert_eq!(generate_password(&options).unwrap().len(), MAX_LENGTH);
    }

    #[test]
    fn test_outputs_differ() {
        let a = generate_password(&GeneratorOptions::default()).unwrap();
        let b = generate_password(&GeneratorOptions::default()).unwrap();
        assert_ne!(a, b);
    }
}

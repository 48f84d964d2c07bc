//! Account numbers.
//!
//! An account number is four space separated groups of four digits, e.g.
//! `4821 1093 7730 2518`. Numbers are drawn from a non-cryptographic RNG and are
//! only an alternate lookup key; the account id stays the identity.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GROUPS: usize = 4;
const GROUP_LEN: usize = 4;

/// A formatted account number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

/// Returned when a string is not sixteen digits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid account number: {0:?}")]
pub struct InvalidAccountNumber(pub String);

impl AccountNumber {
    /// Draws a fresh number, each group in `1000..=9999`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let groups: Vec<String> = (0..GROUPS)
            .map(|_| rng.random_range(1000u16..=9999).to_string())
            .collect();
        Self(groups.join(" "))
    }

    /// Parses a number, ignoring whitespace between digits.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAccountNumber`] unless the input holds exactly sixteen
    /// ASCII digits and nothing else.
    pub fn parse(raw: &str) -> Result<Self, InvalidAccountNumber> {
        let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() != GROUPS * GROUP_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidAccountNumber(raw.to_string()));
        }

        let groups: Vec<&str> = (0..GROUPS)
            .map(|i| &digits[i * GROUP_LEN..(i + 1) * GROUP_LEN])
            .collect();
        Ok(Self(groups.join(" ")))
    }

    /// Returns true if `raw` denotes this number, whatever its spacing.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        Self::parse(raw).is_ok_and(|other| other == *self)
    }

    /// Returns the canonical, space separated form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = InvalidAccountNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AccountNumber {
    type Err = InvalidAccountNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_number_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let number = AccountNumber::random(&mut rng);
            let groups: Vec<&str> = number.as_str().split(' ').collect();
            assert_eq!(groups.len(), 4);
            for group in groups {
                let value: u16 = group.parse().unwrap();
                assert!((1000..=9999).contains(&value));
            }
        }
    }

    #[test]
    fn test_parse_normalizes_spacing() {
        let number = AccountNumber::parse("1234567890123456").unwrap();
        assert_eq!(number.as_str(), "1234 5678 9012 3456");

        let spaced = AccountNumber::parse("  1234 5678  9012 3456 ").unwrap();
        assert_eq!(spaced, number);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(AccountNumber::parse("").is_err());
        assert!(AccountNumber::parse("1234 5678 9012").is_err());
        assert!(AccountNumber::parse("1234 5678 9012 345a").is_err());
        assert!(AccountNumber::parse("FR76 3000 6000 0112 3456 7890 189").is_err());
    }

    #[test]
    fn test_matches_ignores_spacing() {
        let number = AccountNumber::parse("1111 2222 3333 4444").unwrap();
        assert!(number.matches("1111222233334444"));
        assert!(!number.matches("1111 2222 3333 4445"));
        assert!(!number.matches("not a number"));
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let number = AccountNumber::parse("1111 2222 3333 4444").unwrap();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"1111 2222 3333 4444\"");

        let back: AccountNumber = serde_json::from_str("\"1111222233334444\"").unwrap();
        assert_eq!(back, number);
        assert!(serde_json::from_str::<AccountNumber>("\"12\"").is_err());
    }
}

//! Account addresses
//!
//! Every actor in CardVault (callers, vendors, cards, the registry itself and
//! the assets it custodies) is identified by a 20-byte address rendered as
//! `0x`-prefixed lowercase hex.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{decode_fixed, ParseError};

/// Width of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The reserved all-zero address. Never a valid owner or gateway.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Take the trailing 20 bytes of a 32-byte digest.
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&word[32 - ADDRESS_LEN..]);
        Self(bytes)
    }

    /// Parse from hex, with or without the `0x` prefix
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        decode_fixed::<ADDRESS_LEN>(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_lowercase_hex() {
        let addr = Address([0xAB; ADDRESS_LEN]);
        let s = addr.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 42);
        assert_eq!(s, format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn parse_accepts_bare_and_prefixed() {
        let addr = Address([0x11; ADDRESS_LEN]);
        assert_eq!(Address::parse(&addr.to_string()).unwrap(), addr);
        assert_eq!(Address::parse(&"11".repeat(20)).unwrap(), addr);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = Address::parse("0x1234").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLength {
                expected: 20,
                actual: 2
            }
        );
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(matches!(
            Address::parse("0xzz"),
            Err(ParseError::InvalidHex { .. })
        ));
    }

    #[test]
    fn from_word_takes_trailing_bytes() {
        let mut word = [0u8; 32];
        word[12] = 0x42;
        word[31] = 0x99;
        let addr = Address::from_word(&word);
        assert_eq!(addr.0[0], 0x42);
        assert_eq!(addr.0[19], 0x99);
    }

    #[test]
    fn serde_uses_hex_string() {
        let addr = Address([0x01; ADDRESS_LEN]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address([1; ADDRESS_LEN]).is_zero());
    }
}

//! Parse errors for CardVault value types

use thiserror::Error;

/// Result type for value-type parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors produced while parsing hex-encoded values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was not valid hex
    #[error("Invalid hex: {message}")]
    InvalidHex { message: String },

    /// Decoded value had the wrong width
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Decode a `0x`-prefixed (or bare) hex string into a fixed-width array.
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N]> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| ParseError::InvalidHex {
        message: e.to_string(),
    })?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| ParseError::InvalidLength {
        expected: N,
        actual,
    })
}

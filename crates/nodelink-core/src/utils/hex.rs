//! Parsing and formatting of the hex encodings used by Ethereum JSON-RPC.
//!
//! Quantities (`"0x1a"`) are decoded into [`U256`] or `u64` without going through
//! floating point, so values far beyond 2^53 survive intact. Fixed-size data (hashes,
//! addresses) and unformatted byte strings are decoded into the `alloy_primitives`
//! types used throughout the crate.

use alloy_primitives::{Address, Bytes, B256, U256};
use std::str::FromStr;
use thiserror::Error;

/// Error produced when a JSON-RPC hex value cannot be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HexParseError {
    #[error("missing 0x prefix: {0}")]
    MissingPrefix(String),
    #[error("empty quantity")]
    EmptyQuantity,
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// Removes a leading `0x`/`0X` if present.
#[inline]
#[must_use]
pub fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

fn quantity_digits(value: &str) -> Result<&str, HexParseError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| HexParseError::MissingPrefix(value.to_string()))?;

    if digits.is_empty() {
        return Err(HexParseError::EmptyQuantity);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexParseError::InvalidHex(value.to_string()));
    }
    Ok(digits)
}

/// Decodes a `0x`-prefixed hex quantity into a 256-bit unsigned integer.
///
/// # Errors
///
/// Returns [`HexParseError`] if the prefix is missing, the digits are not hex, or the
/// value does not fit in 256 bits.
pub fn parse_quantity(value: &str) -> Result<U256, HexParseError> {
    let digits = quantity_digits(value)?;
    U256::from_str_radix(digits, 16).map_err(|e| HexParseError::OutOfRange(e.to_string()))
}

/// Decodes a `0x`-prefixed hex quantity that must fit in a `u64` (block numbers, nonces).
///
/// # Errors
///
/// Returns [`HexParseError`] on malformed input or if the value exceeds `u64::MAX`.
pub fn parse_quantity_u64(value: &str) -> Result<u64, HexParseError> {
    let digits = quantity_digits(value)?;
    u64::from_str_radix(digits, 16).map_err(|_| HexParseError::OutOfRange(value.to_string()))
}

/// Decodes a base-10 integer string, as returned by scanner-style HTTP APIs.
///
/// # Errors
///
/// Returns [`HexParseError::InvalidDecimal`] when the string is empty or holds non-digits.
pub fn parse_decimal(value: &str) -> Result<U256, HexParseError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HexParseError::InvalidDecimal(value.to_string()));
    }
    U256::from_str_radix(value, 10).map_err(|e| HexParseError::OutOfRange(e.to_string()))
}

/// Decodes a 32-byte hash.
///
/// # Errors
///
/// Returns [`HexParseError::InvalidHex`] if the value is not 32 bytes of hex.
pub fn parse_hash(value: &str) -> Result<B256, HexParseError> {
    if !value.starts_with("0x") && !value.starts_with("0X") {
        return Err(HexParseError::MissingPrefix(value.to_string()));
    }
    B256::from_str(value).map_err(|e| HexParseError::InvalidHex(e.to_string()))
}

/// Decodes a 20-byte address. Checksum casing is accepted but not enforced.
///
/// # Errors
///
/// Returns [`HexParseError::InvalidHex`] if the value is not 20 bytes of hex.
pub fn parse_address(value: &str) -> Result<Address, HexParseError> {
    if !value.starts_with("0x") && !value.starts_with("0X") {
        return Err(HexParseError::MissingPrefix(value.to_string()));
    }
    Address::from_str(value).map_err(|e| HexParseError::InvalidHex(e.to_string()))
}

/// Decodes unformatted data (`"0x"` is valid and yields empty bytes).
///
/// # Errors
///
/// Returns [`HexParseError::InvalidHex`] if the value holds non-hex characters or an odd
/// number of digits.
pub fn parse_bytes(value: &str) -> Result<Bytes, HexParseError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| HexParseError::MissingPrefix(value.to_string()))?;
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| HexParseError::InvalidHex(e.to_string()))
}

/// Formats a `u64` as a minimal hex quantity. Zero is formatted as `"0x0"`.
#[inline]
#[must_use]
pub fn format_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Formats a 256-bit quantity as a minimal hex string.
#[must_use]
pub fn format_u256(value: U256) -> String {
    format!("0x{value:x}")
}

/// Formats raw bytes as `0x`-prefixed lowercase hex.
#[must_use]
pub fn format_bytes(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}

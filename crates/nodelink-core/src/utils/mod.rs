//! Utility functions shared by the node client and transports.
//!
//! ## Hex Encoding (`hex`)
//! - Quantity decoding into 256-bit integers without floating point
//! - Fixed-size hash and address decoding
//! - Decimal decoding for scanner-style APIs

pub mod hex;

pub use hex::{
    format_bytes, format_quantity, format_u256, parse_address, parse_bytes, parse_decimal,
    parse_hash, parse_quantity, parse_quantity_u64, strip_hex_prefix, HexParseError,
};

//! # Account Addresses
//!
//! Every holder of GPTG is identified by an [`Address`]: 20 opaque bytes,
//! written as `0x`-prefixed lowercase hex. The ledger imposes no structure on
//! them beyond equality, ordering (for canonical snapshots), and one
//! distinguished value: [`Address::ZERO`], the null identity.
//!
//! The null identity never holds funds. Transfers to it, approvals for it,
//! and operations issued by it are all rejected by the ledger. Burns are
//! reported as transfers *to* it, which is the only place it appears in an
//! event.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced when parsing an address from text or bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The input was not valid hexadecimal.
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),

    /// The decoded input had the wrong number of bytes.
    #[error("invalid address length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length (always [`Address::LEN`]).
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An opaque, stable account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; Address::LEN]);

impl Address {
    /// Length of an address in bytes.
    pub const LEN: usize = 20;

    /// The null identity. Never a valid recipient, spender, or caller.
    pub const ZERO: Address = Address([0u8; Address::LEN]);

    /// Creates an address from its raw bytes.
    pub const fn from_bytes(bytes: [u8; Address::LEN]) -> Self {
        Self(bytes)
    }

    /// Creates an address with every byte set to `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; Address::LEN])
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; Address::LEN] {
        &self.0
    }

    /// Returns `true` for the null identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; Address::LEN]
    }

    /// Returns the `0x`-prefixed lowercase hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses a hex address. The `0x` prefix is optional and case is ignored.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Builds an address from a byte slice of exactly [`Address::LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; Address::LEN] = bytes.try_into().map_err(|_| AddressError::InvalidLength {
            expected: Address::LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Serialized as the hex string so addresses work as JSON map keys and stay
// readable in snapshots.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

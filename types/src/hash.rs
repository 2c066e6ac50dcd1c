//! Opaque 32-byte content reference attached to proposals.

use crate::error::TypesError;
use crate::hexfmt::{self, impl_hex_serde};
use std::fmt;
use std::str::FromStr;

/// A 32-byte digest of off-engine proposal content (document, diff, ...).
/// The engine stores it and never interprets it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hexfmt::encode(&self.0))
    }
}

impl FromStr for ContentHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hexfmt::decode::<32>(s).map(Self)
    }
}

impl_hex_serde!(ContentHash, 32);

//! 4-byte method selector identifying the operation a resolution invokes.

use crate::error::TypesError;
use crate::hexfmt::{self, impl_hex_serde};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::fmt;
use std::str::FromStr;

type Blake2b256 = Blake2b<U32>;

/// The leading four bytes of an encoded call payload.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Selector([u8; 4]);

impl Selector {
    /// The unset selector. Payloads shorter than four bytes map here.
    pub const ZERO: Self = Self([0u8; 4]);

    /// Sentinel selector meaning "any method" in requirement lookups.
    pub const WILDCARD: Self = Self([0xffu8; 4]);

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Selector of an encoded call payload: its first four bytes, or
    /// [`Selector::ZERO`] when the payload is too short to carry one.
    pub fn from_payload(payload: &[u8]) -> Self {
        match payload.get(..4) {
            Some(head) => {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(head);
                Self(bytes)
            }
            None => Self::ZERO,
        }
    }

    /// Selector of a named operation: the first four bytes of the
    /// Blake2b-256 digest of its signature string.
    pub fn from_signature(signature: &str) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(signature.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&digest[..4]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 4]
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", hex::encode(self.0))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hexfmt::encode(&self.0))
    }
}

impl FromStr for Selector {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hexfmt::decode::<4>(s).map(Self)
    }
}

impl_hex_serde!(Selector, 4);

//! Parse errors for the textual forms of the value types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("missing 0x prefix in {0:?}")]
    MissingPrefix(String),

    #[error("expected {expected} hex digits, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

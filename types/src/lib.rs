//! Fundamental types for the Agora governance engine.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: holder and contract addresses, method selectors, content
//! hashes, and timestamps.

pub mod address;
pub mod error;
pub mod hash;
mod hexfmt;
pub mod selector;
pub mod time;

pub use address::Address;
pub use error::TypesError;
pub use hash::ContentHash;
pub use selector::Selector;
pub use time::Timestamp;

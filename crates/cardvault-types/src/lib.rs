//! CardVault Types - Canonical value types for card custody
//!
//! This crate contains the foundational value types shared by every other
//! cardvault crate. It has zero dependencies on other cardvault crates.
//!
//! - `Address`: 20-byte identity (callers, cards, registries, assets)
//! - `CardHash`: 32-byte card identifier derived from a serial
//! - `Serial`: opaque caller-supplied card serial number
//! - `AssetId`: the fungible asset a card custodies
//! - `Amount`: token quantity in smallest units

pub mod address;
pub mod amount;
pub mod card;
pub mod error;

pub use address::*;
pub use amount::*;
pub use card::*;
pub use error::*;

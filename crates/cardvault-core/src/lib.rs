//! CardVault Core - Registry of access-controlled cards
//!
//! A `CardManager` (the registry) maps serial-derived identifiers to cards,
//! creates each card lazily at a deterministic address, and owns the vendor
//! allow-list. A `Card` custodies balances held in an external asset ledger
//! and releases them only to allow-listed vendors.
//!
//! # Authority Axes
//!
//! Two independent axes govern every card:
//!
//! 1. **Ownership**: who may reassign the card's owner slot. Starts with the
//!    registry and moves to an external owner exactly once.
//! 2. **Withdrawal**: who may move funds out. Any identity on the registry's
//!    allow-list at call time, regardless of the owner slot.
//!
//! # Invariants
//!
//! 1. `card_hash(serial)` and `card_address(hash)` are pure
//! 2. A card is materialized at most once per hash
//! 3. Allow-list replacement is wholesale and takes effect immediately
//! 4. Failed operations leave balances, ownership, and the allow-list untouched

pub mod card;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;
pub mod whitelist;

pub use card::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use registry::*;
pub use whitelist::*;

//! CardVault Crypto - Deterministic derivations for card custody
//!
//! This crate provides:
//! - Keccak-256 hashing
//! - Registry addresses derived from deployer and nonce
//! - Card identifiers derived from a serial and the registry address
//! - Card addresses computable before the card exists
//!
//! # Determinism
//!
//! Every function here is pure. No counters, clocks, or creation order take
//! part in any derivation, so the same inputs always produce the same output.

pub mod hash;
pub mod derive;

pub use hash::*;
pub use derive::*;

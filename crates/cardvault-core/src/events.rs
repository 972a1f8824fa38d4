//! Registry events
//!
//! Every accepted mutation appends one event to the registry's journal.
//! Rejected operations append nothing.

use cardvault_types::{Address, Amount, AssetId, CardHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events emitted by the registry and its cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    /// The registry was instantiated
    RegistryDeployed {
        registry: Address,
        admin: Address,
        entry_point: Address,
        community_entry_point: Address,
        vendors: Vec<Address>,
        timestamp: DateTime<Utc>,
    },

    /// A card was materialized at its deterministic address
    CardCreated {
        card: CardHash,
        address: Address,
        timestamp: DateTime<Utc>,
    },

    /// The vendor allow-list was replaced
    WhitelistUpdated {
        added: Vec<Address>,
        removed: Vec<Address>,
        size: usize,
        timestamp: DateTime<Utc>,
    },

    /// A card's owner slot changed
    CardOwnershipTransferred {
        card: CardHash,
        previous_owner: Address,
        new_owner: Address,
        timestamp: DateTime<Utc>,
    },

    /// Funds left a card
    Withdrawal {
        card: CardHash,
        asset: AssetId,
        initiator: Address,
        destination: Address,
        amount: Amount,
        remaining: Amount,
        timestamp: DateTime<Utc>,
    },
}

impl RegistryEvent {
    /// Short name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryEvent::RegistryDeployed { .. } => "registry_deployed",
            RegistryEvent::CardCreated { .. } => "card_created",
            RegistryEvent::WhitelistUpdated { .. } => "whitelist_updated",
            RegistryEvent::CardOwnershipTransferred { .. } => "card_ownership_transferred",
            RegistryEvent::Withdrawal { .. } => "withdrawal",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RegistryEvent::RegistryDeployed { timestamp, .. }
            | RegistryEvent::CardCreated { timestamp, .. }
            | RegistryEvent::WhitelistUpdated { timestamp, .. }
            | RegistryEvent::CardOwnershipTransferred { timestamp, .. }
            | RegistryEvent::Withdrawal { timestamp, .. } => *timestamp,
        }
    }

    /// The card this event concerns, if any
    pub fn card(&self) -> Option<&CardHash> {
        match self {
            RegistryEvent::CardCreated { card, .. }
            | RegistryEvent::CardOwnershipTransferred { card, .. }
            | RegistryEvent::Withdrawal { card, .. } => Some(card),
            _ => None,
        }
    }
}

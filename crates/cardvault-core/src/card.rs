//! Cards (custody sub-accounts)
//!
//! A card custodies balances held for its address in the registry's asset
//! ledger. It has a single owner slot and a gated withdrawal:
//!
//! - `transfer_ownership` may only be called by the current owner
//! - `withdraw` may be called by any vendor on the registry's allow-list,
//!   whoever owns the card
//!
//! Card state lives inside the registry; a `Card` is a handle onto it that
//! carries a back-reference for allow-list lookups.

use std::sync::Arc;

use cardvault_ledger::{EntryReason, TransferReceipt};
use cardvault_types::{Address, Amount, AssetId, CardHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};
use crate::events::RegistryEvent;
use crate::registry::{RegistryInner, RegistryState};

/// Who controls a card's owner slot.
///
/// A card starts registry-controlled and can leave that state exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CardControl {
    /// The registry that created the card is its owner
    RegistryControlled,
    /// Ownership has been handed to an external identity
    ExternallyControlled { owner: Address },
}

impl CardControl {
    /// Resolve the owner identity, given the registry's own address
    pub fn owner(&self, registry: &Address) -> Address {
        match self {
            CardControl::RegistryControlled => *registry,
            CardControl::ExternallyControlled { owner } => *owner,
        }
    }

    pub fn is_registry_controlled(&self) -> bool {
        matches!(self, CardControl::RegistryControlled)
    }
}

/// Stored state of a materialized card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub hash: CardHash,
    pub address: Address,
    pub control: CardControl,
    pub created_at: DateTime<Utc>,
}

impl CardRecord {
    pub(crate) fn new(hash: CardHash, address: Address) -> Self {
        Self {
            hash,
            address,
            control: CardControl::RegistryControlled,
            created_at: Utc::now(),
        }
    }
}

/// Handle onto a materialized card
#[derive(Clone)]
pub struct Card {
    hash: CardHash,
    address: Address,
    registry: Arc<RegistryInner>,
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("hash", &self.hash)
            .field("address", &self.address)
            .field("registry", &self.registry.address)
            .finish()
    }
}

impl Card {
    pub(crate) fn new(hash: CardHash, address: Address, registry: Arc<RegistryInner>) -> Self {
        Self {
            hash,
            address,
            registry,
        }
    }

    pub fn hash(&self) -> &CardHash {
        &self.hash
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Address of the registry this card belongs to
    pub fn registry(&self) -> &Address {
        &self.registry.address
    }

    /// Current administrative owner
    pub async fn owner(&self) -> Result<Address> {
        Ok(self.control().await?.owner(&self.registry.address))
    }

    /// Current control state of the owner slot
    pub async fn control(&self) -> Result<CardControl> {
        let state = self.registry.state.read().await;
        state
            .cards
            .get(&self.hash)
            .map(|record| record.control)
            .ok_or_else(|| unknown_card(&self.hash))
    }

    /// Balance this card custodies in `asset`
    pub async fn balance(&self, asset: &AssetId) -> Amount {
        self.registry.ledger.balance_of(&self.address, asset).await
    }

    /// Hand the owner slot to `new_owner`. Only the current external owner
    /// may call.
    ///
    /// The registry never acts through a card handle: a registry-owned card
    /// moves only via `CardManager::transfer_card_ownership`, which checks
    /// the admin.
    pub async fn transfer_ownership(&self, caller: &Address, new_owner: &Address) -> Result<()> {
        if caller == &self.registry.address {
            tracing::warn!(card = %self.hash, "registry identity asserted through card handle");
            return Err(CardError::Unauthorized { caller: *caller });
        }

        let mut state = self.registry.state.write().await;
        transfer_ownership_locked(&self.registry, &mut state, &self.hash, caller, new_owner)
    }

    /// Withdraw `amount` of `asset` to `destination`.
    ///
    /// `caller` must be on the registry's allow-list at call time.
    pub async fn withdraw(
        &self,
        caller: &Address,
        asset: &AssetId,
        destination: &Address,
        amount: Amount,
    ) -> Result<TransferReceipt> {
        let mut state = self.registry.state.write().await;
        withdraw_locked(
            &self.registry,
            &mut state,
            &self.hash,
            caller,
            asset,
            destination,
            amount,
        )
        .await
    }
}

pub(crate) fn unknown_card(hash: &CardHash) -> CardError {
    CardError::UnknownCard {
        card: hash.to_string(),
    }
}

/// Owner-slot transition, applied under the registry write lock.
pub(crate) fn transfer_ownership_locked(
    registry: &RegistryInner,
    state: &mut RegistryState,
    hash: &CardHash,
    caller: &Address,
    new_owner: &Address,
) -> Result<()> {
    let record = state.cards.get_mut(hash).ok_or_else(|| unknown_card(hash))?;

    let previous_owner = record.control.owner(&registry.address);
    if caller != &previous_owner {
        tracing::warn!(card = %hash, %caller, owner = %previous_owner, "ownership transfer denied");
        return Err(CardError::NotOwner {
            caller: *caller,
            owner: previous_owner,
        });
    }

    // The registry can only ever be the initial owner
    if new_owner.is_zero() || new_owner == &registry.address {
        return Err(CardError::InvalidOwner { owner: *new_owner });
    }

    record.control = CardControl::ExternallyControlled { owner: *new_owner };

    tracing::info!(card = %hash, from = %previous_owner, to = %new_owner, "card ownership transferred");
    state.events.push(RegistryEvent::CardOwnershipTransferred {
        card: *hash,
        previous_owner,
        new_owner: *new_owner,
        timestamp: Utc::now(),
    });
    Ok(())
}

/// Gated withdrawal, applied under the registry write lock.
///
/// The allow-list is read live; nothing about membership is cached on the
/// card. The ledger transfer is the only external effect and is atomic.
pub(crate) async fn withdraw_locked(
    registry: &RegistryInner,
    state: &mut RegistryState,
    hash: &CardHash,
    caller: &Address,
    asset: &AssetId,
    destination: &Address,
    amount: Amount,
) -> Result<TransferReceipt> {
    let card_address = state
        .cards
        .get(hash)
        .map(|record| record.address)
        .ok_or_else(|| unknown_card(hash))?;

    if !state.whitelist.contains(caller) {
        tracing::warn!(card = %hash, %caller, "withdrawal by non-whitelisted caller");
        return Err(CardError::NotWhitelisted { caller: *caller });
    }

    if amount.is_zero() {
        return Err(CardError::InvalidAmount {
            message: "Amount must be greater than zero".to_string(),
        });
    }

    let receipt = registry
        .ledger
        .transfer(
            asset,
            &card_address,
            destination,
            amount,
            EntryReason::CardWithdrawal {
                card: card_address,
                initiator: *caller,
            },
        )
        .await?;

    tracing::info!(
        card = %hash,
        %caller,
        %destination,
        %amount,
        remaining = %receipt.from_balance,
        "withdrawal"
    );
    state.events.push(RegistryEvent::Withdrawal {
        card: *hash,
        asset: *asset,
        initiator: *caller,
        destination: *destination,
        amount,
        remaining: receipt.from_balance,
        timestamp: Utc::now(),
    });
    Ok(receipt)
}

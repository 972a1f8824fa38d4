//! The card registry
//!
//! `CardManager` derives card identifiers from serials, creates cards lazily
//! at deterministic addresses, holds the vendor allow-list, and proxies
//! withdrawals and ownership transfers to its cards.
//!
//! Every mutating call takes the registry's write lock for its whole
//! duration, so mutations are applied in one serial order and none observes
//! another half-applied. Pure queries (`card_hash`, `card_address`) take no
//! lock at all.

use std::collections::HashMap;
use std::sync::Arc;

use cardvault_crypto::{card_address, card_hash, registry_address};
use cardvault_ledger::{AssetLedger, TransferReceipt};
use cardvault_types::{Address, Amount, AssetId, CardHash, Serial};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::card::{transfer_ownership_locked, unknown_card, withdraw_locked, Card, CardRecord};
use crate::config::RegistryConfig;
use crate::error::{CardError, Result};
use crate::events::RegistryEvent;
use crate::whitelist::VendorWhitelist;

/// Meta-transaction gateways the registry was deployed with.
///
/// Stored and exposed only; custody logic never calls them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateways {
    pub entry_point: Address,
    pub community_entry_point: Address,
}

pub(crate) struct RegistryState {
    pub(crate) cards: HashMap<CardHash, CardRecord>,
    pub(crate) by_address: HashMap<Address, CardHash>,
    pub(crate) whitelist: VendorWhitelist,
    pub(crate) events: Vec<RegistryEvent>,
}

pub(crate) struct RegistryInner {
    pub(crate) address: Address,
    pub(crate) admin: Address,
    pub(crate) gateways: Gateways,
    pub(crate) ledger: Arc<dyn AssetLedger>,
    pub(crate) state: RwLock<RegistryState>,
}

/// Registry of access-controlled cards
#[derive(Clone)]
pub struct CardManager {
    inner: Arc<RegistryInner>,
}

impl std::fmt::Debug for CardManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardManager")
            .field("address", &self.inner.address)
            .field("admin", &self.inner.admin)
            .field("gateways", &self.inner.gateways)
            .finish_non_exhaustive()
    }
}

impl CardManager {
    /// Instantiate a registry.
    ///
    /// The deployer becomes the admin; the registry address is derived from
    /// the deployer and nonce.
    pub fn deploy(config: RegistryConfig, ledger: Arc<dyn AssetLedger>) -> Result<Self> {
        config.validate()?;

        let address = registry_address(&config.deployer, config.nonce);
        let gateways = Gateways {
            entry_point: config.entry_point,
            community_entry_point: config.community_entry_point,
        };
        let whitelist = VendorWhitelist::new(config.vendors);

        let deployed = RegistryEvent::RegistryDeployed {
            registry: address,
            admin: config.deployer,
            entry_point: gateways.entry_point,
            community_entry_point: gateways.community_entry_point,
            vendors: whitelist.members(),
            timestamp: Utc::now(),
        };

        tracing::info!(
            registry = %address,
            admin = %config.deployer,
            vendors = whitelist.len(),
            "card registry deployed"
        );

        let state = RegistryState {
            cards: HashMap::new(),
            by_address: HashMap::new(),
            whitelist,
            events: vec![deployed],
        };

        Ok(Self {
            inner: Arc::new(RegistryInner {
                address,
                admin: config.deployer,
                gateways,
                ledger,
                state: RwLock::new(state),
            }),
        })
    }

    /// The registry's own identity
    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    /// Controlling authority for allow-list and ownership administration
    pub fn admin(&self) -> &Address {
        &self.inner.admin
    }

    pub fn gateways(&self) -> &Gateways {
        &self.inner.gateways
    }

    /// The asset ledger cards instruct
    pub fn ledger(&self) -> Arc<dyn AssetLedger> {
        Arc::clone(&self.inner.ledger)
    }

    // ── Pure derivations ─────────────────────────────────────────────────────

    /// Card identifier for `serial` on this registry
    pub fn card_hash(&self, serial: Serial) -> CardHash {
        card_hash(&self.inner.address, serial)
    }

    /// Where the card for `hash` lives, whether or not it exists yet
    pub fn card_address(&self, hash: &CardHash) -> Address {
        card_address(&self.inner.address, hash)
    }

    // ── Cards ────────────────────────────────────────────────────────────────

    /// Materialize the card for `hash` if absent and return its address.
    ///
    /// Idempotent: repeated calls return the same address and create nothing.
    pub async fn create_card(&self, hash: &CardHash) -> Address {
        let address = self.card_address(hash);
        let mut state = self.inner.state.write().await;

        if state.cards.contains_key(hash) {
            tracing::debug!(card = %hash, %address, "card already exists");
            return address;
        }

        state.cards.insert(*hash, CardRecord::new(*hash, address));
        state.by_address.insert(address, *hash);

        tracing::info!(card = %hash, %address, "card created");
        state.events.push(RegistryEvent::CardCreated {
            card: *hash,
            address,
            timestamp: Utc::now(),
        });
        address
    }

    /// Handle onto the card for `hash`
    pub async fn card(&self, hash: &CardHash) -> Result<Card> {
        let state = self.inner.state.read().await;
        let record = state.cards.get(hash).ok_or_else(|| unknown_card(hash))?;
        Ok(Card::new(*hash, record.address, Arc::clone(&self.inner)))
    }

    /// Handle onto the card living at `address`
    pub async fn card_at(&self, address: &Address) -> Result<Card> {
        let state = self.inner.state.read().await;
        let hash = state
            .by_address
            .get(address)
            .ok_or_else(|| CardError::UnknownCard {
                card: address.to_string(),
            })?;
        Ok(Card::new(*hash, *address, Arc::clone(&self.inner)))
    }

    /// Snapshot of the stored card state
    pub async fn card_info(&self, hash: &CardHash) -> Result<CardRecord> {
        let state = self.inner.state.read().await;
        state.cards.get(hash).cloned().ok_or_else(|| unknown_card(hash))
    }

    pub async fn card_exists(&self, hash: &CardHash) -> bool {
        self.inner.state.read().await.cards.contains_key(hash)
    }

    pub async fn card_count(&self) -> usize {
        self.inner.state.read().await.cards.len()
    }

    // ── Allow-list ───────────────────────────────────────────────────────────

    pub async fn is_whitelisted(&self, identity: &Address) -> bool {
        self.inner.state.read().await.whitelist.contains(identity)
    }

    /// Sorted snapshot of current vendors
    pub async fn whitelist(&self) -> Vec<Address> {
        self.inner.state.read().await.whitelist.members()
    }

    /// Replace the entire allow-list. Admin only.
    pub async fn update_whitelist(
        &self,
        caller: &Address,
        vendors: impl IntoIterator<Item = Address>,
    ) -> Result<()> {
        self.ensure_admin(caller)?;

        let mut state = self.inner.state.write().await;
        let change = state.whitelist.replace(vendors);
        let size = state.whitelist.len();

        if change.is_noop() {
            tracing::debug!(size, "vendor whitelist unchanged");
            return Ok(());
        }

        tracing::info!(
            added = change.added.len(),
            removed = change.removed.len(),
            size,
            "vendor whitelist replaced"
        );
        state.events.push(RegistryEvent::WhitelistUpdated {
            added: change.added,
            removed: change.removed,
            size,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    // ── Proxied card operations ──────────────────────────────────────────────

    /// Hand a registry-owned card to `new_owner`. Admin only.
    ///
    /// One-shot: once a card is externally owned the registry has no standing
    /// to move it again and this fails with `NotCurrentOwner`.
    pub async fn transfer_card_ownership(
        &self,
        caller: &Address,
        hash: &CardHash,
        new_owner: &Address,
    ) -> Result<()> {
        self.ensure_admin(caller)?;

        let mut state = self.inner.state.write().await;
        let control = state
            .cards
            .get(hash)
            .map(|record| record.control)
            .ok_or_else(|| unknown_card(hash))?;

        if !control.is_registry_controlled() {
            let owner = control.owner(&self.inner.address);
            tracing::warn!(card = %hash, %owner, "registry no longer owns card");
            return Err(CardError::NotCurrentOwner {
                card: hash.to_string(),
                owner,
            });
        }

        transfer_ownership_locked(&self.inner, &mut state, hash, &self.inner.address, new_owner)
    }

    /// Withdraw from the card for `hash` on behalf of `caller`.
    ///
    /// Allow-list membership alone authorizes the call; the caller need not
    /// own the card.
    pub async fn withdraw(
        &self,
        caller: &Address,
        hash: &CardHash,
        asset: &AssetId,
        destination: &Address,
        amount: Amount,
    ) -> Result<TransferReceipt> {
        let mut state = self.inner.state.write().await;
        withdraw_locked(
            &self.inner,
            &mut state,
            hash,
            caller,
            asset,
            destination,
            amount,
        )
        .await
    }

    // ── Journal ──────────────────────────────────────────────────────────────

    /// All events so far, oldest first
    pub async fn events(&self) -> Vec<RegistryEvent> {
        self.inner.state.read().await.events.clone()
    }

    fn ensure_admin(&self, caller: &Address) -> Result<()> {
        if caller != &self.inner.admin {
            tracing::warn!(%caller, "admin operation denied");
            return Err(CardError::Unauthorized { caller: *caller });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardvault_crypto::named_identity;
    use cardvault_ledger::Ledger;

    fn config() -> RegistryConfig {
        RegistryConfig::new(
            named_identity("owner"),
            named_identity("entrypoint"),
            named_identity("community-entrypoint"),
        )
        .with_vendors([named_identity("vendor1"), named_identity("vendor2")])
    }

    fn deploy() -> CardManager {
        CardManager::deploy(config(), Arc::new(Ledger::new())).unwrap()
    }

    #[test]
    fn test_deploy_derives_address_and_admin() {
        let manager = deploy();
        assert_eq!(
            manager.address(),
            &registry_address(&named_identity("owner"), 0)
        );
        assert_eq!(manager.admin(), &named_identity("owner"));
        assert_eq!(
            manager.gateways().community_entry_point,
            named_identity("community-entrypoint")
        );
    }

    #[test]
    fn test_deploy_rejects_zero_gateway() {
        let config = RegistryConfig::new(named_identity("owner"), Address::ZERO, Address([1; 20]));
        let result = CardManager::deploy(config, Arc::new(Ledger::new()));
        assert!(matches!(result, Err(CardError::Config(_))));
    }

    #[test]
    fn test_same_serial_different_registries() {
        let a = deploy();
        let b = CardManager::deploy(config().with_nonce(1), Arc::new(Ledger::new())).unwrap();
        assert_ne!(a.card_hash(Serial(123)), b.card_hash(Serial(123)));
    }

    #[tokio::test]
    async fn test_create_card_is_idempotent() {
        let manager = deploy();
        let hash = manager.card_hash(Serial(123));

        let first = manager.create_card(&hash).await;
        let second = manager.create_card(&hash).await;

        assert_eq!(first, second);
        assert_eq!(manager.card_count().await, 1);
        let created = manager
            .events()
            .await
            .iter()
            .filter(|e| e.kind() == "card_created")
            .count();
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_unknown_card_before_creation() {
        let manager = deploy();
        let hash = manager.card_hash(Serial(5));

        assert!(!manager.card_exists(&hash).await);
        assert!(matches!(
            manager.card(&hash).await,
            Err(CardError::UnknownCard { .. })
        ));
        assert!(matches!(
            manager.card_at(&manager.card_address(&hash)).await,
            Err(CardError::UnknownCard { .. })
        ));
        assert!(matches!(
            manager
                .transfer_card_ownership(manager.admin(), &hash, &named_identity("friend1"))
                .await,
            Err(CardError::UnknownCard { .. })
        ));
    }

    #[tokio::test]
    async fn test_card_at_resolves_created_card() {
        let manager = deploy();
        let hash = manager.card_hash(Serial(77));
        let address = manager.create_card(&hash).await;

        let card = manager.card_at(&address).await.unwrap();
        assert_eq!(card.hash(), &hash);
        assert_eq!(card.registry(), manager.address());
    }

    #[tokio::test]
    async fn test_unchanged_whitelist_records_no_event() {
        let manager = deploy();
        let vendors = [named_identity("vendor2"), named_identity("vendor1")];

        manager
            .update_whitelist(manager.admin(), vendors)
            .await
            .unwrap();
        assert_eq!(manager.events().await.len(), 1);

        manager
            .update_whitelist(manager.admin(), [named_identity("vendor1")])
            .await
            .unwrap();
        let events = manager.events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind(), "whitelist_updated");
    }

    #[tokio::test]
    async fn test_non_admin_cannot_update_whitelist() {
        let manager = deploy();
        let intruder = named_identity("vendor3");

        let result = manager.update_whitelist(&intruder, [intruder]).await;
        assert_eq!(result, Err(CardError::Unauthorized { caller: intruder }));
        assert!(!manager.is_whitelisted(&intruder).await);
        assert!(manager.is_whitelisted(&named_identity("vendor1")).await);
    }

    #[tokio::test]
    async fn test_deploy_event_recorded_first() {
        let manager = deploy();
        let events = manager.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "registry_deployed");
    }
}

//! Demo command - the full custody lifecycle on an in-memory ledger
//!
//! 1. Deploy a registry with vendor1 and vendor2 whitelisted
//! 2. Create the card for serial 123 and fund it with 100 units
//! 3. vendor1 withdraws 10; vendor3 (not listed) is refused
//! 4. Hand the card to friend1; a second hand-off is refused
//! 5. vendor1 still withdraws after the hand-off

use std::sync::Arc;

use cardvault_core::{CardManager, RegistryConfig};
use cardvault_crypto::named_identity;
use cardvault_ledger::{AssetLedger, Ledger};
use cardvault_types::{Amount, AssetId, Serial};

use crate::display;

/// Balances observed at the end of the demo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOutcome {
    pub card_balance: Amount,
    pub vendor1_balance: Amount,
    pub vendor3_balance: Amount,
}

pub async fn run() -> anyhow::Result<()> {
    let outcome = scenario().await?;
    display::section("Final Balances");
    display::balance("Card", outcome.card_balance);
    display::balance("vendor1", outcome.vendor1_balance);
    display::balance("vendor3", outcome.vendor3_balance);
    println!();
    Ok(())
}

pub async fn scenario() -> anyhow::Result<DemoOutcome> {
    let owner = named_identity("owner");
    let friend1 = named_identity("friend1");
    let vendor1 = named_identity("vendor1");
    let vendor2 = named_identity("vendor2");
    let vendor3 = named_identity("vendor3");
    let token = AssetId(named_identity("token"));

    display::section("Deploy");
    let ledger = Ledger::new();
    let config = RegistryConfig::new(
        owner,
        named_identity("entrypoint"),
        named_identity("community-entrypoint"),
    )
    .with_vendors([vendor1, vendor2]);
    let manager = CardManager::deploy(config, Arc::new(ledger.clone()))?;
    display::address("Registry", manager.address());

    display::section("Create & Fund Card");
    let hash = manager.card_hash(Serial(123));
    let address = manager.create_card(&hash).await;
    let card = manager.card(&hash).await?;
    ledger.mint(&address, &token, Amount::new(100), "demo deposit").await?;
    display::card_hash("Card hash", &hash);
    display::address("Card address", &address);
    display::address("Owner", &card.owner().await?);
    display::balance("Balance", card.balance(&token).await);

    display::section("Vendor Withdrawals");
    let receipt = card.withdraw(&vendor1, &token, &vendor1, Amount::new(10)).await?;
    display::accepted(&format!("vendor1 withdrew 10, card holds {}", receipt.from_balance));

    match manager
        .withdraw(&vendor3, &hash, &token, &vendor3, Amount::new(10))
        .await
    {
        Ok(_) => anyhow::bail!("vendor3 should not be able to withdraw"),
        Err(e) => display::refused("vendor3", &e),
    }

    display::section("Ownership Hand-off");
    manager.transfer_card_ownership(&owner, &hash, &friend1).await?;
    display::accepted("Card handed to friend1");
    display::address("Owner", &card.owner().await?);
    match manager.transfer_card_ownership(&owner, &hash, &friend1).await {
        Ok(_) => anyhow::bail!("second hand-off should be refused"),
        Err(e) => display::refused("second hand-off", &e),
    }

    manager
        .withdraw(&vendor1, &hash, &token, &vendor1, Amount::new(10))
        .await?;
    display::accepted("vendor1 still withdraws after the hand-off");
    display::field("Events recorded", manager.events().await.len());

    Ok(DemoOutcome {
        card_balance: card.balance(&token).await,
        vendor1_balance: ledger.balance_of(&vendor1, &token).await,
        vendor3_balance: ledger.balance_of(&vendor3, &token).await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scenario_balances() {
        let outcome = scenario().await.unwrap();
        assert_eq!(
            outcome,
            DemoOutcome {
                card_balance: Amount::new(80),
                vendor1_balance: Amount::new(20),
                vendor3_balance: Amount::zero(),
            }
        );
    }
}

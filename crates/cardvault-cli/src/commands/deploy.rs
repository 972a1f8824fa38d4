//! Deploy command - instantiate a registry and report where it lives

use std::path::Path;
use std::sync::Arc;

use cardvault_core::CardManager;
use cardvault_ledger::Ledger;

use crate::commands::load_config;
use crate::display;

pub async fn run(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    tracing::info!(deployer = %config.deployer, nonce = config.nonce, "deploying card registry");

    let manager = CardManager::deploy(config, Arc::new(Ledger::new()))?;
    let vendors = manager.whitelist().await;

    if json {
        let summary = serde_json::json!({
            "registry": manager.address(),
            "admin": manager.admin(),
            "gateways": manager.gateways(),
            "vendors": vendors,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    display::section("Card Registry Deployed");
    display::address("Registry", manager.address());
    display::address("Admin", manager.admin());
    display::address("Entry point", &manager.gateways().entry_point);
    display::address(
        "Community entry point",
        &manager.gateways().community_entry_point,
    );
    if vendors.is_empty() {
        display::note("No vendors whitelisted");
    }
    for vendor in &vendors {
        display::address("Vendor", vendor);
    }
    println!();
    Ok(())
}

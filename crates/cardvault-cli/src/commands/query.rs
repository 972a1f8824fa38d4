//! Query commands - pure derivations against a configured registry

use std::path::Path;

use cardvault_crypto::{card_address, card_hash, registry_address};
use cardvault_types::Serial;

use crate::commands::load_config;
use crate::display;

/// Print the card identifier for `serial`
pub fn hash(config_path: Option<&Path>, serial: u64, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = registry_address(&config.deployer, config.nonce);
    let hash = card_hash(&registry, Serial(serial));

    if json {
        let out = serde_json::json!({ "registry": registry, "serial": serial, "hash": hash });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        display::field("Serial", serial);
        display::card_hash("Card hash", &hash);
    }
    Ok(())
}

/// Print the card identifier and deterministic address for `serial`
pub fn address(config_path: Option<&Path>, serial: u64, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = registry_address(&config.deployer, config.nonce);
    let hash = card_hash(&registry, Serial(serial));
    let address = card_address(&registry, &hash);

    if json {
        let out = serde_json::json!({
            "registry": registry,
            "serial": serial,
            "hash": hash,
            "address": address,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        display::address("Registry", &registry);
        display::card_hash("Card hash", &hash);
        display::address("Card address", &address);
    }
    Ok(())
}

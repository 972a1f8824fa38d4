//! Registry configuration
//!
//! Deployment parameters for a registry: the deployer that becomes its admin,
//! the deployer nonce that fixes its address, the two meta-transaction
//! gateways, and the initial vendor allow-list.
//!
//! Loaded from environment variables or a JSON file.

use std::path::Path;

use cardvault_types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Primary gateway address
pub const ENV_ENTRYPOINT: &str = "ENTRYPOINT_ADDR";
/// Community gateway address
pub const ENV_COMMUNITY_ENTRYPOINT: &str = "COMMUNITY_ENTRYPOINT_ADDR";
/// Deployer (becomes registry admin)
pub const ENV_DEPLOYER: &str = "CARDVAULT_DEPLOYER";
/// Deployer nonce, defaults to 0
pub const ENV_NONCE: &str = "CARDVAULT_NONCE";
/// Comma separated initial vendors, defaults to none
pub const ENV_VENDORS: &str = "CARDVAULT_VENDORS";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} missing in your environment")]
    Missing { var: String },

    #[error("{var} is not a valid address: {message}")]
    InvalidAddress { var: String, message: String },

    #[error("{var} is not a valid nonce: {value}")]
    InvalidNonce { var: String, value: String },

    #[error("{field} must not be the zero address")]
    ZeroAddress { field: String },

    #[error("Failed to read config file: {message}")]
    Io { message: String },

    #[error("Failed to parse config file: {message}")]
    Parse { message: String },
}

/// Registry deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identity deploying the registry; becomes its admin
    pub deployer: Address,

    /// Deployer nonce used to derive the registry address
    #[serde(default)]
    pub nonce: u64,

    /// Primary meta-transaction gateway
    pub entry_point: Address,

    /// Secondary ("community") meta-transaction gateway
    pub community_entry_point: Address,

    /// Initial vendor allow-list
    #[serde(default)]
    pub vendors: Vec<Address>,
}

impl RegistryConfig {
    pub fn new(deployer: Address, entry_point: Address, community_entry_point: Address) -> Self {
        Self {
            deployer,
            nonce: 0,
            entry_point,
            community_entry_point,
            vendors: vec![],
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_vendors(mut self, vendors: impl IntoIterator<Item = Address>) -> Self {
        self.vendors = vendors.into_iter().collect();
        self
    }

    /// Load from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &str| -> Result<Address, ConfigError> {
            let value = lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::Missing {
                    var: var.to_string(),
                })?;
            parse_address(var, &value)
        };

        let entry_point = required(ENV_ENTRYPOINT)?;
        let community_entry_point = required(ENV_COMMUNITY_ENTRYPOINT)?;
        let deployer = required(ENV_DEPLOYER)?;

        let nonce = match lookup(ENV_NONCE).filter(|v| !v.trim().is_empty()) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNonce {
                    var: ENV_NONCE.to_string(),
                    value,
                })?,
            None => 0,
        };

        let vendors = match lookup(ENV_VENDORS) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_address(ENV_VENDORS, s))
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![],
        };

        let config = Self {
            deployer,
            nonce,
            entry_point,
            community_entry_point,
            vendors,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            message: format!("{}: {}", path.as_ref().display(), e),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero addresses in the deployer and gateway slots
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, address) in [
            ("deployer", &self.deployer),
            ("entry_point", &self.entry_point),
            ("community_entry_point", &self.community_entry_point),
        ] {
            if address.is_zero() {
                return Err(ConfigError::ZeroAddress {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_address(var: &str, value: &str) -> Result<Address, ConfigError> {
    Address::parse(value).map_err(|e| ConfigError::InvalidAddress {
        var: var.to_string(),
        message: e.to_string(),
    })
}

//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `NODELINK_CONFIG` env var
//! 3. **Environment variables**: `NODELINK__*` env vars override specific fields
//!
//! Networks from the config file are overlaid onto the built-in networks with
//! [`merge_network_config`] unless `merge_default_networks` is `false`.
//!
//! # Configuration Sections
//!
//! - [`ApiKeys`]: keys for hosted endpoint types
//! - [`HttpConfig`]: shared HTTP client limits and timeouts
//! - [`LoggingConfig`]: Log level and format
//! - [`NetworkDescriptor`]: networks and their nodes
//!
//! # Example
//!
//! ```toml
//! [api_keys]
//! infura = "your-project-id"
//!
//! [http]
//! request_timeout_ms = 5000
//!
//! [[networks]]
//! id = "Ethereum"
//! chain_id = 1
//! selected_node = "local"
//!
//! [[networks.nodes]]
//! name = "local"
//! type = "JSON_RPC"
//! url = "http://localhost:8545"
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};

use crate::{
    node::{ApiKeys, HttpClientConfig},
    store::merge_network_config,
    types::{DPath, DPathFormat, NetworkDescriptor, NodeDescriptor, NodeType},
};

/// Shared HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Maximum number of in-flight HTTP requests across all endpoints. Defaults to `64`.
    pub concurrent_limit: usize,

    /// Permit wait in milliseconds under normal load. Defaults to `2000`.
    pub permit_timeout_ms: u64,

    /// Permit wait in milliseconds when few permits remain. Defaults to `500`.
    pub permit_timeout_scarce_ms: u64,

    /// Remaining permits below which the scarce timeout applies. Defaults to `8`.
    pub scarce_permit_threshold: usize,

    /// Per-request timeout in milliseconds. Defaults to `10000`.
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let client = HttpClientConfig::default();
        Self {
            concurrent_limit: client.concurrent_limit,
            permit_timeout_ms: client.permit_timeout_ms,
            permit_timeout_scarce_ms: client.permit_timeout_scarce_ms,
            scarce_permit_threshold: client.scarce_permit_threshold,
            request_timeout_ms: client.request_timeout_ms,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            concurrent_limit: self.concurrent_limit,
            permit_timeout_ms: self.permit_timeout_ms,
            permit_timeout_scarce_ms: self.permit_timeout_scarce_ms,
            scarce_permit_threshold: self.scarce_permit_threshold,
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api_keys: ApiKeys,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Overlay configured networks onto the built-in ones. Defaults to `true`.
    #[serde(default = "default_true")]
    pub merge_default_networks: bool,

    #[serde(default = "default_networks")]
    pub networks: Vec<NetworkDescriptor>,
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            merge_default_networks: true,
            networks: default_networks(),
        }
    }
}

/// Built-in networks: Ethereum mainnet and the Goerli testnet.
///
/// Each is served by the block explorer API, Infura and an injected wallet, in that order.
#[must_use]
pub fn default_networks() -> Vec<NetworkDescriptor> {
    let hosted_nodes = |network: NetworkDescriptor, prefix: &str| {
        network
            .with_node(NodeDescriptor::new(format!("{prefix}_etherscan"), NodeType::Etherscan))
            .with_node(NodeDescriptor::new(format!("{prefix}_infura"), NodeType::Infura))
            .with_node(NodeDescriptor::new(format!("{prefix}_web3"), NodeType::Web3Injected))
    };

    let mut ethereum = hosted_nodes(NetworkDescriptor::new("Ethereum", 1), "eth");
    let mainnet_path = DPath { label: "Ethereum".to_string(), value: "m/44'/60'/0'/0".to_string() };
    for format in [DPathFormat::Trezor, DPathFormat::MnemonicPhrase] {
        ethereum.dpaths.insert(format, mainnet_path.clone());
    }
    ethereum.dpaths.insert(
        DPathFormat::LedgerNanoS,
        DPath { label: "Ethereum (Ledger Live)".to_string(), value: "m/44'/60'/0'".to_string() },
    );

    let mut goerli = hosted_nodes(NetworkDescriptor::new("Goerli", 5), "goerli");
    let testnet_path = DPath { label: "Testnet".to_string(), value: "m/44'/1'/0'/0".to_string() };
    for format in [DPathFormat::LedgerNanoS, DPathFormat::Trezor, DPathFormat::MnemonicPhrase] {
        goerli.dpaths.insert(format, testnet_path.clone());
    }

    vec![ethereum, goerli]
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `NODELINK__` prefix can override any configuration
    /// value. Use `__` as a separator for nested fields (e.g.,
    /// `NODELINK__API_KEYS__INFURA=...`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("http.concurrent_limit", 64)?
            .set_default("http.permit_timeout_ms", 2000)?
            .set_default("http.permit_timeout_scarce_ms", 500)?
            .set_default("http.scarce_permit_threshold", 8)?
            .set_default("http.request_timeout_ms", 10_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("NODELINK").separator("__"))
            .build()?;

        let mut config: Self = config_builder.try_deserialize()?;
        if config.merge_default_networks {
            config.networks = merge_network_config(&config.networks, &default_networks());
        }
        Ok(config)
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden using the `NODELINK_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("NODELINK_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - At least one network, with unique ids
    /// - At least one node per network, with unique names
    /// - `JSON_RPC` nodes carry a url, and every url is `http(s)` with a host
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.networks.is_empty() {
            return Err("No networks configured".to_string());
        }

        let mut network_ids = HashSet::new();
        for network in &self.networks {
            if !network_ids.insert(network.id.as_str()) {
                return Err(format!("Duplicate network id: {}", network.id));
            }
            if network.nodes.is_empty() {
                return Err(format!("Network {} has no nodes", network.id));
            }

            let mut node_names = HashSet::new();
            for node in &network.nodes {
                if !node_names.insert(node.name.as_str()) {
                    return Err(format!("Duplicate node {} in network {}", node.name, network.id));
                }
                match node.url.as_deref() {
                    Some(url) => validate_url(url).map_err(|reason| {
                        format!("Invalid url for node {} in {}: {reason}", node.name, network.id)
                    })?,
                    None if node.node_type.requires_url() => {
                        return Err(format!("Node {} in {} needs a url", node.name, network.id));
                    }
                    None => {}
                }
            }
        }

        if self.http.concurrent_limit == 0 {
            return Err("HTTP concurrent limit must be greater than 0".to_string());
        }

        if self.http.request_timeout_ms == 0 {
            return Err("HTTP request timeout must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }

    /// Looks up a network by id.
    #[must_use]
    pub fn network(&self, id: &str) -> Option<&NetworkDescriptor> {
        self.networks.iter().find(|n| n.id == id)
    }
}

fn validate_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {}", parsed.scheme()));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}

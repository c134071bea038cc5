//! Node configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use htlc_core::types::{Address, Amount};
use htlc_core::Params;

/// Full configuration for the HTLC node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HtlcConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Block production settings.
    #[serde(default)]
    pub chain: ChainConfig,

    /// HTLC module parameters.
    #[serde(default)]
    pub params: Params,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Balances minted on first start.
    #[serde(default)]
    pub genesis: GenesisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Time between blocks in milliseconds.
    #[serde(default = "default_block_interval_ms")]
    pub block_interval_ms: u64,
    /// Maximum number of transactions waiting for the next block.
    #[serde(default = "default_mempool_capacity")]
    pub mempool_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenesisConfig {
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
}

/// A single genesis balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub address: String,
    pub denom: String,
    pub value: u64,
}

impl GenesisAccount {
    pub fn address(&self) -> Address {
        Address::new(self.address.clone())
    }

    pub fn amount(&self) -> Amount {
        Amount::new(u128::from(self.value), self.denom.clone())
    }
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    26657
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_block_interval_ms() -> u64 {
    1000
}
fn default_mempool_capacity() -> usize {
    256
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            block_interval_ms: default_block_interval_ms(),
            mempool_capacity: default_mempool_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl HtlcConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: HtlcConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check values the node cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.params.validate()?;
        if self.chain.block_interval_ms == 0 {
            anyhow::bail!("chain.block_interval_ms must be positive");
        }
        if self.chain.mempool_capacity == 0 {
            anyhow::bail!("chain.mempool_capacity must be positive");
        }
        for account in &self.genesis.accounts {
            if account.address.trim().is_empty() || account.denom.trim().is_empty() {
                anyhow::bail!("genesis accounts need an address and a denom");
            }
        }
        Ok(())
    }

    /// The `host:port` the HTTP API binds to.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }
}

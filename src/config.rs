//! Chain configuration.
//!
//! Chains are described in a JSON document keyed by chain name:
//!
//! ```json
//! {
//!   "chains": {
//!     "Base": {
//!       "backend": "ethereum",
//!       "rpc": [{ "http": "$BASE_RPC_URL", "rate_limit": 20 }],
//!       "gas_token": { "name": "ETH", "decimals": 18, "alias": "Ether" },
//!       "explorer_url": "https://basescan.org"
//!     },
//!     "TON": {
//!       "backend": "ton",
//!       "gas_token": { "name": "TON", "decimals": 9 },
//!       "api_key": "$TONCENTER_API_KEY"
//!     }
//!   }
//! }
//! ```
//!
//! `$VAR` and `${VAR}` references are resolved from the environment, after
//! loading `.env` if present.

use chainrpc_types::config::{LiteralOrEnv, RpcConfig};
use chainrpc_types::{Backend, ChainInfo, RpcError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file read by [`ChainsConfig::load`].
pub const CONFIG_PATH_ENV: &str = "CHAINRPC_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "chains.json";

/// Native gas token of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasTokenConfig {
    pub name: String,
    pub decimals: u8,
    /// Display name. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// One chain entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub backend: Backend,
    /// RPC endpoints. JSON-RPC backends use all of them with fallback;
    /// Solana and TON use the first.
    #[serde(default)]
    pub rpc: Vec<RpcConfig>,
    pub gas_token: GasTokenConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub testnet: bool,
    /// API key sent to HTTP APIs that take one (toncenter).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<LiteralOrEnv<String>>,
}

impl ChainConfig {
    /// Static descriptor of the chain called `name`.
    pub fn chain_info(&self, name: &str) -> ChainInfo {
        let alias = self
            .gas_token
            .alias
            .clone()
            .unwrap_or_else(|| self.gas_token.name.clone());
        let info = ChainInfo::new(name, self.backend)
            .with_gas_token(self.gas_token.name.clone(), self.gas_token.decimals, alias)
            .testnet(self.testnet);
        match &self.explorer_url {
            Some(url) => info.with_explorer_url(url.clone()),
            None => info,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(String::as_str)
    }
}

/// All configured chains, keyed by chain name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainsConfig {
    #[serde(default)]
    pub chains: BTreeMap<String, ChainConfig>,
}

impl ChainsConfig {
    pub fn get(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ChainConfig)> {
        self.chains.iter()
    }

    /// Loads `.env`, then the file named by `CHAINRPC_CONFIG`
    /// (default `chains.json`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Loads `.env`, then the configuration file at `path`.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Chain {0} has no RPC endpoint configured")]
    NoRpc(String),
    #[error("Chain {chain}: unsupported RPC endpoint scheme {scheme}")]
    UnsupportedScheme { chain: String, scheme: String },
    #[error("Chain {chain}: {source}")]
    Connect {
        chain: String,
        #[source]
        source: RpcError,
    },
}

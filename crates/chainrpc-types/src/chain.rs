//! Static chain descriptors.

use serde::{Deserialize, Serialize};

use crate::backend::Backend;

/// Asynchronously constructs an instance of `Self` from a configuration type.
///
/// Used to build connected chains and registries from configuration files.
/// Construction may perform the bootstrap I/O a native client needs.
#[async_trait::async_trait]
pub trait FromConfig<TConfig>
where
    Self: Sized,
{
    async fn from_config(config: &TConfig) -> Result<Self, Box<dyn std::error::Error>>;
}

/// Identity of a chain: its name, backend kind and native gas token.
///
/// Immutable once built. Backend clients hold it behind an `Arc` and never
/// modify it. The native client handle lives next to it, not inside it,
/// because its type depends on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Chain name, e.g. `Ethereum`, `Base`, `Solana`. Part of every cache key.
    pub name: String,
    pub backend: Backend,
    /// Symbol of the native gas token, e.g. `ETH`.
    pub gas_token_name: String,
    /// Decimal precision of the native gas token.
    pub gas_token_decimal: u8,
    /// Display name of the native gas token, e.g. `Ether`.
    pub alias_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub is_testnet: bool,
}

impl ChainInfo {
    pub fn new(name: impl Into<String>, backend: Backend) -> Self {
        Self {
            name: name.into(),
            backend,
            gas_token_name: String::new(),
            gas_token_decimal: 0,
            alias_name: String::new(),
            explorer_url: None,
            is_testnet: false,
        }
    }

    pub fn with_gas_token(
        mut self,
        symbol: impl Into<String>,
        decimals: u8,
        alias: impl Into<String>,
    ) -> Self {
        self.gas_token_name = symbol.into();
        self.gas_token_decimal = decimals;
        self.alias_name = alias.into();
        self
    }

    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into());
        self
    }

    pub fn testnet(mut self, is_testnet: bool) -> Self {
        self.is_testnet = is_testnet;
        self
    }
}

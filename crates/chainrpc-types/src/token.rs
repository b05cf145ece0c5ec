//! Token metadata and the per-client token cache.

use alloy_primitives::U256;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::address::normalize_address;
use crate::chain::ChainInfo;

/// Resolved metadata for one fungible asset on one chain.
///
/// Amounts are in base units. `decimals` tells the caller how to scale them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub chain_name: String,
    /// On-chain address or identifier in the chain's own encoding.
    pub token_address: String,
    pub decimals: u8,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub total_supply: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TokenInfo {
    /// Pseudo-token describing the chain's native currency.
    ///
    /// Built from [`ChainInfo`] alone. The total supply is reported as zero.
    pub fn native(chain: &ChainInfo, address: &str) -> Self {
        Self {
            symbol: chain.gas_token_name.clone(),
            chain_name: chain.name.clone(),
            token_address: address.to_string(),
            decimals: chain.gas_token_decimal,
            full_name: chain.alias_name.clone(),
            icon: None,
            total_supply: U256::ZERO,
            url: chain.explorer_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TokenKey {
    chain: String,
    address: String,
}

impl TokenKey {
    fn new(chain: &str, address: &str) -> Self {
        Self {
            chain: chain.to_string(),
            address: normalize_address(address),
        }
    }
}

/// In-memory cache of resolved [`TokenInfo`], keyed by chain name and
/// normalized address.
///
/// Entries are written once and never evicted. Each backend client owns its
/// own manager. Reads run concurrently; writers lock one shard at a time.
///
/// Two callers missing the same key at the same time both resolve it and both
/// insert. The second insert overwrites the first with equal content.
#[derive(Debug, Default)]
pub struct TokenInfoManager {
    tokens: DashMap<TokenKey, TokenInfo>,
}

impl TokenInfoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata for `address` on `chain`, if it has been resolved.
    pub fn get(&self, chain: &str, address: &str) -> Option<TokenInfo> {
        self.tokens
            .get(&TokenKey::new(chain, address))
            .map(|entry| entry.value().clone())
    }

    /// First cached token on `chain` whose symbol matches, ignoring case.
    pub fn get_by_symbol(&self, chain: &str, symbol: &str) -> Option<TokenInfo> {
        self.tokens
            .iter()
            .find(|entry| entry.key().chain == chain && entry.symbol.eq_ignore_ascii_case(symbol))
            .map(|entry| entry.value().clone())
    }

    pub fn insert(&self, info: TokenInfo) {
        let key = TokenKey::new(&info.chain_name, &info.token_address);
        self.tokens.insert(key, info);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use std::sync::Arc;

    fn usdc() -> TokenInfo {
        TokenInfo {
            symbol: "USDC".into(),
            chain_name: "Base".into(),
            token_address: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".into(),
            decimals: 6,
            full_name: "USD Coin".into(),
            icon: None,
            total_supply: U256::from(1_000_000u64),
            url: None,
        }
    }

    #[test]
    fn test_lookup_ignores_hex_case() {
        let manager = TokenInfoManager::new();
        manager.insert(usdc());
        let hit = manager
            .get("Base", "0x833589FCD6EDB6E08F4C7C32D4F71B54BDA02913")
            .unwrap();
        assert_eq!(hit, usdc());
        assert!(manager.get("Ethereum", &usdc().token_address).is_none());
    }

    #[test]
    fn test_get_by_symbol() {
        let manager = TokenInfoManager::new();
        manager.insert(usdc());
        assert_eq!(manager.get_by_symbol("Base", "usdc"), Some(usdc()));
        assert_eq!(manager.get_by_symbol("Base", "USDT"), None);
    }

    #[test]
    fn test_repeated_insert_is_idempotent() {
        let manager = Arc::new(TokenInfoManager::new());
        let handles = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || manager.insert(usdc()))
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_native_entry_comes_from_chain_info() {
        let chain = ChainInfo::new("Ethereum", Backend::Ethereum)
            .with_gas_token("ETH", 18, "Ether")
            .with_explorer_url("https://etherscan.io");
        let native = TokenInfo::native(&chain, "0x0000000000000000000000000000000000000000");
        assert_eq!(native.symbol, "ETH");
        assert_eq!(native.decimals, 18);
        assert_eq!(native.full_name, "Ether");
        assert_eq!(native.total_supply, U256::ZERO);
        assert_eq!(native.url.as_deref(), Some("https://etherscan.io"));
    }
}

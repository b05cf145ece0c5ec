use alloy_primitives::U256;
use alloy_rpc_client::RpcClient;
use chainrpc_types::address::is_native_sentinel;
use chainrpc_types::jsonrpc::{NO_PARAMS, call};
use chainrpc_types::{
    Backend, ChainInfo, Rpc, RpcContext, RpcError, TokenInfo, TokenInfoManager, TxOutcome,
};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Coin type of the native SUI coin.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinMetadata {
    decimals: u8,
    name: String,
    symbol: String,
    #[serde(default)]
    icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Supply {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Balance {
    total_balance: String,
}

/// Parses the string-encoded integers Sui uses for amounts and sequence
/// numbers. Both decimal and `0x` hex forms are accepted.
fn parse_quantity(method: &'static str, value: &str) -> Result<U256, RpcError> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(value, 10),
    };
    parsed.map_err(|e| RpcError::decode(method, format!("invalid amount {value}: {e}")))
}

/// Coin type for `token`, mapping the native sentinel to SUI.
fn coin_type(token: &str) -> &str {
    let token = token.trim();
    if is_native_sentinel(token) {
        SUI_COIN_TYPE
    } else {
        token
    }
}

/// RPC client for Sui.
pub struct SuiRpc {
    chain: Arc<ChainInfo>,
    client: RpcClient,
    tokens: TokenInfoManager,
}

impl Debug for SuiRpc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiRpc")
            .field("chain", &self.chain.name)
            .field("cached_tokens", &self.tokens.len())
            .finish()
    }
}

impl SuiRpc {
    pub fn new(chain: Arc<ChainInfo>, client: RpcClient) -> Self {
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = %chain.name, backend = %Backend::Sui, "Using Sui rpc");
        Self {
            chain,
            client,
            tokens: TokenInfoManager::new(),
        }
    }

    pub fn token_cache(&self) -> &TokenInfoManager {
        &self.tokens
    }

    /// Sui addresses are `0x` followed by 64 hex digits.
    pub fn is_address_valid(&self, address: &str) -> bool {
        address
            .strip_prefix("0x")
            .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
    }
}

impl Rpc for SuiRpc {
    type Client<'a>
        = &'a RpcClient
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_> {
        &self.client
    }

    fn backend(&self) -> Backend {
        Backend::Sui
    }

    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    /// Sequence number of the latest executed checkpoint.
    async fn get_latest_block_number(&self, ctx: &RpcContext) -> Result<u64, RpcError> {
        const METHOD: &str = "sui_getLatestCheckpointSequenceNumber";
        let result = ctx
            .run(call::<_, String>(&self.client, METHOD, NO_PARAMS))
            .await
            .and_then(|sequence| {
                u64::try_from(parse_quantity(METHOD, &sequence)?)
                    .map_err(|e| RpcError::decode(METHOD, e))
            });
        #[cfg(feature = "telemetry")]
        {
            if let Err(error) = &result {
                tracing::error!(chain = %self.chain.name, %error, "Failed to fetch latest checkpoint");
            }
        }
        result
    }

    async fn is_tx_success(&self, _ctx: &RpcContext, _tx_hash: &str) -> Result<TxOutcome, RpcError> {
        Err(RpcError::not_implemented(Backend::Sui, "is_tx_success"))
    }

    async fn get_allowance(
        &self,
        _ctx: &RpcContext,
        _owner: &str,
        _token: &str,
        _spender: &str,
    ) -> Result<U256, RpcError> {
        Err(RpcError::not_implemented(Backend::Sui, "get_allowance"))
    }

    /// Sum of all coin objects of `token` owned by `owner`.
    async fn get_balance(&self, ctx: &RpcContext, owner: &str, token: &str) -> Result<U256, RpcError> {
        let owner = owner.trim();
        if !self.is_address_valid(owner) {
            return Err(RpcError::InvalidAddress(owner.to_string()));
        }
        let balance: Balance = ctx
            .run(call(&self.client, "suix_getBalance", (owner, coin_type(token))))
            .await?;
        parse_quantity("suix_getBalance", &balance.total_balance)
    }

    /// Full nodes serve no historical balances, so this reads the current
    /// balance.
    async fn get_balance_at_block_number(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        _block_number: u64,
    ) -> Result<U256, RpcError> {
        self.get_balance(ctx, owner, token).await
    }

    /// Coin metadata, then total supply. The API has no batch call, so these
    /// are two sequential requests on a cache miss.
    async fn get_token_info(&self, ctx: &RpcContext, token: &str) -> Result<TokenInfo, RpcError> {
        let token = token.trim();
        if is_native_sentinel(token) {
            return Ok(TokenInfo::native(&self.chain, token));
        }
        if let Some(info) = self.tokens.get(&self.chain.name, token) {
            return Ok(info);
        }
        #[cfg(feature = "telemetry")]
        tracing::debug!(chain = %self.chain.name, token, "Resolving coin metadata");
        let metadata: Option<CoinMetadata> = ctx
            .run(call(&self.client, "suix_getCoinMetadata", (token,)))
            .await?;
        let metadata = metadata.ok_or_else(|| RpcError::NotFound(token.to_string()))?;
        let supply: Supply = ctx
            .run(call(&self.client, "suix_getTotalSupply", (token,)))
            .await?;
        let info = TokenInfo {
            symbol: metadata.symbol,
            chain_name: self.chain.name.clone(),
            token_address: token.to_string(),
            decimals: metadata.decimals,
            full_name: metadata.name,
            icon: metadata.icon_url.filter(|url| !url.is_empty()),
            total_supply: parse_quantity("suix_getTotalSupply", &supply.value)?,
            url: None,
        };
        self.tokens.insert(info.clone());
        Ok(info)
    }
}

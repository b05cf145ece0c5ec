use alloy_primitives::{Address, U256};
use alloy_rpc_client::RpcClient;
use dashmap::DashSet;
use chainrpc_types::address::{is_native_sentinel, normalize_address};
use chainrpc_types::jsonrpc::{NO_PARAMS, call};
use chainrpc_types::{
    Backend, ChainInfo, Rpc, RpcContext, RpcError, TokenInfo, TokenInfoManager, TxOutcome,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct AccountInfo {
    committed: AccountState,
}

#[derive(Debug, Deserialize)]
struct AccountState {
    #[serde(default)]
    balances: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TxInfo {
    executed: bool,
    success: Option<bool>,
    block: Option<TxBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxBlock {
    block_number: u64,
}

#[derive(Debug, Deserialize)]
struct ListedToken {
    address: String,
    symbol: String,
    decimals: u8,
}

/// RPC client for zkSync Lite.
pub struct ZkSyncLiteRpc {
    chain: Arc<ChainInfo>,
    client: RpcClient,
    tokens: TokenInfoManager,
    /// Addresses absent from the token list after a reload.
    unlisted: DashSet<String>,
}

impl Debug for ZkSyncLiteRpc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZkSyncLiteRpc")
            .field("chain", &self.chain.name)
            .field("cached_tokens", &self.tokens.len())
            .finish()
    }
}

impl ZkSyncLiteRpc {
    pub fn new(chain: Arc<ChainInfo>, client: RpcClient) -> Self {
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = %chain.name, backend = %Backend::ZkSyncLite, "Using zkSync Lite rpc");
        Self {
            chain,
            client,
            tokens: TokenInfoManager::new(),
            unlisted: DashSet::new(),
        }
    }

    pub fn token_cache(&self) -> &TokenInfoManager {
        &self.tokens
    }

    /// Fetches the node's token list and caches every entry.
    async fn load_tokens(&self, ctx: &RpcContext) -> Result<(), RpcError> {
        let listed: HashMap<String, ListedToken> =
            ctx.run(call(&self.client, "tokens", NO_PARAMS)).await?;
        #[cfg(feature = "telemetry")]
        tracing::debug!(chain = %self.chain.name, tokens = listed.len(), "Loaded token list");
        for token in listed.into_values() {
            self.tokens.insert(TokenInfo {
                full_name: token.symbol.clone(),
                symbol: token.symbol,
                chain_name: self.chain.name.clone(),
                token_address: token.address,
                decimals: token.decimals,
                icon: None,
                total_supply: U256::ZERO,
                url: None,
            });
        }
        Ok(())
    }

    /// Symbol under which balances of `token` are reported.
    async fn token_symbol(&self, ctx: &RpcContext, token: &str) -> Result<String, RpcError> {
        if is_native_sentinel(token) {
            return Ok(self.chain.gas_token_name.clone());
        }
        Ok(self.get_token_info(ctx, token).await?.symbol)
    }
}

fn parse_address(value: &str) -> Result<Address, RpcError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| RpcError::InvalidAddress(value.to_string()))
}

impl Rpc for ZkSyncLiteRpc {
    type Client<'a>
        = &'a RpcClient
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_> {
        &self.client
    }

    fn backend(&self) -> Backend {
        Backend::ZkSyncLite
    }

    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    async fn get_latest_block_number(&self, _ctx: &RpcContext) -> Result<u64, RpcError> {
        Err(RpcError::not_implemented(Backend::ZkSyncLite, "get_latest_block_number"))
    }

    /// Accepts hashes with or without the `sync-tx:` prefix.
    async fn is_tx_success(&self, ctx: &RpcContext, tx_hash: &str) -> Result<TxOutcome, RpcError> {
        let trimmed = tx_hash.trim();
        let hash = trimmed
            .strip_prefix("0x")
            .map_or_else(|| trimmed.to_string(), |hex| format!("sync-tx:{hex}"));
        let info: TxInfo = ctx.run(call(&self.client, "tx_info", (hash,))).await?;
        let block = match info {
            TxInfo {
                executed: true,
                block: Some(block),
                ..
            } => block,
            _ => return Err(RpcError::ReceiptNotFound(tx_hash.to_string())),
        };
        Ok(TxOutcome {
            success: info.success.unwrap_or(false),
            block_number: block.block_number,
        })
    }

    async fn get_allowance(
        &self,
        _ctx: &RpcContext,
        _owner: &str,
        _token: &str,
        _spender: &str,
    ) -> Result<U256, RpcError> {
        Err(RpcError::not_implemented(Backend::ZkSyncLite, "get_allowance"))
    }

    /// Committed balance, which includes transactions not yet proven on L1.
    async fn get_balance(&self, ctx: &RpcContext, owner: &str, token: &str) -> Result<U256, RpcError> {
        let owner = parse_address(owner)?;
        let symbol = self.token_symbol(ctx, token).await?;
        let account: AccountInfo = ctx
            .run(call(&self.client, "account_info", (owner,)))
            .await?;
        match account.committed.balances.get(&symbol) {
            Some(balance) => U256::from_str_radix(balance, 10)
                .map_err(|e| RpcError::decode("account_info", format!("balance {balance}: {e}"))),
            None => Ok(U256::ZERO),
        }
    }

    /// Account state is only served at the latest committed block.
    async fn get_balance_at_block_number(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        _block_number: u64,
    ) -> Result<U256, RpcError> {
        self.get_balance(ctx, owner, token).await
    }

    /// Token metadata from the node's token list. The first miss for an
    /// address reloads the whole list; an address still missing after that
    /// is remembered and fails without further requests.
    async fn get_token_info(&self, ctx: &RpcContext, token: &str) -> Result<TokenInfo, RpcError> {
        let token = token.trim();
        if is_native_sentinel(token) {
            return Ok(TokenInfo::native(&self.chain, token));
        }
        if let Some(info) = self.tokens.get(&self.chain.name, token) {
            return Ok(info);
        }
        parse_address(token)?;
        let key = normalize_address(token);
        if self.unlisted.contains(&key) {
            return Err(RpcError::NotFound(token.to_string()));
        }
        self.load_tokens(ctx).await?;
        match self.tokens.get(&self.chain.name, token) {
            Some(info) => Ok(info),
            None => {
                self.unlisted.insert(key);
                Err(RpcError::NotFound(token.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainrpc_types::config::RpcConfig;
    use chainrpc_types::jsonrpc::rpc_client;
    use chainrpc_types::testing::{JsonRpcMock, received_methods};
    use serde_json::{Value, json};
    use wiremock::MockServer;

    const OWNER: &str = "0x2d5bd25efa0ab97aaca4e888c5fbcb4866904e46";
    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    fn chain() -> Arc<ChainInfo> {
        Arc::new(
            ChainInfo::new("zkSyncLite", Backend::ZkSyncLite).with_gas_token("ETH", 18, "Ether"),
        )
    }

    fn zkslite(server: &MockServer) -> ZkSyncLiteRpc {
        let config = RpcConfig::new(server.uri().parse().unwrap());
        ZkSyncLiteRpc::new(chain(), rpc_client("zkSyncLite", &[config]).unwrap())
    }

    fn node() -> JsonRpcMock {
        JsonRpcMock::new()
            .result(
                "tokens",
                json!({
                    "ETH": {
                        "address": "0x0000000000000000000000000000000000000000",
                        "id": 0,
                        "symbol": "ETH",
                        "decimals": 18
                    },
                    "USDC": {
                        "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                        "id": 2,
                        "symbol": "USDC",
                        "decimals": 6
                    }
                }),
            )
            .result(
                "account_info",
                json!({
                    "address": OWNER,
                    "id": 1234,
                    "depositing": { "balances": {} },
                    "committed": {
                        "balances": { "ETH": "3000000000000000000", "USDC": "2500000" },
                        "nonce": 7,
                        "pubKeyHash": "sync:0000000000000000000000000000000000000000"
                    },
                    "verified": { "balances": {}, "nonce": 6, "pubKeyHash": "sync:0000000000000000000000000000000000000000" }
                }),
            )
    }

    #[tokio::test]
    async fn test_token_list_cached_wholesale() {
        let server = node().start().await;
        let rpc = zkslite(&server);
        let ctx = RpcContext::background();
        let info = rpc.get_token_info(&ctx, USDC).await.unwrap();
        assert_eq!(info.symbol, "USDC");
        assert_eq!(info.decimals, 6);
        assert_eq!(info.total_supply, U256::ZERO);
        assert_eq!(rpc.token_cache().len(), 2);
        assert_eq!(rpc.get_token_info(&ctx, USDC).await.unwrap(), info);
        assert_eq!(received_methods(&server).await, vec!["tokens"]);
    }

    #[tokio::test]
    async fn test_unlisted_token_is_not_found() {
        let server = node().start().await;
        let rpc = zkslite(&server);
        let ctx = RpcContext::background();
        let dai = "0x6b175474e89094c44da98b954eedeac495271d0f";
        for token in [dai, dai, "0x6B175474E89094C44Da98b954EedeAC495271d0F"] {
            let err = rpc.get_token_info(&ctx, token).await.unwrap_err();
            assert!(matches!(err, RpcError::NotFound(_)));
        }
        assert_eq!(received_methods(&server).await, vec!["tokens"]);
    }

    #[tokio::test]
    async fn test_committed_balances_by_symbol() {
        let server = node().start().await;
        let rpc = zkslite(&server);
        let ctx = RpcContext::background();
        assert_eq!(
            rpc.get_balance(&ctx, OWNER, "").await.unwrap(),
            U256::from(3_000_000_000_000_000_000u64)
        );
        assert_eq!(rpc.get_balance(&ctx, OWNER, USDC).await.unwrap(), U256::from(2_500_000u64));
        assert_eq!(
            rpc.get_balance_at_block_number(&ctx, OWNER, USDC, 1).await.unwrap(),
            U256::from(2_500_000u64)
        );
        assert_eq!(
            received_methods(&server).await,
            vec!["account_info", "tokens", "account_info", "account_info"]
        );
    }

    #[tokio::test]
    async fn test_tx_outcome() {
        let server = JsonRpcMock::new()
            .on("tx_info", |params: &Value| {
                Ok(match params[0].as_str().unwrap_or_default() {
                    "sync-tx:01" => json!({
                        "executed": true,
                        "success": true,
                        "failReason": null,
                        "block": { "blockNumber": 180_000, "committed": true, "verified": true }
                    }),
                    "sync-tx:02" => json!({
                        "executed": true,
                        "success": false,
                        "failReason": "Not enough balance",
                        "block": { "blockNumber": 180_001, "committed": true, "verified": false }
                    }),
                    _ => json!({ "executed": false, "success": null, "failReason": null, "block": null }),
                })
            })
            .start()
            .await;
        let rpc = zkslite(&server);
        let ctx = RpcContext::background();
        assert_eq!(
            rpc.is_tx_success(&ctx, "0x01").await.unwrap(),
            TxOutcome { success: true, block_number: 180_000 }
        );
        assert_eq!(
            rpc.is_tx_success(&ctx, "sync-tx:02").await.unwrap(),
            TxOutcome { success: false, block_number: 180_001 }
        );
        let err = rpc.is_tx_success(&ctx, "0x03").await.unwrap_err();
        assert!(matches!(err, RpcError::ReceiptNotFound(_)));
    }

    #[tokio::test]
    async fn test_unsupported_operations() {
        let server = JsonRpcMock::new().start().await;
        let rpc = zkslite(&server);
        let ctx = RpcContext::background();
        assert!(rpc.get_latest_block_number(&ctx).await.unwrap_err().is_not_implemented());
        assert!(
            rpc.get_allowance(&ctx, OWNER, USDC, OWNER)
                .await
                .unwrap_err()
                .is_not_implemented()
        );
    }
}

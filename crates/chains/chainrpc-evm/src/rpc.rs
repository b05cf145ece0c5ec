use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, B256, U64, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{BlockId, BlockNumberOrTag, TransactionRequest};
use chainrpc_types::address::is_native_sentinel;
use chainrpc_types::jsonrpc::{call, map_transport_error};
use chainrpc_types::{
    Backend, ChainInfo, Rpc, RpcContext, RpcError, TokenInfo, TokenInfoManager, TxOutcome,
};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::erc20::{IERC20, erc20_transfer_data};
use crate::metadata::fetch_erc20_metadata;
use crate::networks::fixed_native_transfer_gas;

/// RPC client for an EVM-compatible chain.
///
/// Holds the raw JSON-RPC client (used for batches and for reads where the
/// alloy response types are stricter than some chains allow) and an alloy
/// [`RootProvider`] over the same transport.
pub struct EvmRpc {
    chain: Arc<ChainInfo>,
    client: RpcClient,
    provider: RootProvider,
    tokens: TokenInfoManager,
}

impl Debug for EvmRpc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmRpc")
            .field("chain", &self.chain.name)
            .field("cached_tokens", &self.tokens.len())
            .finish()
    }
}

/// Minimal receipt view. Only fields every EVM chain returns are read, so
/// chains with extended receipts (zkSync Era, Celo) decode too.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptView {
    status: Option<U64>,
    block_number: Option<U64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderView {
    base_fee_per_gas: Option<U256>,
}

pub(crate) fn parse_address(value: &str) -> Result<Address, RpcError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| RpcError::InvalidAddress(value.to_string()))
}

fn contract_error(method: &'static str, error: alloy_contract::Error) -> RpcError {
    match error {
        alloy_contract::Error::TransportError(e) => map_transport_error(method, e),
        other => RpcError::decode(method, other),
    }
}

impl EvmRpc {
    pub fn new(chain: Arc<ChainInfo>, client: RpcClient) -> Self {
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = %chain.name, backend = %Backend::Ethereum, "Using EVM rpc");
        let provider = RootProvider::new(client.clone());
        Self {
            chain,
            client,
            provider,
            tokens: TokenInfoManager::new(),
        }
    }

    pub fn provider(&self) -> &RootProvider {
        &self.provider
    }

    pub fn token_cache(&self) -> &TokenInfoManager {
        &self.tokens
    }

    pub fn is_address_valid(&self, address: &str) -> bool {
        parse_address(address).is_ok()
    }

    /// EIP-55 checksummed form of `address`.
    pub fn checksum_address(&self, address: &str) -> Result<String, RpcError> {
        Ok(parse_address(address)?.to_checksum(None))
    }

    /// Calldata for an ERC-20 `transfer(recipient, amount)`.
    pub fn get_erc20_transfer_data(&self, recipient: &str, amount: U256) -> Result<Vec<u8>, RpcError> {
        Ok(erc20_transfer_data(parse_address(recipient)?, amount).to_vec())
    }

    /// Gas limit for moving `amount` of `token` from `from` to `recipient`.
    ///
    /// Native transfers on chains with a fixed transfer cost return it
    /// without a network call.
    pub async fn estimate_gas(
        &self,
        ctx: &RpcContext,
        from: &str,
        recipient: &str,
        token: &str,
        amount: U256,
    ) -> Result<u64, RpcError> {
        let from = parse_address(from)?;
        let recipient = parse_address(recipient)?;
        let request = if is_native_sentinel(token) {
            if let Some(gas) = fixed_native_transfer_gas(&self.chain.name) {
                return Ok(gas);
            }
            TransactionRequest::default()
                .with_from(from)
                .with_to(recipient)
                .with_value(amount)
        } else {
            TransactionRequest::default()
                .with_from(from)
                .with_to(parse_address(token)?)
                .with_input(erc20_transfer_data(recipient, amount))
        };
        ctx.run(async {
            self.provider
                .estimate_gas(request)
                .await
                .map_err(|e| map_transport_error("eth_estimateGas", e))
        })
        .await
    }

    pub async fn suggest_gas_price(&self, ctx: &RpcContext) -> Result<U256, RpcError> {
        ctx.run(async {
            self.provider
                .get_gas_price()
                .await
                .map(U256::from)
                .map_err(|e| map_transport_error("eth_gasPrice", e))
        })
        .await
    }

    pub async fn suggest_gas_tip_cap(&self, ctx: &RpcContext) -> Result<U256, RpcError> {
        ctx.run(async {
            self.provider
                .get_max_priority_fee_per_gas()
                .await
                .map(U256::from)
                .map_err(|e| map_transport_error("eth_maxPriorityFeePerGas", e))
        })
        .await
    }

    /// Base fee of the latest block. `None` on chains without EIP-1559.
    pub async fn get_base_fee(&self, ctx: &RpcContext) -> Result<Option<U256>, RpcError> {
        let header = ctx
            .run(call::<_, Option<HeaderView>>(
                &self.client,
                "eth_getBlockByNumber",
                (BlockNumberOrTag::Latest, false),
            ))
            .await?
            .ok_or_else(|| RpcError::decode("eth_getBlockByNumber", "latest block is missing"))?;
        Ok(header.base_fee_per_gas)
    }

    async fn balance_at(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        block: BlockId,
    ) -> Result<U256, RpcError> {
        let owner = parse_address(owner)?;
        if is_native_sentinel(token) {
            return ctx
                .run(async {
                    self.provider
                        .get_balance(owner)
                        .block_id(block)
                        .await
                        .map_err(|e| map_transport_error("eth_getBalance", e))
                })
                .await;
        }
        let contract = IERC20::new(parse_address(token)?, self.provider.clone());
        ctx.run(async {
            contract
                .balanceOf(owner)
                .block(block)
                .call()
                .await
                .map_err(|e| contract_error("balanceOf", e))
        })
        .await
    }
}

impl Rpc for EvmRpc {
    type Client<'a>
        = &'a RootProvider
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_> {
        &self.provider
    }

    fn backend(&self) -> Backend {
        Backend::Ethereum
    }

    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    async fn get_latest_block_number(&self, ctx: &RpcContext) -> Result<u64, RpcError> {
        let result = ctx
            .run(async {
                self.provider
                    .get_block_number()
                    .await
                    .map_err(|e| map_transport_error("eth_blockNumber", e))
            })
            .await;
        #[cfg(feature = "telemetry")]
        {
            if let Err(error) = &result {
                tracing::error!(chain = %self.chain.name, %error, "Failed to fetch latest block number");
            }
        }
        result
    }

    async fn is_tx_success(&self, ctx: &RpcContext, tx_hash: &str) -> Result<TxOutcome, RpcError> {
        let hash = tx_hash
            .trim()
            .parse::<B256>()
            .map_err(|_| RpcError::InvalidInput(format!("invalid transaction hash {tx_hash}")))?;
        let receipt = ctx
            .run(call::<_, Option<ReceiptView>>(
                &self.client,
                "eth_getTransactionReceipt",
                (hash,),
            ))
            .await?;
        let Some(ReceiptView {
            status,
            block_number: Some(block_number),
        }) = receipt
        else {
            return Err(RpcError::ReceiptNotFound(tx_hash.to_string()));
        };
        Ok(TxOutcome {
            success: status == Some(U64::from(1)),
            block_number: block_number.to::<u64>(),
        })
    }

    async fn get_allowance(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        spender: &str,
    ) -> Result<U256, RpcError> {
        if is_native_sentinel(token) {
            return Err(RpcError::InvalidInput(
                "the native currency has no allowance".to_string(),
            ));
        }
        let owner = parse_address(owner)?;
        let spender = parse_address(spender)?;
        let contract = IERC20::new(parse_address(token)?, self.provider.clone());
        ctx.run(async {
            contract
                .allowance(owner, spender)
                .call()
                .await
                .map_err(|e| contract_error("allowance", e))
        })
        .await
    }

    async fn get_balance(&self, ctx: &RpcContext, owner: &str, token: &str) -> Result<U256, RpcError> {
        self.balance_at(ctx, owner, token, BlockId::latest()).await
    }

    async fn get_balance_at_block_number(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        block_number: u64,
    ) -> Result<U256, RpcError> {
        self.balance_at(ctx, owner, token, BlockId::number(block_number))
            .await
    }

    async fn get_token_info(&self, ctx: &RpcContext, token: &str) -> Result<TokenInfo, RpcError> {
        let token = token.trim();
        if is_native_sentinel(token) {
            return Ok(TokenInfo::native(&self.chain, token));
        }
        if let Some(info) = self.tokens.get(&self.chain.name, token) {
            return Ok(info);
        }
        let address = parse_address(token)?;
        #[cfg(feature = "telemetry")]
        tracing::debug!(chain = %self.chain.name, token, "Resolving token metadata");
        let metadata = ctx.run(fetch_erc20_metadata(&self.client, address)).await?;
        let decimals = u8::try_from(metadata.decimals).unwrap_or_default();
        if decimals == 0 || metadata.symbol.is_empty() {
            return Err(RpcError::NotFound(token.to_string()));
        }
        let info = TokenInfo {
            symbol: metadata.symbol,
            chain_name: self.chain.name.clone(),
            token_address: token.to_string(),
            decimals,
            full_name: metadata.name,
            icon: None,
            total_supply: metadata.total_supply,
            url: None,
        };
        self.tokens.insert(info.clone());
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolValue;
    use chainrpc_types::jsonrpc::rpc_client;
    use chainrpc_types::config::RpcConfig;
    use chainrpc_types::testing::{JsonRpcFault, JsonRpcMock, request_count};
    use serde_json::{Value, json};
    use std::time::Duration;
    use wiremock::MockServer;

    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    const HOLDER: &str = "0x000000000000000000000000000000000000dEaD";

    fn chain(name: &str) -> Arc<ChainInfo> {
        Arc::new(
            ChainInfo::new(name, Backend::Ethereum)
                .with_gas_token("ETH", 18, "Ether")
                .with_explorer_url("https://etherscan.io"),
        )
    }

    fn evm(server: &MockServer, name: &str) -> EvmRpc {
        let config = RpcConfig::new(server.uri().parse().unwrap());
        EvmRpc::new(chain(name), rpc_client(name, &[config]).unwrap())
    }

    fn hex_result(data: Vec<u8>) -> Value {
        json!(format!("0x{}", alloy_primitives::hex::encode(data)))
    }

    /// Answers ERC-20 metadata `eth_call`s by selector.
    fn erc20_node(symbol: &str, decimals: u8, name: &str, supply: u64) -> JsonRpcMock {
        let symbol = symbol.to_string();
        let name = name.to_string();
        JsonRpcMock::new().on("eth_call", move |params| {
            let input = params[0]
                .get("input")
                .or_else(|| params[0].get("data"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let data = match &input[..10.min(input.len())] {
                "0x95d89b41" => symbol.clone().abi_encode(),
                "0x313ce567" => U256::from(decimals).abi_encode(),
                "0x06fdde03" => name.clone().abi_encode(),
                "0x18160ddd" => U256::from(supply).abi_encode(),
                "0x70a08231" => U256::from(42u64).abi_encode(),
                "0xdd62ed3e" => U256::from(7u64).abi_encode(),
                other => return Err(JsonRpcFault::new(3, format!("unknown selector {other}"))),
            };
            Ok(hex_result(data))
        })
    }

    #[tokio::test]
    async fn test_native_token_info_without_network() {
        let server = JsonRpcMock::new().start().await;
        let rpc = evm(&server, "Ethereum");
        let ctx = RpcContext::background();
        let info = rpc
            .get_token_info(&ctx, "0x0000000000000000000000000000000000000000")
            .await
            .unwrap();
        assert_eq!(info.symbol, "ETH");
        assert_eq!(info.decimals, 18);
        assert_eq!(info.full_name, "Ether");
        assert_eq!(request_count(&server).await, 0);
        assert!(rpc.token_cache().is_empty());
    }

    #[tokio::test]
    async fn test_token_info_single_batch_then_cache() {
        let server = erc20_node("USDC", 6, "USD Coin", 1_000_000).start().await;
        let rpc = evm(&server, "Ethereum");
        let ctx = RpcContext::background();

        let first = rpc.get_token_info(&ctx, USDC).await.unwrap();
        assert_eq!(first.symbol, "USDC");
        assert_eq!(first.decimals, 6);
        assert_eq!(first.full_name, "USD Coin");
        assert_eq!(first.total_supply, U256::from(1_000_000u64));
        assert_eq!(request_count(&server).await, 1);

        let second = rpc
            .get_token_info(&ctx, &USDC.to_ascii_lowercase())
            .await
            .unwrap();
        assert_eq!(second.symbol, first.symbol);
        assert_eq!(second.decimals, first.decimals);
        assert_eq!(second.total_supply, first.total_supply);
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_token_without_decimals_is_not_found() {
        let server = erc20_node("BAD", 0, "Broken", 1).start().await;
        let rpc = evm(&server, "Ethereum");
        let err = rpc
            .get_token_info(&RpcContext::background(), USDC)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::NotFound(_)));
        assert!(rpc.token_cache().is_empty());
    }

    #[tokio::test]
    async fn test_non_contract_is_not_found() {
        let server = JsonRpcMock::new()
            .result("eth_call", json!("0x"))
            .start()
            .await;
        let rpc = evm(&server, "Ethereum");
        let err = rpc
            .get_token_info(&RpcContext::background(), HOLDER)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reverting_sub_call_names_the_method() {
        let server = JsonRpcMock::new()
            .fault("eth_call", 3, "execution reverted")
            .start()
            .await;
        let rpc = evm(&server, "Ethereum");
        let err = rpc
            .get_token_info(&RpcContext::background(), USDC)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Call { method: "symbol", .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_concurrent_first_resolutions_agree() {
        let server = erc20_node("USDC", 6, "USD Coin", 1_000_000).start().await;
        let rpc = Arc::new(evm(&server, "Ethereum"));
        let ctx = RpcContext::background();
        let (a, b) = tokio::join!(rpc.get_token_info(&ctx, USDC), rpc.get_token_info(&ctx, USDC));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(rpc.token_cache().len(), 1);
    }

    #[tokio::test]
    async fn test_native_balance_uses_get_balance() {
        let server = JsonRpcMock::new()
            .on("eth_getBalance", |params| {
                assert_eq!(params[1], json!("0x10"));
                Ok(json!("0xde0b6b3a7640000"))
            })
            .start()
            .await;
        let rpc = evm(&server, "Ethereum");
        let balance = rpc
            .get_balance_at_block_number(&RpcContext::background(), HOLDER, "", 16)
            .await
            .unwrap();
        assert_eq!(balance, U256::from(1_000_000_000_000_000_000u64));
    }

    #[tokio::test]
    async fn test_token_balance_and_allowance() {
        let server = erc20_node("USDC", 6, "USD Coin", 1).start().await;
        let rpc = evm(&server, "Ethereum");
        let ctx = RpcContext::background();
        assert_eq!(rpc.get_balance(&ctx, HOLDER, USDC).await.unwrap(), U256::from(42u64));
        assert_eq!(
            rpc.get_allowance(&ctx, HOLDER, USDC, HOLDER).await.unwrap(),
            U256::from(7u64)
        );
        let err = rpc
            .get_allowance(&ctx, HOLDER, "0x0000000000000000000000000000000000000000", HOLDER)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_tx_outcome() {
        let server = JsonRpcMock::new()
            .on("eth_getTransactionReceipt", |params| {
                let hash = params[0].as_str().unwrap_or_default();
                if hash.ends_with("01") {
                    Ok(json!({ "status": "0x1", "blockNumber": "0x2a", "type": "0x71" }))
                } else if hash.ends_with("02") {
                    Ok(json!({ "status": "0x0", "blockNumber": "0x2b" }))
                } else {
                    Ok(Value::Null)
                }
            })
            .start()
            .await;
        let rpc = evm(&server, "zkSync Era");
        let ctx = RpcContext::background();
        let ok_hash = format!("0x{}01", "00".repeat(31));
        let failed_hash = format!("0x{}02", "00".repeat(31));
        let missing_hash = format!("0x{}03", "00".repeat(31));
        assert_eq!(
            rpc.is_tx_success(&ctx, &ok_hash).await.unwrap(),
            TxOutcome { success: true, block_number: 42 }
        );
        assert_eq!(
            rpc.is_tx_success(&ctx, &failed_hash).await.unwrap(),
            TxOutcome { success: false, block_number: 43 }
        );
        assert!(matches!(
            rpc.is_tx_success(&ctx, &missing_hash).await,
            Err(RpcError::ReceiptNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_estimate_gas() {
        let server = JsonRpcMock::new()
            .on("eth_estimateGas", |params| {
                let input = params[0]
                    .get("input")
                    .or_else(|| params[0].get("data"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if input.starts_with("0xa9059cbb") {
                    Ok(json!("0xfde8"))
                } else {
                    Ok(json!("0x5209"))
                }
            })
            .start()
            .await;
        let ctx = RpcContext::background();

        let mainnet = evm(&server, "Ethereum");
        let gas = mainnet
            .estimate_gas(&ctx, HOLDER, HOLDER, "", U256::from(1u64))
            .await
            .unwrap();
        assert_eq!(gas, 21_000);
        assert_eq!(request_count(&server).await, 0);

        let arbitrum = evm(&server, "Arbitrum");
        let gas = arbitrum
            .estimate_gas(&ctx, HOLDER, HOLDER, "", U256::from(1u64))
            .await
            .unwrap();
        assert_eq!(gas, 0x5209);
        let gas = arbitrum
            .estimate_gas(&ctx, HOLDER, HOLDER, USDC, U256::from(1u64))
            .await
            .unwrap();
        assert_eq!(gas, 0xfde8);
    }

    #[tokio::test]
    async fn test_fee_pass_throughs() {
        let server = JsonRpcMock::new()
            .result("eth_gasPrice", json!("0x3b9aca00"))
            .result("eth_maxPriorityFeePerGas", json!("0x5f5e100"))
            .result("eth_getBlockByNumber", json!({ "number": "0x1", "baseFeePerGas": "0x7" }))
            .start()
            .await;
        let rpc = evm(&server, "Ethereum");
        let ctx = RpcContext::background();
        assert_eq!(rpc.suggest_gas_price(&ctx).await.unwrap(), U256::from(1_000_000_000u64));
        assert_eq!(rpc.suggest_gas_tip_cap(&ctx).await.unwrap(), U256::from(100_000_000u64));
        assert_eq!(rpc.get_base_fee(&ctx).await.unwrap(), Some(U256::from(7u64)));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_call() {
        let server = JsonRpcMock::new()
            .result("eth_blockNumber", json!("0x10"))
            .delay(Duration::from_secs(30))
            .start()
            .await;
        let rpc = evm(&server, "Ethereum");
        let ctx = RpcContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });
        let started = std::time::Instant::now();
        let result = rpc.get_latest_block_number(&ctx).await;
        assert!(matches!(result, Err(RpcError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_retryable() {
        let config = RpcConfig::new("http://127.0.0.1:9".parse().unwrap());
        let rpc = EvmRpc::new(chain("Ethereum"), rpc_client("Ethereum", &[config]).unwrap());
        let err = rpc
            .get_latest_block_number(&RpcContext::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "{err:?}");
    }

    #[test]
    fn test_address_helpers() {
        let rpc = EvmRpc::new(
            chain("Ethereum"),
            rpc_client("Ethereum", &[RpcConfig::new("http://127.0.0.1:8545".parse().unwrap())])
                .unwrap(),
        );
        assert!(rpc.is_address_valid(USDC));
        assert!(!rpc.is_address_valid("0x1234"));
        assert_eq!(
            rpc.checksum_address(&USDC.to_ascii_lowercase()).unwrap(),
            USDC
        );
        let data = rpc
            .get_erc20_transfer_data("0x0000000000000000000000000000000000000001", U256::from(1000u64))
            .unwrap();
        assert_eq!(data.len(), 68);
    }
}

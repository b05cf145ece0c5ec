use alloy_primitives::U256;
use alloy_rpc_client::RpcClient;
use chainrpc_types::address::is_native_sentinel;
use chainrpc_types::jsonrpc::{NO_PARAMS, call, error_code, map_transport_error};
use chainrpc_types::{
    Backend, ChainInfo, Rpc, RpcContext, RpcError, TokenInfo, TokenInfoManager, TxOutcome,
};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::felt::{decode_u256, felt_hex, parse_felt};
use crate::metadata::{BlockId, FunctionCall, call_error, fetch_token_metadata, parse_result};

/// ETH fee token, deployed at the same address on mainnet and Sepolia.
pub const ETH_FEE_TOKEN: &str = "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";
/// STRK fee token, deployed at the same address on mainnet and Sepolia.
pub const STRK_FEE_TOKEN: &str = "0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d";

/// `TXN_HASH_NOT_FOUND` in the Starknet JSON-RPC error table.
const TXN_HASH_NOT_FOUND: i64 = 29;

const EXECUTION_SUCCEEDED: &str = "SUCCEEDED";

#[derive(Debug, Deserialize)]
struct ReceiptView {
    execution_status: Option<String>,
    block_number: Option<u64>,
}

/// RPC client for Starknet.
///
/// The native currency is the chain's fee token, itself an ERC-20 contract,
/// so native balances and allowances go through the same calls as any token.
pub struct StarknetRpc {
    chain: Arc<ChainInfo>,
    client: RpcClient,
    tokens: TokenInfoManager,
}

impl Debug for StarknetRpc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarknetRpc")
            .field("chain", &self.chain.name)
            .field("cached_tokens", &self.tokens.len())
            .finish()
    }
}

impl StarknetRpc {
    pub fn new(chain: Arc<ChainInfo>, client: RpcClient) -> Self {
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = %chain.name, backend = %Backend::Starknet, "Using Starknet rpc");
        Self {
            chain,
            client,
            tokens: TokenInfoManager::new(),
        }
    }

    pub fn token_cache(&self) -> &TokenInfoManager {
        &self.tokens
    }

    pub fn is_address_valid(&self, address: &str) -> bool {
        address.trim().starts_with("0x") && parse_felt(address).is_ok()
    }

    /// Contract address of the fee token paid in the chain's gas token.
    pub fn fee_token(&self) -> &'static str {
        if self.chain.gas_token_name.eq_ignore_ascii_case("STRK") {
            STRK_FEE_TOKEN
        } else {
            ETH_FEE_TOKEN
        }
    }

    fn token_contract(&self, token: &str) -> Result<U256, RpcError> {
        if is_native_sentinel(token) {
            parse_felt(self.fee_token())
        } else {
            parse_felt(token)
        }
    }

    async fn call_contract(
        &self,
        ctx: &RpcContext,
        contract: U256,
        entry_point: &'static str,
        calldata: &[U256],
        block: BlockId,
    ) -> Result<Vec<U256>, RpcError> {
        let params = (FunctionCall::new(contract, entry_point, calldata), block);
        let felts: Vec<String> = ctx
            .run(async {
                self.client
                    .request::<_, Vec<String>>("starknet_call", params)
                    .await
                    .map_err(|e| call_error(entry_point, contract, e))
            })
            .await?;
        parse_result(entry_point, &felts)
    }

    async fn balance_at(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        block: BlockId,
    ) -> Result<U256, RpcError> {
        let owner = parse_felt(owner)?;
        let contract = self.token_contract(token)?;
        let felts = self
            .call_contract(ctx, contract, "balanceOf", &[owner], block)
            .await?;
        decode_u256("balanceOf", &felts)
    }
}

impl Rpc for StarknetRpc {
    type Client<'a>
        = &'a RpcClient
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_> {
        &self.client
    }

    fn backend(&self) -> Backend {
        Backend::Starknet
    }

    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    async fn get_latest_block_number(&self, ctx: &RpcContext) -> Result<u64, RpcError> {
        let result = ctx
            .run(call(&self.client, "starknet_blockNumber", NO_PARAMS))
            .await;
        #[cfg(feature = "telemetry")]
        {
            if let Err(error) = &result {
                tracing::error!(chain = %self.chain.name, %error, "Failed to fetch latest block number");
            }
        }
        result
    }

    /// Receipts without a block number belong to pre-confirmed transactions
    /// and are reported as not found.
    async fn is_tx_success(&self, ctx: &RpcContext, tx_hash: &str) -> Result<TxOutcome, RpcError> {
        let hash = parse_felt(tx_hash)
            .map_err(|_| RpcError::InvalidInput(format!("invalid transaction hash {tx_hash}")))?;
        let receipt: ReceiptView = ctx
            .run(async {
                self.client
                    .request::<_, ReceiptView>("starknet_getTransactionReceipt", (felt_hex(hash),))
                    .await
                    .map_err(|e| {
                        if error_code(&e) == Some(TXN_HASH_NOT_FOUND) {
                            RpcError::ReceiptNotFound(tx_hash.to_string())
                        } else {
                            map_transport_error("starknet_getTransactionReceipt", e)
                        }
                    })
            })
            .await?;
        let block_number = receipt
            .block_number
            .ok_or_else(|| RpcError::ReceiptNotFound(tx_hash.to_string()))?;
        Ok(TxOutcome {
            success: receipt.execution_status.as_deref() == Some(EXECUTION_SUCCEEDED),
            block_number,
        })
    }

    async fn get_allowance(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        spender: &str,
    ) -> Result<U256, RpcError> {
        let owner = parse_felt(owner)?;
        let spender = parse_felt(spender)?;
        let contract = self.token_contract(token)?;
        let felts = self
            .call_contract(ctx, contract, "allowance", &[owner, spender], BlockId::LATEST)
            .await?;
        decode_u256("allowance", &felts)
    }

    async fn get_balance(&self, ctx: &RpcContext, owner: &str, token: &str) -> Result<U256, RpcError> {
        self.balance_at(ctx, owner, token, BlockId::LATEST).await
    }

    async fn get_balance_at_block_number(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        block_number: u64,
    ) -> Result<U256, RpcError> {
        self.balance_at(ctx, owner, token, BlockId::Number { block_number })
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
        let contract = parse_felt(token)?;
        #[cfg(feature = "telemetry")]
        tracing::debug!(chain = %self.chain.name, token, "Resolving token metadata");
        let metadata = ctx
            .run(fetch_token_metadata(&self.client, contract))
            .await
            .map_err(|e| match e {
                RpcError::NotFound(_) => RpcError::NotFound(token.to_string()),
                other => other,
            })?;
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

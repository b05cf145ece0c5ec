use alloy_primitives::U256;
use alloy_rpc_client::RpcClient;
use chainrpc_types::address::is_native_sentinel;
use chainrpc_types::jsonrpc::{NO_PARAMS, call, error_code, map_transport_error};
use chainrpc_types::{Backend, ChainInfo, Rpc, RpcContext, RpcError, TokenInfo, TxOutcome};
use serde::Deserialize;
use std::sync::Arc;

use crate::amount::btc_to_sats;

/// `RPC_INVALID_ADDRESS_OR_KEY`, returned for unknown transactions.
const INVALID_ADDRESS_OR_KEY: i64 = -5;

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    blockhash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    height: u64,
}

#[derive(Debug, Deserialize)]
struct UtxoScan {
    success: bool,
    total_amount: f64,
}

/// RPC client for a bitcoind node.
///
/// Bitcoin has no tokens, so every token operation other than the native
/// currency fails as not implemented.
#[derive(Debug)]
pub struct BitcoinRpc {
    chain: Arc<ChainInfo>,
    client: RpcClient,
}

impl BitcoinRpc {
    pub fn new(chain: Arc<ChainInfo>, client: RpcClient) -> Self {
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = %chain.name, backend = %Backend::Bitcoin, "Using Bitcoin rpc");
        Self { chain, client }
    }

    /// Address as a `scantxoutset` descriptor.
    fn descriptor(owner: &str) -> Result<String, RpcError> {
        let owner = owner.trim();
        if owner.is_empty() || !owner.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(RpcError::InvalidAddress(owner.to_string()));
        }
        Ok(format!("addr({owner})"))
    }
}

impl Rpc for BitcoinRpc {
    type Client<'a>
        = &'a RpcClient
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_> {
        &self.client
    }

    fn backend(&self) -> Backend {
        Backend::Bitcoin
    }

    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    async fn get_latest_block_number(&self, ctx: &RpcContext) -> Result<u64, RpcError> {
        let result = ctx
            .run(call(&self.client, "getblockcount", NO_PARAMS))
            .await;
        #[cfg(feature = "telemetry")]
        {
            if let Err(error) = &result {
                tracing::error!(chain = %self.chain.name, %error, "Failed to fetch block count");
            }
        }
        result
    }

    /// A Bitcoin transaction either is in a block or is not; confirmed
    /// transactions always succeeded. Mempool transactions are reported as
    /// not found.
    async fn is_tx_success(&self, ctx: &RpcContext, tx_hash: &str) -> Result<TxOutcome, RpcError> {
        let txid = tx_hash.trim();
        let transaction: RawTransaction = ctx
            .run(async {
                self.client
                    .request::<_, RawTransaction>("getrawtransaction", (txid, true))
                    .await
                    .map_err(|e| {
                        if error_code(&e) == Some(INVALID_ADDRESS_OR_KEY) {
                            RpcError::ReceiptNotFound(tx_hash.to_string())
                        } else {
                            map_transport_error("getrawtransaction", e)
                        }
                    })
            })
            .await?;
        let block_hash = transaction
            .blockhash
            .ok_or_else(|| RpcError::ReceiptNotFound(tx_hash.to_string()))?;
        let header: BlockHeader = ctx
            .run(call(&self.client, "getblockheader", (block_hash,)))
            .await?;
        Ok(TxOutcome {
            success: true,
            block_number: header.height,
        })
    }

    async fn get_allowance(
        &self,
        _ctx: &RpcContext,
        _owner: &str,
        _token: &str,
        _spender: &str,
    ) -> Result<U256, RpcError> {
        Err(RpcError::not_implemented(Backend::Bitcoin, "get_allowance"))
    }

    /// Confirmed balance of `owner` in satoshis, summed over its UTXOs.
    async fn get_balance(&self, ctx: &RpcContext, owner: &str, token: &str) -> Result<U256, RpcError> {
        if !is_native_sentinel(token) {
            return Err(RpcError::not_implemented(Backend::Bitcoin, "get_balance"));
        }
        let descriptor = Self::descriptor(owner)?;
        let scan: UtxoScan = ctx
            .run(call(&self.client, "scantxoutset", ("start", [descriptor])))
            .await?;
        if !scan.success {
            return Err(RpcError::call("scantxoutset", "UTXO scan did not complete"));
        }
        btc_to_sats(scan.total_amount)
            .map(U256::from)
            .ok_or_else(|| {
                RpcError::decode("scantxoutset", format!("invalid amount {}", scan.total_amount))
            })
    }

    /// The UTXO set only reflects the chain tip, so this reads the current
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

    async fn get_token_info(&self, _ctx: &RpcContext, token: &str) -> Result<TokenInfo, RpcError> {
        let token = token.trim();
        if is_native_sentinel(token) {
            return Ok(TokenInfo::native(&self.chain, token));
        }
        Err(RpcError::not_implemented(Backend::Bitcoin, "get_token_info"))
    }
}

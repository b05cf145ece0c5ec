use alloy_primitives::U256;
use chainrpc_types::address::is_native_sentinel;
use chainrpc_types::{Backend, ChainInfo, Rpc, RpcContext, RpcError, TokenInfo, TxOutcome};
use std::sync::Arc;
use std::time::Duration;

use crate::client::{
    AccountStates, JettonMasters, JettonWallets, MasterchainInfo, TonClient, TonEndpoint,
    parse_amount,
};

/// Upper bound on the masterchain probe performed by [`TonRpc::connect`].
pub const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(5);

const ACTIVE_ACCOUNT: &str = "active";

/// RPC client for TON, backed by the toncenter v3 HTTP API.
///
/// Jetton metadata is not indexed by the API in a form this client trusts,
/// so [`Rpc::get_token_info`] reports the total supply only and is not cached.
#[derive(Debug, Clone)]
pub struct TonRpc {
    chain: Arc<ChainInfo>,
    client: TonClient,
}

impl TonRpc {
    /// Builds a client without touching the network.
    pub fn new(chain: Arc<ChainInfo>, client: TonClient) -> Self {
        Self { chain, client }
    }

    /// Builds a client and checks the endpoint serves the masterchain,
    /// giving up after [`BOOTSTRAP_TIMEOUT`].
    pub async fn connect(chain: Arc<ChainInfo>, endpoint: TonEndpoint) -> Result<Self, RpcError> {
        Self::connect_with_timeout(chain, endpoint, BOOTSTRAP_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        chain: Arc<ChainInfo>,
        endpoint: TonEndpoint,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let rpc = Self::new(chain, TonClient::new(endpoint));
        let probe = rpc.client.get::<MasterchainInfo>("masterchainInfo", &[]);
        tokio::time::timeout(timeout, probe)
            .await
            .map_err(|_| RpcError::DeadlineExceeded)??;
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = %rpc.chain.name, url = %rpc.client.endpoint().url, "Connected to TON API");
        Ok(rpc)
    }

    async fn native_balance(&self, ctx: &RpcContext, owner: &str) -> Result<U256, RpcError> {
        let states: AccountStates = ctx
            .run(self.client.get("accountStates", &[("address", owner)]))
            .await?;
        let Some(state) = states.accounts.into_iter().next() else {
            return Ok(U256::ZERO);
        };
        if state.status != ACTIVE_ACCOUNT {
            return Ok(U256::ZERO);
        }
        match state.balance {
            Some(balance) => parse_amount("accountStates", &balance),
            None => Ok(U256::ZERO),
        }
    }

    async fn jetton_balance(
        &self,
        ctx: &RpcContext,
        owner: &str,
        jetton: &str,
    ) -> Result<U256, RpcError> {
        let wallets: JettonWallets = ctx
            .run(self.client.get(
                "jetton/wallets",
                &[
                    ("owner_address", owner),
                    ("jetton_address", jetton),
                    ("limit", "1"),
                ],
            ))
            .await?;
        match wallets.jetton_wallets.into_iter().next() {
            Some(wallet) => parse_amount("jetton/wallets", &wallet.balance),
            None => Ok(U256::ZERO),
        }
    }
}

impl Rpc for TonRpc {
    type Client<'a>
        = &'a TonClient
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_> {
        &self.client
    }

    fn backend(&self) -> Backend {
        Backend::Ton
    }

    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    /// Seqno of the last masterchain block.
    async fn get_latest_block_number(&self, ctx: &RpcContext) -> Result<u64, RpcError> {
        let info: MasterchainInfo = ctx.run(self.client.get("masterchainInfo", &[])).await?;
        Ok(info.last.seqno)
    }

    async fn is_tx_success(&self, _ctx: &RpcContext, _tx_hash: &str) -> Result<TxOutcome, RpcError> {
        Err(RpcError::not_implemented(Backend::Ton, "is_tx_success"))
    }

    async fn get_allowance(
        &self,
        _ctx: &RpcContext,
        _owner: &str,
        _token: &str,
        _spender: &str,
    ) -> Result<U256, RpcError> {
        Err(RpcError::not_implemented(Backend::Ton, "get_allowance"))
    }

    /// Native balance in nanotons, or the owner's jetton wallet balance.
    /// Inactive accounts and missing wallets hold zero.
    async fn get_balance(&self, ctx: &RpcContext, owner: &str, token: &str) -> Result<U256, RpcError> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(RpcError::InvalidAddress(owner.to_string()));
        }
        if is_native_sentinel(token) {
            self.native_balance(ctx, owner).await
        } else {
            self.jetton_balance(ctx, owner, token.trim()).await
        }
    }

    /// The API serves current state only, so this reads the latest balance.
    async fn get_balance_at_block_number(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        _block_number: u64,
    ) -> Result<U256, RpcError> {
        self.get_balance(ctx, owner, token).await
    }

    async fn get_token_info(&self, ctx: &RpcContext, token: &str) -> Result<TokenInfo, RpcError> {
        let token = token.trim();
        if is_native_sentinel(token) {
            return Ok(TokenInfo::native(&self.chain, token));
        }
        let masters: JettonMasters = ctx
            .run(
                self.client
                    .get("jetton/masters", &[("address", token), ("limit", "1")]),
            )
            .await?;
        let master = masters
            .jetton_masters
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::NotFound(token.to_string()))?;
        Ok(TokenInfo {
            symbol: String::new(),
            chain_name: self.chain.name.clone(),
            token_address: token.to_string(),
            decimals: 0,
            full_name: String::new(),
            icon: None,
            total_supply: parse_amount("jetton/masters", &master.total_supply)?,
            url: None,
        })
    }
}

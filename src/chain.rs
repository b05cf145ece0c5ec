//! Backend dispatch.
//!
//! - [`ConnectedChain`] - A chain descriptor plus the native client built for it
//! - [`get_rpc`] - Picks and builds the backend client for a connected chain
//! - [`ChainRpc`] - Enum over every enabled backend client, itself an [`Rpc`]
//! - [`ChainRegistry`] - Backend clients for every configured chain, by name
//!
//! Backend crates are compiled in through `chain-*` features. A chain whose
//! backend is compiled out is rejected with [`RpcError::UnsupportedBackend`].

use alloy_primitives::U256;
use alloy_rpc_client::RpcClient;
use chainrpc_types::jsonrpc::rpc_client;
use chainrpc_types::{
    Backend, ChainInfo, FromConfig, Rpc, RpcContext, RpcError, TokenInfo, TxOutcome,
};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

#[cfg(feature = "chain-bitcoin")]
use chainrpc_bitcoin::BitcoinRpc;
#[cfg(feature = "chain-evm")]
use chainrpc_evm::EvmRpc;
#[cfg(feature = "chain-solana")]
use chainrpc_solana::SolanaRpc;
#[cfg(feature = "chain-starknet")]
use chainrpc_starknet::StarknetRpc;
#[cfg(feature = "chain-sui")]
use chainrpc_sui::SuiRpc;
#[cfg(feature = "chain-ton")]
use chainrpc_ton::{TonClient, TonEndpoint, TonRpc};
#[cfg(feature = "chain-zkslite")]
use chainrpc_zkslite::ZkSyncLiteRpc;
#[cfg(feature = "chain-solana")]
use solana_client::nonblocking::rpc_client::RpcClient as SolanaRpcClient;

use crate::config::{ChainConfig, ChainsConfig, ConfigError};

/// Whether the backend crate for `backend` is compiled in.
pub const fn is_backend_enabled(backend: Backend) -> bool {
    match backend {
        Backend::Ethereum => cfg!(feature = "chain-evm"),
        Backend::Starknet => cfg!(feature = "chain-starknet"),
        Backend::Solana => cfg!(feature = "chain-solana"),
        Backend::Bitcoin => cfg!(feature = "chain-bitcoin"),
        Backend::ZkSyncLite => cfg!(feature = "chain-zkslite"),
        Backend::Ton => cfg!(feature = "chain-ton"),
        Backend::Sui => cfg!(feature = "chain-sui"),
    }
}

/// Owned native client of a chain.
#[derive(Clone)]
pub enum NativeClient {
    /// Shared JSON-RPC transport (EVM, Sui, Starknet, Bitcoin, zkSync Lite).
    JsonRpc(RpcClient),
    #[cfg(feature = "chain-solana")]
    Solana(Arc<SolanaRpcClient>),
    #[cfg(feature = "chain-ton")]
    Ton(TonClient),
}

impl Debug for NativeClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeClient::JsonRpc(_) => f.write_str("NativeClient::JsonRpc"),
            #[cfg(feature = "chain-solana")]
            NativeClient::Solana(client) => f
                .debug_tuple("NativeClient::Solana")
                .field(&client.url())
                .finish(),
            #[cfg(feature = "chain-ton")]
            NativeClient::Ton(client) => f
                .debug_tuple("NativeClient::Ton")
                .field(&client.endpoint().url.as_str())
                .finish(),
        }
    }
}

/// Borrowed native client, returned by [`ChainRpc::client`] so callers can
/// reach backend-specific capabilities without downcasting.
#[derive(Clone, Copy)]
pub enum NativeClientRef<'a> {
    JsonRpc(&'a RpcClient),
    #[cfg(feature = "chain-evm")]
    Evm(&'a alloy_provider::RootProvider),
    #[cfg(feature = "chain-solana")]
    Solana(&'a SolanaRpcClient),
    #[cfg(feature = "chain-ton")]
    Ton(&'a TonClient),
}

/// A chain descriptor together with the native client built for it.
#[derive(Debug, Clone)]
pub struct ConnectedChain {
    pub info: Arc<ChainInfo>,
    pub client: NativeClient,
}

impl ConnectedChain {
    pub fn new(info: ChainInfo, client: NativeClient) -> Self {
        Self {
            info: Arc::new(info),
            client,
        }
    }

    /// Builds the native client for the chain called `name`.
    ///
    /// Only TON touches the network here: its client checks the endpoint
    /// answers before it is handed out.
    pub async fn connect(name: &str, config: &ChainConfig) -> Result<Self, ConfigError> {
        let info = config.chain_info(name);
        let connect_error = |source: RpcError| ConfigError::Connect {
            chain: name.to_string(),
            source,
        };
        if !is_backend_enabled(config.backend) {
            return Err(connect_error(RpcError::UnsupportedBackend(
                config.backend.to_string(),
            )));
        }
        let client = match config.backend {
            #[cfg(feature = "chain-solana")]
            Backend::Solana => {
                let endpoint = config
                    .rpc
                    .first()
                    .ok_or_else(|| ConfigError::NoRpc(name.to_string()))?;
                let url = endpoint.url();
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ConfigError::UnsupportedScheme {
                        chain: name.to_string(),
                        scheme: url.scheme().to_string(),
                    });
                }
                NativeClient::Solana(Arc::new(SolanaRpcClient::new(url.to_string())))
            }
            #[cfg(feature = "chain-ton")]
            Backend::Ton => {
                let endpoint = match config.rpc.first() {
                    Some(endpoint) => TonEndpoint::new(endpoint.url().clone()),
                    None => TonEndpoint::public(config.testnet).map_err(connect_error)?,
                };
                let endpoint = match config.api_key() {
                    Some(api_key) => endpoint.with_api_key(api_key),
                    None => endpoint,
                };
                let rpc = TonRpc::connect(Arc::new(info.clone()), endpoint)
                    .await
                    .map_err(connect_error)?;
                NativeClient::Ton(rpc.client().clone())
            }
            _ => {
                if config.rpc.is_empty() {
                    return Err(ConfigError::NoRpc(name.to_string()));
                }
                NativeClient::JsonRpc(rpc_client(name, &config.rpc).map_err(connect_error)?)
            }
        };
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = name, backend = %config.backend, "Connected chain");
        Ok(Self::new(info, client))
    }
}

/// Builds the backend client for `chain`.
///
/// Performs no I/O. Fails with [`RpcError::UnsupportedBackend`] when the
/// backend is compiled out and with [`RpcError::InvalidInput`] when the
/// native client does not fit the backend.
pub fn get_rpc(chain: &ConnectedChain) -> Result<ChainRpc, RpcError> {
    let backend = chain.info.backend;
    if !is_backend_enabled(backend) {
        return Err(RpcError::UnsupportedBackend(backend.to_string()));
    }
    #[allow(unused_variables)] // For when no chain features enabled
    let info = chain.info.clone();
    let rpc = match (backend, &chain.client) {
        #[cfg(feature = "chain-evm")]
        (Backend::Ethereum, NativeClient::JsonRpc(client)) => {
            ChainRpc::Evm(EvmRpc::new(info, client.clone()))
        }
        #[cfg(feature = "chain-starknet")]
        (Backend::Starknet, NativeClient::JsonRpc(client)) => {
            ChainRpc::Starknet(StarknetRpc::new(info, client.clone()))
        }
        #[cfg(feature = "chain-solana")]
        (Backend::Solana, NativeClient::Solana(client)) => {
            ChainRpc::Solana(SolanaRpc::new(info, client.clone()))
        }
        #[cfg(feature = "chain-bitcoin")]
        (Backend::Bitcoin, NativeClient::JsonRpc(client)) => {
            ChainRpc::Bitcoin(BitcoinRpc::new(info, client.clone()))
        }
        #[cfg(feature = "chain-zkslite")]
        (Backend::ZkSyncLite, NativeClient::JsonRpc(client)) => {
            ChainRpc::ZkSyncLite(ZkSyncLiteRpc::new(info, client.clone()))
        }
        #[cfg(feature = "chain-ton")]
        (Backend::Ton, NativeClient::Ton(client)) => ChainRpc::Ton(TonRpc::new(info, client.clone())),
        #[cfg(feature = "chain-sui")]
        (Backend::Sui, NativeClient::JsonRpc(client)) => {
            ChainRpc::Sui(SuiRpc::new(info, client.clone()))
        }
        (backend, client) => {
            return Err(RpcError::InvalidInput(format!(
                "{client:?} cannot serve a {backend} chain"
            )));
        }
    };
    Ok(rpc)
}

/// Backend client of any enabled kind.
#[derive(Debug)]
pub enum ChainRpc {
    #[cfg(feature = "chain-evm")]
    Evm(EvmRpc),
    #[cfg(feature = "chain-starknet")]
    Starknet(StarknetRpc),
    #[cfg(feature = "chain-solana")]
    Solana(SolanaRpc),
    #[cfg(feature = "chain-bitcoin")]
    Bitcoin(BitcoinRpc),
    #[cfg(feature = "chain-zkslite")]
    ZkSyncLite(ZkSyncLiteRpc),
    #[cfg(feature = "chain-ton")]
    Ton(TonRpc),
    #[cfg(feature = "chain-sui")]
    Sui(SuiRpc),
}

/// Runs `$body` with `$rpc` bound to the inner backend client.
macro_rules! with_backend {
    ($self:expr, $rpc:ident => $body:expr) => {
        match $self {
            #[cfg(feature = "chain-evm")]
            ChainRpc::Evm($rpc) => $body,
            #[cfg(feature = "chain-starknet")]
            ChainRpc::Starknet($rpc) => $body,
            #[cfg(feature = "chain-solana")]
            ChainRpc::Solana($rpc) => $body,
            #[cfg(feature = "chain-bitcoin")]
            ChainRpc::Bitcoin($rpc) => $body,
            #[cfg(feature = "chain-zkslite")]
            ChainRpc::ZkSyncLite($rpc) => $body,
            #[cfg(feature = "chain-ton")]
            ChainRpc::Ton($rpc) => $body,
            #[cfg(feature = "chain-sui")]
            ChainRpc::Sui($rpc) => $body,
            #[allow(unreachable_patterns)] // For when no chain features enabled
            _ => unreachable!("ChainRpc variant not enabled in this build"),
        }
    };
}

impl Rpc for ChainRpc {
    type Client<'a>
        = NativeClientRef<'a>
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_> {
        match self {
            #[cfg(feature = "chain-evm")]
            ChainRpc::Evm(rpc) => NativeClientRef::Evm(rpc.client()),
            #[cfg(feature = "chain-starknet")]
            ChainRpc::Starknet(rpc) => NativeClientRef::JsonRpc(rpc.client()),
            #[cfg(feature = "chain-solana")]
            ChainRpc::Solana(rpc) => NativeClientRef::Solana(rpc.client()),
            #[cfg(feature = "chain-bitcoin")]
            ChainRpc::Bitcoin(rpc) => NativeClientRef::JsonRpc(rpc.client()),
            #[cfg(feature = "chain-zkslite")]
            ChainRpc::ZkSyncLite(rpc) => NativeClientRef::JsonRpc(rpc.client()),
            #[cfg(feature = "chain-ton")]
            ChainRpc::Ton(rpc) => NativeClientRef::Ton(rpc.client()),
            #[cfg(feature = "chain-sui")]
            ChainRpc::Sui(rpc) => NativeClientRef::JsonRpc(rpc.client()),
            #[allow(unreachable_patterns)] // For when no chain features enabled
            _ => unreachable!("ChainRpc variant not enabled in this build"),
        }
    }

    fn backend(&self) -> Backend {
        with_backend!(self, rpc => rpc.backend())
    }

    fn chain(&self) -> &ChainInfo {
        with_backend!(self, rpc => rpc.chain())
    }

    async fn get_latest_block_number(&self, ctx: &RpcContext) -> Result<u64, RpcError> {
        with_backend!(self, rpc => rpc.get_latest_block_number(ctx).await)
    }

    async fn is_tx_success(&self, ctx: &RpcContext, tx_hash: &str) -> Result<TxOutcome, RpcError> {
        with_backend!(self, rpc => rpc.is_tx_success(ctx, tx_hash).await)
    }

    async fn get_allowance(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        spender: &str,
    ) -> Result<U256, RpcError> {
        with_backend!(self, rpc => rpc.get_allowance(ctx, owner, token, spender).await)
    }

    async fn get_balance(&self, ctx: &RpcContext, owner: &str, token: &str) -> Result<U256, RpcError> {
        with_backend!(self, rpc => rpc.get_balance(ctx, owner, token).await)
    }

    async fn get_balance_at_block_number(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        block_number: u64,
    ) -> Result<U256, RpcError> {
        with_backend!(self, rpc => {
            rpc.get_balance_at_block_number(ctx, owner, token, block_number).await
        })
    }

    async fn get_token_info(&self, ctx: &RpcContext, token: &str) -> Result<TokenInfo, RpcError> {
        with_backend!(self, rpc => rpc.get_token_info(ctx, token).await)
    }
}

/// Backend clients of every configured chain, by chain name.
#[derive(Debug, Default)]
pub struct ChainRegistry(HashMap<String, Arc<ChainRpc>>);

impl ChainRegistry {
    pub fn new(chains: HashMap<String, Arc<ChainRpc>>) -> Self {
        Self(chains)
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<ChainRpc>> {
        self.0.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[async_trait::async_trait]
impl FromConfig<ChainsConfig> for ChainRegistry {
    async fn from_config(config: &ChainsConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let mut chains = HashMap::new();
        for (name, chain_config) in config.iter() {
            let chain = ConnectedChain::connect(name, chain_config).await?;
            let rpc = get_rpc(&chain)?;
            chains.insert(name.clone(), Arc::new(rpc));
        }
        Ok(Self(chains))
    }
}

//! Uniform read-side RPC over heterogeneous blockchains.
//!
//! Every supported chain family implements the same [`Rpc`] contract: latest
//! block number, transaction outcome, token allowance and balance (optionally
//! at a past block), and token metadata. Callers hold a [`ChainRpc`] and never
//! care which backend answers.
//!
//! | Backend      | Crate               | Feature          |
//! |--------------|---------------------|------------------|
//! | Ethereum/EVM | `chainrpc-evm`      | `chain-evm`      |
//! | Starknet     | `chainrpc-starknet` | `chain-starknet` |
//! | Solana       | `chainrpc-solana`   | `chain-solana`   |
//! | Bitcoin      | `chainrpc-bitcoin`  | `chain-bitcoin`  |
//! | zkSync Lite  | `chainrpc-zkslite`  | `chain-zkslite`  |
//! | TON          | `chainrpc-ton`      | `chain-ton`      |
//! | Sui          | `chainrpc-sui`      | `chain-sui`      |
//!
//! All backends are enabled by default.
//!
//! # Modules
//!
//! - [`config`] - JSON chain configuration with environment variable resolution
//! - [`chain`] - Backend dispatch and the [`ChainRegistry`]
//! - `telemetry` - Local logging setup (feature `telemetry`)
//!
//! # Example
//!
//! ```no_run
//! use chainrpc::{ChainRegistry, ChainsConfig, FromConfig, Rpc, RpcContext};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ChainsConfig::load()?;
//! let registry = ChainRegistry::from_config(&config).await?;
//! if let Some(base) = registry.by_name("Base") {
//!     let height = base.get_latest_block_number(&RpcContext::background()).await?;
//!     println!("Base is at block {height}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use chain::{ChainRegistry, ChainRpc, ConnectedChain, NativeClient, NativeClientRef, get_rpc};
pub use chainrpc_types::{
    Backend, ChainInfo, FromConfig, Rpc, RpcContext, RpcError, TokenInfo, TokenInfoManager,
    TxOutcome,
};
pub use config::{ChainConfig, ChainsConfig, ConfigError};

#[cfg(feature = "chain-bitcoin")]
pub use chainrpc_bitcoin as bitcoin;
#[cfg(feature = "chain-evm")]
pub use chainrpc_evm as evm;
#[cfg(feature = "chain-solana")]
pub use chainrpc_solana as solana;
#[cfg(feature = "chain-starknet")]
pub use chainrpc_starknet as starknet;
#[cfg(feature = "chain-sui")]
pub use chainrpc_sui as sui;
#[cfg(feature = "chain-ton")]
pub use chainrpc_ton as ton;
#[cfg(feature = "chain-zkslite")]
pub use chainrpc_zkslite as zkslite;

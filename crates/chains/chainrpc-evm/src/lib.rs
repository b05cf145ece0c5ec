//! EVM backend for chainrpc.
//!
//! [`EvmRpc`] implements the [`Rpc`](chainrpc_types::Rpc) contract over an
//! alloy JSON-RPC client. On top of the contract it exposes the EVM-only
//! helpers: gas estimation, fee suggestions and ERC-20 transfer calldata.
//!
//! Token metadata for ERC-20 contracts is fetched with a single batched
//! request (`symbol`, `decimals`, `name`, `totalSupply`) and cached per
//! client.

pub mod erc20;
mod metadata;
pub mod networks;
mod rpc;

pub use erc20::erc20_transfer_data;
pub use rpc::EvmRpc;

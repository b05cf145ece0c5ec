//! Starknet backend for chainrpc.
//!
//! [`StarknetRpc`] reads ERC-20 state with `starknet_call`. Felts are carried
//! as [`U256`](alloy_primitives::U256) and `u256` return values are
//! reassembled from their `(low, high)` halves. Token metadata costs one
//! batched round trip, as on EVM chains.

pub mod felt;
mod metadata;
mod rpc;

pub use rpc::{ETH_FEE_TOKEN, STRK_FEE_TOKEN, StarknetRpc};

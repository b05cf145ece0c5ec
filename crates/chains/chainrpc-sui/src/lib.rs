//! Sui backend for chainrpc.
//!
//! [`SuiRpc`] speaks the Sui JSON-RPC API through the shared alloy
//! [`RpcClient`](alloy_rpc_client::RpcClient). Coins are identified by their
//! Move type tag, e.g. `0x2::sui::SUI`.

mod rpc;

pub use rpc::{SUI_COIN_TYPE, SuiRpc};

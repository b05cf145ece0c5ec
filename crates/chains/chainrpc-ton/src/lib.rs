//! TON backend for chainrpc.
//!
//! [`TonRpc`] talks to a toncenter v3 compatible HTTP API through
//! [`TonClient`]. Construction performs a bootstrap request and fails after
//! [`BOOTSTRAP_TIMEOUT`] if the endpoint does not answer.
//!
//! TON has no transaction receipts or allowances in the sense of the
//! [`Rpc`](chainrpc_types::Rpc) contract; those methods return
//! [`RpcError::NotImplemented`](chainrpc_types::RpcError::NotImplemented).
//! Token metadata is limited to the jetton's total supply.

mod client;
mod rpc;

pub use client::{TonClient, TonEndpoint};
pub use rpc::{BOOTSTRAP_TIMEOUT, TonRpc};

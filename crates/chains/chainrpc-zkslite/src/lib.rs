//! zkSync Lite backend for chainrpc.
//!
//! zkSync Lite identifies tokens by symbol in balances. [`ZkSyncLiteRpc`]
//! maps addresses to symbols through the node's token list, which it caches
//! as a whole.

mod rpc;

pub use rpc::ZkSyncLiteRpc;

//! Solana backend for chainrpc.
//!
//! [`SolanaRpc`] implements the [`Rpc`](chainrpc_types::Rpc) contract over the
//! nonblocking `solana-client` RPC client. SPL tokens owned by both the Token
//! and Token-2022 programs are supported.
//!
//! Token metadata comes from two accounts fetched in one `getMultipleAccounts`
//! call: the mint (decimals, supply) and its Metaplex metadata account (name,
//! symbol). Token-2022 mints without a Metaplex account fall back to the
//! mint's own metadata extension.

mod metadata;
mod rpc;
pub mod types;

pub use rpc::SolanaRpc;

//! Bitcoin backend for chainrpc.
//!
//! [`BitcoinRpc`] talks to a bitcoind node. Transaction lookups need the node
//! to run with `-txindex`; balances use `scantxoutset`, which walks the UTXO
//! set and can take several seconds on mainnet.

mod amount;
mod rpc;

pub use amount::{SATS_PER_BTC, btc_to_sats};
pub use rpc::BitcoinRpc;

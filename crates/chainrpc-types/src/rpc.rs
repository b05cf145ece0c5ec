//! The uniform RPC contract.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::backend::Backend;
use crate::chain::ChainInfo;
use crate::context::RpcContext;
use crate::error::RpcError;
use crate::token::TokenInfo;

/// Finality outcome of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub success: bool,
    /// Height of the block (or slot, checkpoint) that included the transaction.
    pub block_number: u64,
}

/// Read-side operations every backend client implements.
///
/// All amounts are in the asset's smallest unit; callers apply
/// [`TokenInfo::decimals`] themselves. Token and owner addresses are strings
/// in the chain's own encoding. A token equal to the chain's native sentinel
/// (see [`crate::address`]) refers to the native currency.
///
/// Every network-bound method honours `ctx`: if it is cancelled or its
/// deadline passes, the in-flight request is dropped and
/// [`RpcError::Cancelled`] or [`RpcError::DeadlineExceeded`] is returned.
///
/// Methods a backend has no primitive for fail with
/// [`RpcError::NotImplemented`].
pub trait Rpc: Send + Sync {
    /// Borrowed handle to the native client, for callers that need
    /// backend-specific capabilities.
    type Client<'a>
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_>;

    fn backend(&self) -> Backend;

    fn chain(&self) -> &ChainInfo;

    /// Current chain height (block number, slot, seqno or checkpoint).
    fn get_latest_block_number(
        &self,
        ctx: &RpcContext,
    ) -> impl Future<Output = Result<u64, RpcError>> + Send;

    fn is_tx_success(
        &self,
        ctx: &RpcContext,
        tx_hash: &str,
    ) -> impl Future<Output = Result<TxOutcome, RpcError>> + Send;

    /// Amount `spender` may transfer out of `owner`'s balance of `token`.
    fn get_allowance(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        spender: &str,
    ) -> impl Future<Output = Result<U256, RpcError>> + Send;

    fn get_balance(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
    ) -> impl Future<Output = Result<U256, RpcError>> + Send;

    fn get_balance_at_block_number(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        block_number: u64,
    ) -> impl Future<Output = Result<U256, RpcError>> + Send;

    fn get_token_info(
        &self,
        ctx: &RpcContext,
        token: &str,
    ) -> impl Future<Output = Result<TokenInfo, RpcError>> + Send;
}

use alloy_primitives::U256;
use chainrpc_types::address::is_native_sentinel;
use chainrpc_types::{
    Backend, ChainInfo, Rpc, RpcContext, RpcError, TokenInfo, TokenInfoManager, TxOutcome,
};
use solana_account::Account;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use spl_token::solana_program::program_pack::Pack;
use spl_token_2022_interface::extension::StateWithExtensions;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use crate::metadata::{TokenLabels, parse_metaplex, parse_token_2022_metadata};
use crate::types::{METADATA_PROGRAM_PUBKEY, associated_token_address, metadata_address};

/// RPC client for Solana.
pub struct SolanaRpc {
    chain: Arc<ChainInfo>,
    rpc_client: Arc<RpcClient>,
    tokens: TokenInfoManager,
}

impl Debug for SolanaRpc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpc")
            .field("chain", &self.chain.name)
            .field("rpc_url", &self.rpc_client.url())
            .finish()
    }
}

/// Fields of an SPL token account, from either token program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TokenAccountView {
    amount: u64,
    delegate: Option<Pubkey>,
    delegated_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MintView {
    decimals: u8,
    supply: u64,
}

fn client_error(method: &'static str, error: ClientError) -> RpcError {
    match error.kind() {
        ClientErrorKind::RpcError(_) => RpcError::call(method, error),
        ClientErrorKind::SerdeJson(_) => RpcError::decode(method, error),
        _ => RpcError::transport(error),
    }
}

fn parse_pubkey(value: &str) -> Result<Pubkey, RpcError> {
    Pubkey::from_str(value.trim()).map_err(|_| RpcError::InvalidAddress(value.to_string()))
}

/// Decodes a token account. Accounts not owned by a token program yield
/// `None`.
fn unpack_token_account(account: &Account) -> Option<TokenAccountView> {
    if account.owner == spl_token::id() {
        let state = spl_token::state::Account::unpack(&account.data).ok()?;
        Some(TokenAccountView {
            amount: state.amount,
            delegate: Option::from(state.delegate),
            delegated_amount: state.delegated_amount,
        })
    } else if account.owner == spl_token_2022_interface::id() {
        let state =
            StateWithExtensions::<spl_token_2022_interface::state::Account>::unpack(&account.data)
                .ok()?
                .base;
        Some(TokenAccountView {
            amount: state.amount,
            delegate: Option::from(state.delegate),
            delegated_amount: state.delegated_amount,
        })
    } else {
        None
    }
}

fn unpack_mint(account: &Account) -> Option<MintView> {
    if account.owner == spl_token::id() {
        let mint = spl_token::state::Mint::unpack(&account.data).ok()?;
        Some(MintView {
            decimals: mint.decimals,
            supply: mint.supply,
        })
    } else if account.owner == spl_token_2022_interface::id() {
        let mint =
            StateWithExtensions::<spl_token_2022_interface::state::Mint>::unpack(&account.data)
                .ok()?
                .base;
        Some(MintView {
            decimals: mint.decimals,
            supply: mint.supply,
        })
    } else {
        None
    }
}

fn token_labels(mint: &Account, metadata: Option<&Account>) -> Option<TokenLabels> {
    metadata
        .filter(|account| account.owner == METADATA_PROGRAM_PUBKEY)
        .and_then(|account| parse_metaplex(&account.data))
        .or_else(|| parse_token_2022_metadata(mint))
}

impl SolanaRpc {
    pub fn new(chain: Arc<ChainInfo>, rpc_client: Arc<RpcClient>) -> Self {
        #[cfg(feature = "telemetry")]
        tracing::info!(chain = %chain.name, rpc = %rpc_client.url(), "Using Solana rpc");
        Self {
            chain,
            rpc_client,
            tokens: TokenInfoManager::new(),
        }
    }

    pub fn rpc_client(&self) -> Arc<RpcClient> {
        Arc::clone(&self.rpc_client)
    }

    pub fn token_cache(&self) -> &TokenInfoManager {
        &self.tokens
    }

    pub fn is_address_valid(&self, address: &str) -> bool {
        parse_pubkey(address).is_ok()
    }

    /// Token accounts of `owner` for `mint`: the associated token account
    /// under each token program. Missing accounts are skipped.
    async fn token_accounts(
        &self,
        ctx: &RpcContext,
        owner: &str,
        mint: &str,
    ) -> Result<Vec<TokenAccountView>, RpcError> {
        let owner = parse_pubkey(owner)?;
        let mint = parse_pubkey(mint)?;
        let candidates = [
            associated_token_address(&owner, &mint, &spl_token::id()),
            associated_token_address(&owner, &mint, &spl_token_2022_interface::id()),
        ];
        let accounts = ctx
            .run(async {
                self.rpc_client
                    .get_multiple_accounts(&candidates)
                    .await
                    .map_err(|e| client_error("getMultipleAccounts", e))
            })
            .await?;
        Ok(accounts
            .iter()
            .flatten()
            .filter_map(unpack_token_account)
            .collect())
    }
}

impl Rpc for SolanaRpc {
    type Client<'a>
        = &'a RpcClient
    where
        Self: 'a;

    fn client(&self) -> Self::Client<'_> {
        &self.rpc_client
    }

    fn backend(&self) -> Backend {
        Backend::Solana
    }

    fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    async fn get_latest_block_number(&self, ctx: &RpcContext) -> Result<u64, RpcError> {
        let result = ctx
            .run(async {
                self.rpc_client
                    .get_slot()
                    .await
                    .map_err(|e| client_error("getSlot", e))
            })
            .await;
        #[cfg(feature = "telemetry")]
        {
            if let Err(error) = &result {
                tracing::error!(chain = %self.chain.name, %error, "Failed to fetch latest slot");
            }
        }
        result
    }

    async fn is_tx_success(&self, ctx: &RpcContext, tx_hash: &str) -> Result<TxOutcome, RpcError> {
        let signature = Signature::from_str(tx_hash.trim())
            .map_err(|_| RpcError::InvalidInput(format!("invalid signature {tx_hash}")))?;
        let statuses = ctx
            .run(async {
                self.rpc_client
                    .get_signature_statuses_with_history(&[signature])
                    .await
                    .map_err(|e| client_error("getSignatureStatuses", e))
            })
            .await?;
        let status = statuses
            .value
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| RpcError::ReceiptNotFound(tx_hash.to_string()))?;
        Ok(TxOutcome {
            success: status.err.is_none(),
            block_number: status.slot,
        })
    }

    /// Amount delegated to `spender` by `owner`'s token accounts for `token`.
    async fn get_allowance(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        spender: &str,
    ) -> Result<U256, RpcError> {
        if is_native_sentinel(token) {
            return Err(RpcError::InvalidInput(
                "the native currency has no allowance".to_string(),
            ));
        }
        let spender = parse_pubkey(spender)?;
        let accounts = self.token_accounts(ctx, owner, token).await?;
        Ok(accounts
            .iter()
            .filter(|account| account.delegate == Some(spender))
            .fold(U256::ZERO, |total, account| {
                total + U256::from(account.delegated_amount)
            }))
    }

    async fn get_balance(&self, ctx: &RpcContext, owner: &str, token: &str) -> Result<U256, RpcError> {
        if is_native_sentinel(token) {
            let owner = parse_pubkey(owner)?;
            let lamports = ctx
                .run(async {
                    self.rpc_client
                        .get_balance(&owner)
                        .await
                        .map_err(|e| client_error("getBalance", e))
                })
                .await?;
            return Ok(U256::from(lamports));
        }
        let accounts = self.token_accounts(ctx, owner, token).await?;
        Ok(accounts
            .iter()
            .fold(U256::ZERO, |total, account| total + U256::from(account.amount)))
    }

    /// Solana RPC nodes serve no historical account state, so this reads the
    /// current balance.
    async fn get_balance_at_block_number(
        &self,
        ctx: &RpcContext,
        owner: &str,
        token: &str,
        _block_number: u64,
    ) -> Result<U256, RpcError> {
        self.get_balance(ctx, owner, token).await
    }

    async fn get_token_info(&self, ctx: &RpcContext, token: &str) -> Result<TokenInfo, RpcError> {
        let token = token.trim();
        if is_native_sentinel(token) {
            return Ok(TokenInfo::native(&self.chain, token));
        }
        if let Some(info) = self.tokens.get(&self.chain.name, token) {
            return Ok(info);
        }
        let mint = parse_pubkey(token)?;
        let accounts = ctx
            .run(async {
                self.rpc_client
                    .get_multiple_accounts(&[mint, metadata_address(&mint)])
                    .await
                    .map_err(|e| client_error("getMultipleAccounts", e))
            })
            .await?;
        let mut accounts = accounts.into_iter();
        let not_found = || RpcError::NotFound(token.to_string());
        let mint_account = accounts.next().flatten().ok_or_else(not_found)?;
        let metadata_account = accounts.next().flatten();
        let mint_state = unpack_mint(&mint_account).ok_or_else(not_found)?;
        let labels = token_labels(&mint_account, metadata_account.as_ref())
            .filter(|labels| !labels.symbol.is_empty())
            .ok_or_else(not_found)?;
        let info = TokenInfo {
            symbol: labels.symbol,
            chain_name: self.chain.name.clone(),
            token_address: token.to_string(),
            decimals: mint_state.decimals,
            full_name: labels.name,
            icon: (!labels.uri.is_empty()).then_some(labels.uri),
            total_supply: U256::from(mint_state.supply),
            url: None,
        };
        self.tokens.insert(info.clone());
        Ok(info)
    }
}

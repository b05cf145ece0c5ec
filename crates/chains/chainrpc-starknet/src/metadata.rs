//! `starknet_call` plumbing and batched token metadata.

use alloy_primitives::U256;
use alloy_rpc_client::RpcClient;
use alloy_transport::TransportError;
use chainrpc_types::RpcError;
use chainrpc_types::jsonrpc::{error_code, map_transport_error};
use serde::Serialize;

use crate::felt::{decode_text, decode_u256, felt_hex, selector};

/// `CONTRACT_NOT_FOUND` in the Starknet JSON-RPC error table.
pub(crate) const CONTRACT_NOT_FOUND: i64 = 20;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FunctionCall {
    contract_address: String,
    entry_point_selector: String,
    calldata: Vec<String>,
}

impl FunctionCall {
    pub fn new(contract: U256, entry_point: &str, calldata: &[U256]) -> Self {
        Self {
            contract_address: felt_hex(contract),
            entry_point_selector: felt_hex(selector(entry_point)),
            calldata: calldata.iter().copied().map(felt_hex).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub(crate) enum BlockId {
    Tag(&'static str),
    Number { block_number: u64 },
}

impl BlockId {
    pub const LATEST: BlockId = BlockId::Tag("latest");
}

/// Maps a failed call of `method` on `contract`. A missing contract is a
/// missing token.
pub(crate) fn call_error(method: &'static str, contract: U256, error: TransportError) -> RpcError {
    if error_code(&error) == Some(CONTRACT_NOT_FOUND) {
        RpcError::NotFound(felt_hex(contract))
    } else {
        map_transport_error(method, error)
    }
}

pub(crate) fn parse_result(method: &'static str, felts: &[String]) -> Result<Vec<U256>, RpcError> {
    felts
        .iter()
        .map(|felt| {
            felt.parse::<U256>()
                .map_err(|e| RpcError::decode(method, format!("invalid felt {felt}: {e}")))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: U256,
    pub total_supply: U256,
}

/// Reads `name`, `symbol`, `decimals` and `totalSupply` in one batch.
pub(crate) async fn fetch_token_metadata(
    client: &RpcClient,
    token: U256,
) -> Result<TokenMetadata, RpcError> {
    let mut batch = client.new_batch();
    let [name, symbol, decimals, total_supply] =
        ["name", "symbol", "decimals", "totalSupply"].map(|entry_point| {
            let params = (FunctionCall::new(token, entry_point, &[]), BlockId::LATEST);
            batch
                .add_call::<_, Vec<String>>("starknet_call", &params)
                .map_err(|e| map_transport_error("starknet_call", e))
        });
    let (name, symbol, decimals, total_supply) = (name?, symbol?, decimals?, total_supply?);

    batch
        .send()
        .await
        .map_err(|e| map_transport_error("starknet_call", e))?;

    let name = name.await.map_err(|e| call_error("name", token, e))?;
    let symbol = symbol.await.map_err(|e| call_error("symbol", token, e))?;
    let decimals = decimals.await.map_err(|e| call_error("decimals", token, e))?;
    let total_supply = total_supply
        .await
        .map_err(|e| call_error("totalSupply", token, e))?;

    Ok(TokenMetadata {
        name: decode_text("name", &parse_result("name", &name)?)?,
        symbol: decode_text("symbol", &parse_result("symbol", &symbol)?)?,
        decimals: decode_u256("decimals", &parse_result("decimals", &decimals)?)?,
        total_supply: decode_u256("totalSupply", &parse_result("totalSupply", &total_supply)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_call_wire_form() {
        let call = FunctionCall::new(U256::from(0x49du32), "balanceOf", &[U256::from(1u8)]);
        let params = serde_json::to_value((call, BlockId::LATEST)).unwrap();
        assert_eq!(
            params,
            json!([
                {
                    "contract_address": "0x49d",
                    "entry_point_selector": "0x2e4263afad30923c891518314c3c95dbe830a16874e8abc5777a9a20b54c76e",
                    "calldata": ["0x1"]
                },
                "latest"
            ])
        );
        let at = serde_json::to_value(BlockId::Number { block_number: 7 }).unwrap();
        assert_eq!(at, json!({ "block_number": 7 }));
    }

    #[test]
    fn test_result_felts_must_parse() {
        let err = parse_result("symbol", &["0xnothex".to_string()]).unwrap_err();
        assert!(matches!(err, RpcError::Decode { method: "symbol", .. }));
    }
}

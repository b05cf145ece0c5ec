//! Batched ERC-20 metadata resolution.
//!
//! `symbol`, `decimals`, `name` and `totalSupply` are independent read-only
//! calls. They go out as one JSON-RPC batch of four `eth_call`s against the
//! latest block, so resolving a token costs one HTTP round trip.

use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{BlockNumberOrTag, TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, SolValue};
use chainrpc_types::RpcError;
use chainrpc_types::jsonrpc::map_transport_error;

use crate::erc20::IERC20;

/// Undecorated answers to the four metadata calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Erc20Metadata {
    pub symbol: String,
    pub decimals: U256,
    pub name: String,
    pub total_supply: U256,
}

fn eth_call_params(token: Address, calldata: Vec<u8>) -> (TransactionRequest, BlockNumberOrTag) {
    let request = TransactionRequest {
        to: Some(TxKind::Call(token)),
        input: TransactionInput::both(Bytes::from(calldata)),
        ..Default::default()
    };
    (request, BlockNumberOrTag::Latest)
}

pub(crate) async fn fetch_erc20_metadata(
    client: &RpcClient,
    token: Address,
) -> Result<Erc20Metadata, RpcError> {
    let calls = [
        IERC20::symbolCall {}.abi_encode(),
        IERC20::decimalsCall {}.abi_encode(),
        IERC20::nameCall {}.abi_encode(),
        IERC20::totalSupplyCall {}.abi_encode(),
    ];
    let mut batch = client.new_batch();
    let [symbol, decimals, name, total_supply] = calls.map(|calldata| {
        batch.add_call::<_, Bytes>("eth_call", &eth_call_params(token, calldata))
    });
    let symbol = symbol.map_err(|e| map_transport_error("symbol", e))?;
    let decimals = decimals.map_err(|e| map_transport_error("decimals", e))?;
    let name = name.map_err(|e| map_transport_error("name", e))?;
    let total_supply = total_supply.map_err(|e| map_transport_error("totalSupply", e))?;

    batch
        .send()
        .await
        .map_err(|e| map_transport_error("eth_call", e))?;

    let symbol = symbol.await.map_err(|e| map_transport_error("symbol", e))?;
    let decimals = decimals
        .await
        .map_err(|e| map_transport_error("decimals", e))?;
    let name = name.await.map_err(|e| map_transport_error("name", e))?;
    let total_supply = total_supply
        .await
        .map_err(|e| map_transport_error("totalSupply", e))?;

    Ok(Erc20Metadata {
        symbol: decode_text("symbol", &symbol)?,
        decimals: decode_uint("decimals", &decimals)?,
        name: decode_text("name", &name)?,
        total_supply: decode_uint("totalSupply", &total_supply)?,
    })
}

/// Decodes a `string` return value.
///
/// Older tokens (MKR, SAI) return `bytes32` instead, which is accepted with
/// trailing NULs stripped. Empty return data decodes to the empty string.
pub(crate) fn decode_text(method: &'static str, data: &[u8]) -> Result<String, RpcError> {
    if data.is_empty() {
        return Ok(String::new());
    }
    match String::abi_decode(data) {
        Ok(text) => Ok(text),
        Err(_) if data.len() == 32 => {
            let end = data.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
            String::from_utf8(data[..end].to_vec()).map_err(|e| RpcError::decode(method, e))
        }
        Err(e) => Err(RpcError::decode(method, e)),
    }
}

/// Decodes a `uint*` return value. Empty return data decodes to zero.
pub(crate) fn decode_uint(method: &'static str, data: &[u8]) -> Result<U256, RpcError> {
    if data.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::abi_decode(data).map_err(|e| RpcError::decode(method, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_string_and_bytes32_symbols() {
        let encoded = "USDC".to_string().abi_encode();
        assert_eq!(decode_text("symbol", &encoded).unwrap(), "USDC");

        let mut mkr = [0u8; 32];
        mkr[..3].copy_from_slice(b"MKR");
        assert_eq!(decode_text("symbol", &mkr).unwrap(), "MKR");

        assert_eq!(decode_text("symbol", &[]).unwrap(), "");
    }

    #[test]
    fn test_decode_garbage_names_the_method() {
        let err = decode_text("name", &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, RpcError::Decode { method: "name", .. }));
        let err = decode_uint("decimals", &[0xff; 7]).unwrap_err();
        assert!(matches!(err, RpcError::Decode { method: "decimals", .. }));
    }

    #[test]
    fn test_decode_uint() {
        let encoded = U256::from(18u8).abi_encode();
        assert_eq!(decode_uint("decimals", &encoded).unwrap(), U256::from(18u8));
        assert_eq!(decode_uint("decimals", &[]).unwrap(), U256::ZERO);
    }
}

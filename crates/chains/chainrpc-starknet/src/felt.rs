//! Field element helpers.
//!
//! Felts are below 2^252, so a [`U256`] holds any of them. On the wire they
//! are `0x`-prefixed hex strings.

use alloy_primitives::{U256, keccak256};
use chainrpc_types::RpcError;

/// Bytes a full `ByteArray` word carries.
const BYTES_PER_WORD: usize = 31;

/// Entry point selector of `name`: its keccak-256 truncated to 250 bits.
pub fn selector(name: &str) -> U256 {
    let hash = U256::from_be_bytes(keccak256(name.as_bytes()).0);
    hash & ((U256::from(1u8) << 250) - U256::from(1u8))
}

/// Parses a felt from its hex (or decimal) wire form.
pub fn parse_felt(value: &str) -> Result<U256, RpcError> {
    let value = value.trim();
    value
        .parse::<U256>()
        .map_err(|_| RpcError::InvalidAddress(value.to_string()))
}

/// Wire form of a felt.
pub fn felt_hex(value: U256) -> String {
    format!("{value:#x}")
}

/// Reassembles a Cairo `u256` from its `(low, high)` felts.
///
/// A single felt is accepted for tokens that return a bare `felt252`.
pub fn decode_u256(method: &'static str, felts: &[U256]) -> Result<U256, RpcError> {
    match felts {
        [] => Ok(U256::ZERO),
        [value] => Ok(*value),
        [low, high, ..] => {
            let limit = U256::from(1u8) << 128;
            if *low >= limit || *high >= limit {
                return Err(RpcError::decode(method, "u256 half exceeds 128 bits"));
            }
            Ok(*low | (*high << 128))
        }
    }
}

/// Decodes a token label, which is either a Cairo 0 short string (one felt)
/// or a Cairo 1 `ByteArray` (`[n, word_0..word_n, pending, pending_len]`).
pub fn decode_text(method: &'static str, felts: &[U256]) -> Result<String, RpcError> {
    let bytes = match felts {
        [] => return Ok(String::new()),
        [short] => {
            let word = short.to_be_bytes::<32>();
            let start = word.iter().position(|b| *b != 0).unwrap_or(word.len());
            word[start..].to_vec()
        }
        [count, rest @ ..] => {
            let count = usize::try_from(*count)
                .map_err(|_| RpcError::decode(method, "ByteArray length overflows"))?;
            if rest.len().checked_sub(2) != Some(count) {
                return Err(RpcError::decode(
                    method,
                    format!("ByteArray of {count} words has {} felts", felts.len()),
                ));
            }
            let pending_len = usize::try_from(rest[count + 1])
                .ok()
                .filter(|len| *len < BYTES_PER_WORD)
                .ok_or_else(|| RpcError::decode(method, "ByteArray pending length out of range"))?;
            let mut bytes = Vec::with_capacity(count * BYTES_PER_WORD + pending_len);
            for word in &rest[..count] {
                bytes.extend_from_slice(&word.to_be_bytes::<32>()[32 - BYTES_PER_WORD..]);
            }
            bytes.extend_from_slice(&rest[count].to_be_bytes::<32>()[32 - pending_len..]);
            bytes
        }
    };
    String::from_utf8(bytes).map_err(|e| RpcError::decode(method, e))
}

//! Native-currency sentinels and address normalization.
//!
//! Callers pass token addresses as strings in the chain's own encoding. A
//! reserved value means "the native currency" instead of a token contract:
//!
//! - hex-encoded chains (EVM, Starknet, Sui, zkSync Lite): the empty string or
//!   any all-zero hex string, e.g. `0x0000000000000000000000000000000000000000`
//! - Solana: the empty string or the system program id
//!   [`SOLANA_NATIVE_SENTINEL`]
//! - TON and Bitcoin: the empty string (or an all-zero hex string)

/// The Solana system program id, used as the native SOL marker.
pub const SOLANA_NATIVE_SENTINEL: &str = "11111111111111111111111111111111";

/// Returns `true` if `value` is empty or a hex string made only of zeros,
/// with or without a `0x` prefix.
pub fn is_zero_hex(value: &str) -> bool {
    let value = value.trim();
    let digits = strip_hex_prefix(value);
    digits.bytes().all(|b| b == b'0')
}

/// Returns `true` if `token` designates the native currency.
pub fn is_native_sentinel(token: &str) -> bool {
    let token = token.trim();
    is_zero_hex(token) || token == SOLANA_NATIVE_SENTINEL
}

/// Key form of an address for cache lookups.
///
/// Hex addresses compare case-insensitively, so they are lowercased. Other
/// encodings (base58, Move type tags, TON user-friendly form) are case
/// sensitive and only trimmed.
pub fn normalize_address(address: &str) -> String {
    let address = address.trim();
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            format!("0x{}", digits.to_ascii_lowercase())
        }
        _ => address.to_string(),
    }
}

pub(crate) fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hex_forms() {
        assert!(is_zero_hex(""));
        assert!(is_zero_hex("0x"));
        assert!(is_zero_hex("0x0000000000000000000000000000000000000000"));
        assert!(is_zero_hex(" 0X00 "));
        assert!(!is_zero_hex("0x0000000000000000000000000000000000000001"));
    }

    #[test]
    fn test_native_sentinel() {
        assert!(is_native_sentinel(SOLANA_NATIVE_SENTINEL));
        assert!(is_native_sentinel("0x0"));
        assert!(!is_native_sentinel("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"));
    }

    #[test]
    fn test_normalize_hex_only() {
        assert_eq!(
            normalize_address(" 0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
        );
        assert_eq!(
            normalize_address("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
        );
        assert_eq!(normalize_address("0x2::sui::SUI"), "0x2::sui::SUI");
    }
}

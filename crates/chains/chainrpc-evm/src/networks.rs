//! Per-chain gas overrides.

/// Gas used by a plain native-currency transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

/// Chains whose estimator always answers [`NATIVE_TRANSFER_GAS`] for a
/// native transfer to an externally owned account. Matched by chain name,
/// ignoring case.
pub const FIXED_NATIVE_TRANSFER_GAS_CHAINS: &[&str] = &[
    "Scroll", "Ethereum", "Optimism", "Base", "Manta", "Linea", "BEVM", "BEVM2", "Taiko",
    "AILayer",
];

/// Fixed gas limit for a native transfer on `chain_name`, if it has one.
pub fn fixed_native_transfer_gas(chain_name: &str) -> Option<u64> {
    FIXED_NATIVE_TRANSFER_GAS_CHAINS
        .iter()
        .any(|name| name.eq_ignore_ascii_case(chain_name))
        .then_some(NATIVE_TRANSFER_GAS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert_eq!(fixed_native_transfer_gas("ethereum"), Some(21_000));
        assert_eq!(fixed_native_transfer_gas("Base"), Some(21_000));
        assert_eq!(fixed_native_transfer_gas("Arbitrum"), None);
    }
}

use alloy_primitives::{Address, Bytes, U256, keccak256};
use alloy_sol_types::sol;

sol!(
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
);

/// Canonical signature hashed into the `transfer` selector.
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// Calldata for `transfer(recipient, amount)`.
///
/// Layout: 4-byte selector (first bytes of `keccak256(TRANSFER_SIGNATURE)`),
/// the recipient left-padded to 32 bytes, then the amount as a 32-byte
/// big-endian word. Always 68 bytes.
pub fn erc20_transfer_data(recipient: Address, amount: U256) -> Bytes {
    let selector = &keccak256(TRANSFER_SIGNATURE.as_bytes())[..4];
    let mut data = Vec::with_capacity(4 + 32 + 32);
    data.extend_from_slice(selector);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(recipient.as_slice());
    data.extend_from_slice(&amount.to_be_bytes::<32>());
    Bytes::from(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};
    use alloy_sol_types::SolCall;

    #[test]
    fn test_transfer_data_layout() {
        let recipient = address!("0x0000000000000000000000000000000000000001");
        let data = erc20_transfer_data(recipient, U256::from(1000u64));
        assert_eq!(data.len(), 68);
        assert_eq!(&data[..4], hex!("a9059cbb"));
        let mut expected_recipient = [0u8; 32];
        expected_recipient[31] = 1;
        assert_eq!(&data[4..36], &expected_recipient);
        let mut expected_amount = [0u8; 32];
        expected_amount[30] = 0x03;
        expected_amount[31] = 0xe8;
        assert_eq!(&data[36..68], &expected_amount);
    }

    #[test]
    fn test_transfer_data_matches_abi_encoder() {
        let recipient = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
        let amount = U256::from(123_456_789u64);
        let encoded = IERC20::transferCall {
            to: recipient,
            amount,
        }
        .abi_encode();
        assert_eq!(erc20_transfer_data(recipient, amount).as_ref(), encoded.as_slice());
    }
}

//! Token labels (name, symbol, uri) from on-chain metadata.
//!
//! Two sources exist: the Metaplex metadata account derived from the mint,
//! and the metadata extension stored inside a Token-2022 mint. Metaplex pads
//! its strings with NULs to a fixed width.

use borsh::BorshDeserialize;
use solana_account::Account;
use spl_token_2022_interface::extension::{BaseStateWithExtensions, StateWithExtensions};
use spl_token_2022_interface::state::Mint;
use spl_token_metadata_interface::state::TokenMetadata;

/// Human-readable labels of a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenLabels {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

impl TokenLabels {
    fn new(name: &str, symbol: &str, uri: &str) -> Self {
        let clean = |value: &str| value.trim_end_matches('\0').trim().to_string();
        Self {
            name: clean(name),
            symbol: clean(symbol),
            uri: clean(uri),
        }
    }
}

/// `Key::MetadataV1` discriminator of a Metaplex metadata account.
const METAPLEX_METADATA_V1: u8 = 4;

/// Leading fields of a Metaplex `Metadata` account. The rest of the account
/// (creators, collection, uses) is not read.
#[derive(Debug, BorshDeserialize)]
#[cfg_attr(test, derive(borsh::BorshSerialize))]
pub(crate) struct MetaplexMetadata {
    pub key: u8,
    pub update_authority: [u8; 32],
    pub mint: [u8; 32],
    pub data: MetaplexData,
}

#[derive(Debug, BorshDeserialize)]
#[cfg_attr(test, derive(borsh::BorshSerialize))]
pub(crate) struct MetaplexData {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
}

/// Labels from a Metaplex metadata account.
pub(crate) fn parse_metaplex(data: &[u8]) -> Option<TokenLabels> {
    let mut cursor = data;
    let metadata = MetaplexMetadata::deserialize(&mut cursor).ok()?;
    if metadata.key != METAPLEX_METADATA_V1 {
        return None;
    }
    let data = metadata.data;
    Some(TokenLabels::new(&data.name, &data.symbol, &data.uri))
}

/// Labels from the metadata extension of a Token-2022 mint.
pub(crate) fn parse_token_2022_metadata(mint: &Account) -> Option<TokenLabels> {
    if mint.owner != spl_token_2022_interface::id() {
        return None;
    }
    let state = StateWithExtensions::<Mint>::unpack(&mint.data).ok()?;
    let metadata = state.get_variable_len_extension::<TokenMetadata>().ok()?;
    Some(TokenLabels::new(&metadata.name, &metadata.symbol, &metadata.uri))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use solana_pubkey::Pubkey;
    use spl_token::solana_program::program_option::COption;
    use spl_token::solana_program::program_pack::Pack;
    use spl_token_2022_interface::extension::{AccountType, ExtensionType};

    fn padded(value: &str, width: usize) -> String {
        let mut padded = value.to_string();
        padded.extend(std::iter::repeat_n('\0', width.saturating_sub(value.len())));
        padded
    }

    pub(crate) fn metaplex_account(name: &str, symbol: &str) -> Vec<u8> {
        let metadata = MetaplexMetadata {
            key: METAPLEX_METADATA_V1,
            update_authority: [7u8; 32],
            mint: [8u8; 32],
            data: MetaplexData {
                name: padded(name, 32),
                symbol: padded(symbol, 10),
                uri: padded("https://example.org/meta.json", 200),
                seller_fee_basis_points: 0,
            },
        };
        let mut data = borsh::to_vec(&metadata).unwrap();
        // creators, collection and the rest of the account
        data.extend([0u8; 16]);
        data
    }

    /// A Token-2022 mint carrying a metadata extension.
    pub(crate) fn token_2022_mint(decimals: u8, supply: u64, name: &str, symbol: &str) -> Vec<u8> {
        let mint = Mint {
            mint_authority: COption::None,
            supply,
            decimals,
            is_initialized: true,
            freeze_authority: COption::None,
        };
        let mut data = vec![0u8; spl_token_2022_interface::state::Account::LEN];
        Mint::pack(mint, &mut data[..Mint::LEN]).unwrap();
        data.push(AccountType::Mint as u8);
        let metadata = TokenMetadata {
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: String::new(),
            ..Default::default()
        };
        let value = borsh::to_vec(&metadata).unwrap();
        data.extend((ExtensionType::TokenMetadata as u16).to_le_bytes());
        data.extend((value.len() as u16).to_le_bytes());
        data.extend(value);
        data
    }

    fn account(owner: Pubkey, data: Vec<u8>) -> Account {
        Account {
            lamports: 1_461_600,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        }
    }

    #[test]
    fn test_metaplex_labels_strip_padding() {
        let labels = parse_metaplex(&metaplex_account("USD Coin", "USDC")).unwrap();
        assert_eq!(labels.name, "USD Coin");
        assert_eq!(labels.symbol, "USDC");
        assert_eq!(labels.uri, "https://example.org/meta.json");
    }

    #[test]
    fn test_metaplex_rejects_other_accounts() {
        let mut data = metaplex_account("USD Coin", "USDC");
        data[0] = 6;
        assert!(parse_metaplex(&data).is_none());
        assert!(parse_metaplex(&[METAPLEX_METADATA_V1, 1, 2]).is_none());
    }

    #[test]
    fn test_token_2022_metadata_extension() {
        let data = token_2022_mint(6, 1_000, "PayPal USD", "PYUSD");
        let mint = account(spl_token_2022_interface::id(), data);
        let labels = parse_token_2022_metadata(&mint).unwrap();
        assert_eq!(labels.symbol, "PYUSD");
        assert_eq!(labels.name, "PayPal USD");
        assert_eq!(labels.uri, "");
    }

    #[test]
    fn test_plain_mint_has_no_extension() {
        let data = vec![0u8; Mint::LEN];
        assert!(parse_token_2022_metadata(&account(spl_token_2022_interface::id(), data)).is_none());
        let data = token_2022_mint(6, 1_000, "PayPal USD", "PYUSD");
        assert!(parse_token_2022_metadata(&account(spl_token::id(), data)).is_none());
    }
}

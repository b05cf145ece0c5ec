use solana_pubkey::{Pubkey, pubkey};

/// Associated Token Account program.
pub const ATA_PROGRAM_PUBKEY: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Metaplex Token Metadata program.
pub const METADATA_PROGRAM_PUBKEY: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// The associated token account of `owner` for `mint` under `token_program`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    let (ata, _) = Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ATA_PROGRAM_PUBKEY,
    );
    ata
}

/// The Metaplex metadata account of `mint`.
pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    let (pda, _) = Pubkey::find_program_address(
        &[b"metadata", METADATA_PROGRAM_PUBKEY.as_ref(), mint.as_ref()],
        &METADATA_PROGRAM_PUBKEY,
    );
    pda
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usdc_associated_token_address() {
        let owner = pubkey!("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        let mint = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
        let ata = associated_token_address(&owner, &mint, &spl_token::id());
        let again = associated_token_address(&owner, &mint, &spl_token::id());
        assert_eq!(ata, again);
        assert_ne!(ata, associated_token_address(&owner, &mint, &spl_token_2022_interface::id()));
    }
}

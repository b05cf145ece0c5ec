use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

pub const SATS_PER_BTC: u64 = 100_000_000;

/// Converts a BTC amount as bitcoind reports it (a JSON float with at most
/// eight decimals) into satoshis. Negative or non-finite amounts yield `None`.
pub fn btc_to_sats(btc: f64) -> Option<u64> {
    let btc = Decimal::from_f64(btc)?;
    if btc.is_sign_negative() {
        return None;
    }
    (btc * Decimal::from(SATS_PER_BTC)).round().to_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btc_to_sats() {
        assert_eq!(btc_to_sats(0.0), Some(0));
        assert_eq!(btc_to_sats(1.0), Some(SATS_PER_BTC));
        assert_eq!(btc_to_sats(0.1), Some(10_000_000));
        assert_eq!(btc_to_sats(0.00000001), Some(1));
        assert_eq!(btc_to_sats(21.5), Some(2_150_000_000));
    }

    #[test]
    fn test_rejects_unrepresentable_amounts() {
        assert_eq!(btc_to_sats(-0.5), None);
        assert_eq!(btc_to_sats(f64::NAN), None);
    }
}

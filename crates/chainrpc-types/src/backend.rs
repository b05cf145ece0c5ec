//! Backend kinds.
//!
//! A [`Backend`] names the execution/RPC model of a chain. It is the dispatch
//! key used to pick a backend client and a discriminant callers may log or
//! branch on. Each kind has a stable integer code:
//!
//! | Backend       | Code | Config name    |
//! |---------------|------|----------------|
//! | Ethereum      | 1    | `ethereum`     |
//! | Starknet      | 2    | `starknet`     |
//! | Solana        | 3    | `solana`       |
//! | Bitcoin       | 4    | `bitcoin`      |
//! | zkSync Lite   | 5    | `zksync-lite`  |
//! | TON           | 6    | `ton`          |
//! | Sui           | 9    | `sui`          |

use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

use crate::error::RpcError;

/// The closed set of supported backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
#[repr(i32)]
pub enum Backend {
    /// Ethereum-compatible (EVM) chains.
    Ethereum = 1,
    Starknet = 2,
    Solana = 3,
    Bitcoin = 4,
    /// zkSync Lite (the original zkSync rollup, not zkSync Era).
    ZkSyncLite = 5,
    Ton = 6,
    Sui = 9,
}

impl Backend {
    pub const ALL: [Backend; 7] = [
        Backend::Ethereum,
        Backend::Starknet,
        Backend::Solana,
        Backend::Bitcoin,
        Backend::ZkSyncLite,
        Backend::Ton,
        Backend::Sui,
    ];

    /// Stable integer code of this backend kind.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Canonical configuration name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Backend::Ethereum => "ethereum",
            Backend::Starknet => "starknet",
            Backend::Solana => "solana",
            Backend::Bitcoin => "bitcoin",
            Backend::ZkSyncLite => "zksync-lite",
            Backend::Ton => "ton",
            Backend::Sui => "sui",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for Backend {
    type Error = RpcError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Backend::ALL
            .into_iter()
            .find(|b| b.code() == value)
            .ok_or_else(|| RpcError::UnsupportedBackend(value.to_string()))
    }
}

impl From<Backend> for i32 {
    fn from(value: Backend) -> Self {
        value.code()
    }
}

impl FromStr for Backend {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let backend = match s.trim().to_ascii_lowercase().as_str() {
            "ethereum" | "evm" => Backend::Ethereum,
            "starknet" => Backend::Starknet,
            "solana" => Backend::Solana,
            "bitcoin" | "btc" => Backend::Bitcoin,
            "zksync-lite" | "zkslite" | "zksynclite" => Backend::ZkSyncLite,
            "ton" => Backend::Ton,
            "sui" => Backend::Sui,
            _ => return Err(RpcError::UnsupportedBackend(s.to_string())),
        };
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(Backend::Ethereum.code(), 1);
        assert_eq!(Backend::ZkSyncLite.code(), 5);
        assert_eq!(Backend::Sui.code(), 9);
        for backend in Backend::ALL {
            assert_eq!(Backend::try_from(backend.code()).unwrap(), backend);
        }
    }

    #[test]
    fn test_unknown_code_is_unsupported() {
        let err = Backend::try_from(99).unwrap_err();
        assert!(matches!(err, RpcError::UnsupportedBackend(ref v) if v == "99"));
        assert!(Backend::try_from(7).is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("EVM".parse::<Backend>().unwrap(), Backend::Ethereum);
        assert_eq!("zksync-lite".parse::<Backend>().unwrap(), Backend::ZkSyncLite);
        assert!(matches!(
            "cosmos".parse::<Backend>(),
            Err(RpcError::UnsupportedBackend(_))
        ));
    }

    #[test]
    fn test_serde_uses_config_names() {
        let json = serde_json::to_string(&Backend::ZkSyncLite).unwrap();
        assert_eq!(json, "\"zksync-lite\"");
        let parsed: Backend = serde_json::from_str("\"sui\"").unwrap();
        assert_eq!(parsed, Backend::Sui);
    }
}

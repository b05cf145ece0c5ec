use alloy_primitives::U256;
use chainrpc_types::RpcError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

pub const MAINNET_API_URL: &str = "https://toncenter.com/api/v3/";
pub const TESTNET_API_URL: &str = "https://testnet.toncenter.com/api/v3/";

/// Where and how to reach a toncenter v3 API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TonEndpoint {
    pub url: Url,
    pub api_key: Option<String>,
}

impl TonEndpoint {
    /// The public toncenter endpoint for the network.
    pub fn public(testnet: bool) -> Result<Self, RpcError> {
        let url = if testnet {
            TESTNET_API_URL
        } else {
            MAINNET_API_URL
        };
        let url = Url::parse(url).map_err(|e| RpcError::InvalidInput(e.to_string()))?;
        Ok(Self::new(url))
    }

    pub fn new(url: Url) -> Self {
        Self { url, api_key: None }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MasterchainInfo {
    pub last: BlockRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockRef {
    pub seqno: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountStates {
    #[serde(default)]
    pub accounts: Vec<AccountState>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountState {
    pub balance: Option<String>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JettonWallets {
    #[serde(default)]
    pub jetton_wallets: Vec<JettonWallet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JettonWallet {
    pub balance: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JettonMasters {
    #[serde(default)]
    pub jetton_masters: Vec<JettonMaster>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JettonMaster {
    pub total_supply: String,
}

/// Minimal toncenter v3 client.
#[derive(Debug, Clone)]
pub struct TonClient {
    http: reqwest::Client,
    endpoint: TonEndpoint,
}

impl TonClient {
    pub fn new(endpoint: TonEndpoint) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &TonEndpoint {
        &self.endpoint
    }

    /// GETs `path` relative to the API root and decodes the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        method: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, RpcError> {
        let url = self
            .endpoint
            .url
            .join(method)
            .map_err(|e| RpcError::InvalidInput(format!("invalid TON API path {method}: {e}")))?;
        let mut request = self.http.get(url).query(query);
        if let Some(api_key) = &self.endpoint.api_key {
            request = request.header("X-API-Key", api_key);
        }
        let response = request.send().await.map_err(RpcError::transport)?;
        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RpcError::transport(format!("{method} returned HTTP {status}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::call(method, format!("HTTP {status}: {body}")));
        }
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                RpcError::decode(method, e)
            } else {
                RpcError::transport(e)
            }
        })
    }
}

/// Parses a decimal integer string as returned for balances and supplies.
pub(crate) fn parse_amount(method: &'static str, value: &str) -> Result<U256, RpcError> {
    U256::from_str_radix(value.trim(), 10).map_err(|e| RpcError::decode(method, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_endpoints() {
        assert_eq!(TonEndpoint::public(false).unwrap().url.as_str(), MAINNET_API_URL);
        assert_eq!(TonEndpoint::public(true).unwrap().url.as_str(), TESTNET_API_URL);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("accountStates", "5000000000").unwrap(),
            U256::from(5_000_000_000u64)
        );
        assert!(matches!(
            parse_amount("accountStates", "0x10"),
            Err(RpcError::Decode { method: "accountStates", .. })
        ));
    }
}

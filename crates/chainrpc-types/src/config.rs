//! RPC endpoint configuration.
//!
//! Endpoint URLs usually carry API keys, so any string value wrapped in
//! [`LiteralOrEnv`] may name an environment variable instead of holding the
//! value itself:
//!
//! ```json
//! { "http": "https://eth.llamarpc.com", "rate_limit": 20 }
//! { "http": "$ALCHEMY_BASE_URL" }
//! { "http": "${QUICKNODE_SOLANA_URL}" }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use url::Url;

/// One RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcConfig {
    pub http: LiteralOrEnv<Url>,
    /// Requests per second allowed against this endpoint. Unlimited if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
}

impl RpcConfig {
    pub fn new(http: Url) -> Self {
        Self {
            http: LiteralOrEnv::from_literal(http),
            rate_limit: None,
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: u32) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn url(&self) -> &Url {
        &self.http
    }
}

/// A value given either literally or as a `$VAR` / `${VAR}` reference,
/// resolved from the process environment while deserializing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Name of the environment variable `raw` refers to, if it is a reference.
fn env_reference(raw: &str) -> Option<&str> {
    if let Some(braced) = raw.strip_prefix("${") {
        return braced.strip_suffix('}').filter(|name| !name.is_empty());
    }
    let name = raw.strip_prefix('$')?;
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = String::deserialize(deserializer)?;
        let resolved = match env_reference(&raw) {
            Some(name) => std::env::var(name)
                .map_err(|_| D::Error::custom(format!("environment variable {name} is not set")))?,
            None => raw,
        };
        resolved
            .parse::<T>()
            .map(LiteralOrEnv)
            .map_err(|e| D::Error::custom(format!("invalid value: {e}")))
    }
}

impl<T: Serialize> Serialize for LiteralOrEnv<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_reference_forms() {
        assert_eq!(env_reference("$RPC_URL"), Some("RPC_URL"));
        assert_eq!(env_reference("${RPC_URL}"), Some("RPC_URL"));
        assert_eq!(env_reference("${}"), None);
        assert_eq!(env_reference("$"), None);
        assert_eq!(env_reference("https://host/$path"), None);
        assert_eq!(env_reference("$not-a-var"), None);
    }

    #[test]
    fn test_rpc_config_literal() {
        let config: RpcConfig =
            serde_json::from_str(r#"{"http":"https://rpc.example.org","rate_limit":5}"#).unwrap();
        assert_eq!(config.url().as_str(), "https://rpc.example.org/");
        assert_eq!(config.rate_limit, Some(5));
    }

    #[test]
    fn test_rpc_config_missing_env_fails() {
        let result = serde_json::from_str::<RpcConfig>(
            r#"{"http":"${CHAINRPC_TEST_DEFINITELY_UNSET_VARIABLE}"}"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("CHAINRPC_TEST_DEFINITELY_UNSET_VARIABLE"));
    }
}

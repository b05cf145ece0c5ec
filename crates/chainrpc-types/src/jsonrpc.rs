//! JSON-RPC transport shared by the EVM, Sui, Starknet, Bitcoin and zkSync
//! Lite backends.
//!
//! [`rpc_client`] builds one alloy [`RpcClient`] over every configured
//! endpoint: each endpoint is throttled to its `rate_limit`, and a fallback
//! layer spreads requests across them. [`map_transport_error`] sorts alloy
//! transport failures into the [`RpcError`] taxonomy.

use alloy_json_rpc::{RpcRecv, RpcSend};
use alloy_rpc_client::RpcClient;
use alloy_transport::TransportError;
use alloy_transport::layers::{FallbackLayer, ThrottleLayer};
use alloy_transport_http::Http;
use std::num::NonZeroUsize;
use tower::ServiceBuilder;

use crate::config::RpcConfig;
use crate::error::RpcError;

/// Empty positional parameter list, serialized as `[]`.
pub type NoParams = [(); 0];

pub const NO_PARAMS: NoParams = [];

/// Builds a JSON-RPC client over the HTTP(S) endpoints in `rpc`.
///
/// Endpoints with other schemes are skipped. Fails if none remain.
pub fn rpc_client(chain: &str, rpc: &[RpcConfig]) -> Result<RpcClient, RpcError> {
    let transports = rpc
        .iter()
        .filter_map(|endpoint| {
            let url = endpoint.url();
            if !matches!(url.scheme(), "http" | "https") {
                #[cfg(feature = "telemetry")]
                tracing::warn!(chain, rpc_url = %url, "Skipping non-HTTP RPC endpoint");
                return None;
            }
            #[cfg(feature = "telemetry")]
            tracing::info!(chain, rpc_url = %url, rate_limit = ?endpoint.rate_limit, "Using HTTP transport");
            let service = ServiceBuilder::new()
                .layer(ThrottleLayer::new(endpoint.rate_limit.unwrap_or(u32::MAX)))
                .service(Http::new(url.clone()));
            Some(service)
        })
        .collect::<Vec<_>>();
    let active = NonZeroUsize::new(transports.len()).ok_or_else(|| {
        RpcError::InvalidInput(format!("no HTTP RPC endpoint configured for {chain}"))
    })?;
    let fallback = ServiceBuilder::new()
        .layer(FallbackLayer::default().with_active_transport_count(active))
        .service(transports);
    Ok(RpcClient::new(fallback, false))
}

/// Classifies an alloy transport failure for `method`.
///
/// Error responses from the node become [`RpcError::Call`], undecodable
/// payloads become [`RpcError::Decode`], everything else is a transport
/// failure.
pub fn map_transport_error(method: &'static str, error: TransportError) -> RpcError {
    if error.is_error_resp() {
        RpcError::call(method, error)
    } else if error.is_deser_error() || error.is_null_resp() {
        RpcError::decode(method, error)
    } else {
        RpcError::transport(error)
    }
}

/// JSON-RPC error code carried by a node error response, if any.
pub fn error_code(error: &TransportError) -> Option<i64> {
    error.as_error_resp().map(|payload| payload.code)
}

/// Sends one request and maps the failure with [`map_transport_error`].
pub async fn call<P, R>(client: &RpcClient, method: &'static str, params: P) -> Result<R, RpcError>
where
    P: RpcSend,
    R: RpcRecv,
{
    client
        .request(method, params)
        .await
        .map_err(|e| map_transport_error(method, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_params_serializes_as_empty_array() {
        assert_eq!(serde_json::to_string(&NO_PARAMS).unwrap(), "[]");
    }

    #[test]
    fn test_rejects_endpoint_list_without_http() {
        let ws = RpcConfig::new("wss://node.example.org".parse().unwrap());
        let err = rpc_client("Ethereum", &[ws]).unwrap_err();
        assert!(matches!(err, RpcError::InvalidInput(_)));
        assert!(rpc_client("Ethereum", &[]).is_err());
    }
}

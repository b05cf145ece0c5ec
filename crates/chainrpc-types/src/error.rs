//! The error model shared by all backends.
//!
//! Failures fall into four families, all surfaced to the caller unchanged:
//!
//! - transport: the node could not be reached or answered garbage ([`RpcError::Transport`])
//! - decode: a response arrived but could not be interpreted ([`RpcError::Decode`])
//! - semantic: the node answered, but the answer is a typed failure
//!   ([`RpcError::Call`], [`RpcError::NotFound`], [`RpcError::ReceiptNotFound`],
//!   [`RpcError::UnsupportedBackend`], invalid input)
//! - capability gaps: the backend has no such primitive ([`RpcError::NotImplemented`])
//!
//! Nothing in this crate or the backends retries. [`RpcError::is_retryable`]
//! tells the caller which failures are worth retrying.

use crate::backend::Backend;

/// Boxed error from a native SDK or transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The node is unreachable, timed out at the transport level, or returned
    /// a malformed envelope.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
    /// The node answered `method` with an error response.
    #[error("{method} rejected by node: {source}")]
    Call {
        method: &'static str,
        #[source]
        source: BoxError,
    },
    /// The response to `method` could not be decoded.
    #[error("failed to decode {method} response: {reason}")]
    Decode { method: &'static str, reason: String },
    /// The address does not resolve to a usable token.
    #[error("token {0} not found")]
    NotFound(String),
    /// The node has no receipt for the transaction.
    #[error("receipt not found for transaction {0}")]
    ReceiptNotFound(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),
    /// The backend lacks the primitive behind `method`.
    #[error("{method} is not implemented for the {backend} backend")]
    NotImplemented {
        backend: Backend,
        method: &'static str,
    },
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl RpcError {
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        RpcError::Transport(error.into())
    }

    pub fn call<E>(method: &'static str, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        RpcError::Call {
            method,
            source: error.into(),
        }
    }

    pub fn decode(method: &'static str, reason: impl ToString) -> Self {
        RpcError::Decode {
            method,
            reason: reason.to_string(),
        }
    }

    pub fn not_implemented(backend: Backend, method: &'static str) -> Self {
        RpcError::NotImplemented { backend, method }
    }

    /// Whether the failure says nothing about the request itself, so the same
    /// request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Transport(_) | RpcError::DeadlineExceeded)
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, RpcError::NotImplemented { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RpcError::Cancelled)
    }
}

//! Core types for chainrpc.
//!
//! This crate provides the backend-agnostic building blocks shared by every
//! chain backend:
//!
//! - [`backend`] - The closed enumeration of backend kinds ([`Backend`])
//! - [`chain`] - Static chain descriptors ([`ChainInfo`]) and the [`FromConfig`] trait
//! - [`token`] - Token metadata ([`TokenInfo`]) and the per-client [`TokenInfoManager`] cache
//! - [`rpc`] - The uniform [`Rpc`] contract every backend implements
//! - [`context`] - Cancellation and deadlines for in-flight calls ([`RpcContext`])
//! - [`error`] - The error taxonomy ([`RpcError`])
//! - [`address`] - Native-currency sentinels and address normalization
//! - [`config`] - RPC endpoint configuration and environment variable resolution
//!
//! With the `jsonrpc` feature, [`jsonrpc`] builds rate-limited, fallback-aware
//! JSON-RPC clients and maps transport failures into [`RpcError`].
//! With the `test-utils` feature, [`testing`] provides a mock JSON-RPC node.

pub mod address;
pub mod backend;
pub mod chain;
pub mod config;
pub mod context;
pub mod error;
#[cfg(feature = "jsonrpc")]
pub mod jsonrpc;
pub mod rpc;
#[cfg(feature = "test-utils")]
pub mod testing;
pub mod token;

pub use backend::Backend;
pub use chain::{ChainInfo, FromConfig};
pub use context::RpcContext;
pub use error::RpcError;
pub use rpc::{Rpc, TxOutcome};
pub use token::{TokenInfo, TokenInfoManager};

//! Cancellation and deadlines for RPC calls.
//!
//! Every network-bound [`Rpc`](crate::Rpc) method takes an [`RpcContext`].
//! Backends wrap their I/O in [`RpcContext::run`], which races the request
//! against cancellation and the deadline. When the context wins the race the
//! request future is dropped, which aborts the underlying HTTP request.
//!
//! ```ignore
//! let ctx = RpcContext::with_timeout(Duration::from_secs(3));
//! let height = rpc.get_latest_block_number(&ctx).await?;
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::RpcError;

#[derive(Debug, Clone, Default)]
pub struct RpcContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RpcContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context cancelled together with `self`, but which can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Like [`RpcContext::child`], with the deadline tightened to at most
    /// `timeout` from now.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Drives `fut` unless the context is cancelled or its deadline passes
    /// first.
    ///
    /// An already-cancelled or expired context fails before `fut` is polled,
    /// so no request is sent.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, RpcError>
    where
        F: Future<Output = Result<T, RpcError>>,
    {
        if self.token.is_cancelled() {
            return Err(RpcError::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(RpcError::DeadlineExceeded);
        }
        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(RpcError::Cancelled),
            _ = expiry => Err(RpcError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

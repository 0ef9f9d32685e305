//! Error types for the memoization engine
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Memo Error Enum ==
/// Unified error type for a memoized call.
///
/// Each variant wraps its underlying cause in an `Arc` because a single
/// failure is broadcast to every caller that joined the same in-flight
/// computation, and the shared future requires its output to be `Clone`.
#[derive(Error, Debug, Clone)]
pub enum MemoError {
    /// The underlying computation failed; nothing was cached
    #[error("computation failed: {0}")]
    Computation(Arc<anyhow::Error>),

    /// The initial store lookup failed; the computation was never invoked
    #[error("store read failed: {0}")]
    StoreRead(Arc<anyhow::Error>),

    /// The cache write failed after the computation succeeded; the computed
    /// value is discarded and only this failure is observed by callers
    #[error("store write failed: {0}")]
    StoreWrite(Arc<anyhow::Error>),
}

impl MemoError {
    // == Constructors ==
    /// Wraps a computation failure.
    pub fn computation(err: anyhow::Error) -> Self {
        Self::Computation(Arc::new(err))
    }

    /// Wraps a store read failure.
    pub fn store_read(err: anyhow::Error) -> Self {
        Self::StoreRead(Arc::new(err))
    }

    /// Wraps a store write failure.
    pub fn store_write(err: anyhow::Error) -> Self {
        Self::StoreWrite(Arc::new(err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for memoized calls.
pub type MemoResult<T> = std::result::Result<T, MemoError>;

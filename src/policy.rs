//! Policy Module
//!
//! The three configurable decisions taken around a memoized call: whether a
//! cache hit should be recomputed anyway, whether a fresh result should be
//! written back, and what expiration to attach to the write.
//!
//! Every hook is consulted only for non-nullish values; an absent cached
//! value is always a miss and an absent fresh result is never written.

use std::sync::Arc;
use std::time::Duration;

use crate::key::KeyPart;

// == Hook Types ==
/// Decides whether a cached hit should trigger recomputation anyway.
pub type RecalculateFn<T> = Arc<dyn Fn(&T, &[KeyPart]) -> bool + Send + Sync>;

/// Decides whether a fresh result is eligible for the cache write.
pub type ShouldCacheFn<T> = Arc<dyn Fn(&T, &[KeyPart]) -> bool + Send + Sync>;

/// Derives an expiration from a fresh result and the call arguments.
pub type ExpireFn<T> = Arc<dyn Fn(&T, &[KeyPart]) -> Option<Duration> + Send + Sync>;

// == Expire Policy ==
/// How expiration is attached to cache writes.
#[derive(Clone)]
pub enum ExpirePolicy<T> {
    /// Entries never expire
    None,
    /// Every entry expires after the same fixed duration
    Fixed(Duration),
    /// Expiration is computed per result
    PerResult(ExpireFn<T>),
}

impl<T> Default for ExpirePolicy<T> {
    fn default() -> Self {
        Self::None
    }
}

// == Policy ==
/// Immutable decision bundle captured at engine construction.
#[derive(Clone)]
pub struct Policy<T> {
    pub(crate) expire: ExpirePolicy<T>,
    pub(crate) recalculate: Option<RecalculateFn<T>>,
    pub(crate) cache: Option<ShouldCacheFn<T>>,
}

// Manual impl: a derived one would demand `T: Default` for no reason.
impl<T> Default for Policy<T> {
    fn default() -> Self {
        Self {
            expire: ExpirePolicy::None,
            recalculate: None,
            cache: None,
        }
    }
}

impl<T> Policy<T> {
    // == Should Recalculate ==
    /// Whether a non-nullish cache hit should be recomputed. Defaults to
    /// `false`: hits are returned as-is unless the policy opts in.
    pub fn should_recalculate(&self, cached: &T, args: &[KeyPart]) -> bool {
        match &self.recalculate {
            Some(hook) => hook(cached, args),
            None => false,
        }
    }

    // == Should Cache ==
    /// Whether a non-nullish fresh result should be written back. Defaults
    /// to `true`: results are cached unless the policy opts out.
    pub fn should_cache(&self, result: &T, args: &[KeyPart]) -> bool {
        match &self.cache {
            Some(hook) => hook(result, args),
            None => true,
        }
    }

    // == Expire In ==
    /// Expiration to attach to the write for a non-nullish fresh result.
    pub fn expire_in(&self, result: &T, args: &[KeyPart]) -> Option<Duration> {
        match &self.expire {
            ExpirePolicy::None => None,
            ExpirePolicy::Fixed(duration) => Some(*duration),
            ExpirePolicy::PerResult(hook) => hook(result, args),
        }
    }
}

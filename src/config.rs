//! Configuration Module
//!
//! Options captured once at engine construction: the policy hooks and an
//! optional store override. All fields are optional with the defaults
//! described in the policy module.

use std::sync::Arc;
use std::time::Duration;

use crate::key::KeyPart;
use crate::policy::{ExpirePolicy, Policy};
use crate::store::StorePort;

// == Memo Options ==
/// Builder-style option bundle for a [`MemoizeEngine`](crate::MemoizeEngine).
///
/// ```
/// use std::time::Duration;
/// use async_memo::MemoOptions;
///
/// let options: MemoOptions<i64> = MemoOptions::new()
///     .expire_in(Duration::from_secs(60))
///     .should_cache(|result, _args| *result >= 0);
/// ```
pub struct MemoOptions<T> {
    pub(crate) policy: Policy<T>,
    pub(crate) store: Option<Arc<dyn StorePort<T>>>,
}

impl<T> MemoOptions<T> {
    // == Constructor ==
    /// Creates options with every decision left at its default: hits are
    /// returned as-is, fresh results are cached without expiration, and the
    /// bundled in-memory store backs the engine.
    pub fn new() -> Self {
        Self {
            policy: Policy::default(),
            store: None,
        }
    }

    // == Expiration ==
    /// Attaches the same fixed expiration to every cache write.
    pub fn expire_in(mut self, duration: Duration) -> Self {
        self.policy.expire = ExpirePolicy::Fixed(duration);
        self
    }

    /// Computes the expiration per result; returning `None` writes the entry
    /// without expiration.
    pub fn expire_with<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T, &[KeyPart]) -> Option<Duration> + Send + Sync + 'static,
    {
        self.policy.expire = ExpirePolicy::PerResult(Arc::new(hook));
        self
    }

    // == Recalculation ==
    /// Forces recomputation for cache hits the hook returns `true` for.
    pub fn should_recalculate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T, &[KeyPart]) -> bool + Send + Sync + 'static,
    {
        self.policy.recalculate = Some(Arc::new(hook));
        self
    }

    // == Cache-Write Eligibility ==
    /// Suppresses the cache write for fresh results the hook returns `false`
    /// for; the result is still returned to the caller.
    pub fn should_cache<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T, &[KeyPart]) -> bool + Send + Sync + 'static,
    {
        self.policy.cache = Some(Arc::new(hook));
        self
    }

    // == Store Override ==
    /// Backs the engine with the given store instead of the bundled
    /// in-memory one.
    pub fn store(mut self, store: Arc<dyn StorePort<T>>) -> Self {
        self.store = Some(store);
        self
    }
}

impl<T> Default for MemoOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

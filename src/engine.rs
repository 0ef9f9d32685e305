//! Engine Module
//!
//! Orchestrates a memoized call end to end: key composition, in-flight
//! coalescing, store lookup, policy decisions, computation, and the cache
//! write-back.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::config::MemoOptions;
use crate::error::{MemoError, MemoResult};
use crate::inflight::InflightCoalescer;
use crate::key::{compose, KeyPart};
use crate::policy::Policy;
use crate::store::{MemoryStore, StorePort};

/// The wrapped underlying computation.
///
/// Returning `Ok(None)` marks the result as nullish: it is handed back to
/// the caller but never written to the store.
type ComputeFn<T> =
    Arc<dyn Fn(Vec<KeyPart>) -> BoxFuture<'static, anyhow::Result<Option<T>>> + Send + Sync>;

// == Memoize Engine ==
/// Memoizes one async computation behind a namespaced key-value cache.
///
/// Every call composes a composite store key from the engine's namespace and
/// the call arguments, then runs the read → maybe-recompute → maybe-write
/// sequence at most once per distinct argument list at a time: concurrent
/// calls with identical arguments share a single in-flight computation and a
/// single set of store operations, and all of them observe the same outcome.
///
/// The coalescing state is owned by the engine value, so independently
/// constructed engines never interfere with each other.
///
/// ```
/// use async_memo::{KeyPart, MemoizeEngine, MemoOptions};
///
/// # tokio_test::block_on(async {
/// let engine = MemoizeEngine::new(
///     vec![KeyPart::from("sums")],
///     |args: Vec<KeyPart>| async move {
///         let (KeyPart::Int(a), KeyPart::Int(b)) = (&args[0], &args[1]) else {
///             anyhow::bail!("expected two integers");
///         };
///         Ok(Some(a + b))
///     },
///     MemoOptions::new(),
/// );
///
/// let first = engine.call(vec![KeyPart::from(1), KeyPart::from(2)]).await?;
/// assert_eq!(first, Some(3));
///
/// // Served from the cache; the computation does not run again.
/// let again = engine.call(vec![KeyPart::from(1), KeyPart::from(2)]).await?;
/// assert_eq!(again, Some(3));
/// # Ok::<(), async_memo::MemoError>(())
/// # }).unwrap();
/// ```
pub struct MemoizeEngine<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Fixed key prefix identifying this engine's cache bucket
    namespace: Vec<KeyPart>,
    /// The computation being memoized
    compute: ComputeFn<T>,
    /// Backing key-value store
    store: Arc<dyn StorePort<T>>,
    /// Decision hooks captured at construction
    policy: Policy<T>,
    /// Per-fingerprint deduplication of running computations
    inflight: InflightCoalescer<T>,
}

impl<T> MemoizeEngine<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an engine memoizing `compute` under `namespace`.
    ///
    /// # Arguments
    /// * `namespace` - Fixed key elements prefixed to every store key
    /// * `compute` - The underlying computation; receives the call arguments
    /// * `options` - Policy hooks and optional store override
    pub fn new<F, Fut>(namespace: Vec<KeyPart>, compute: F, options: MemoOptions<T>) -> Self
    where
        F: Fn(Vec<KeyPart>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<T>>> + Send + 'static,
    {
        let MemoOptions { policy, store } = options;

        Self {
            namespace,
            compute: Arc::new(move |args| Box::pin(compute(args))),
            store: store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            policy,
            inflight: InflightCoalescer::new(),
        }
    }

    // == Call ==
    /// Runs one memoized invocation.
    ///
    /// Sequence for the caller that initiates the computation:
    /// 1. Read the store under the composite key.
    /// 2. On a non-nullish hit, return it unless the recalculation hook opts
    ///    into recomputation.
    /// 3. Otherwise invoke the underlying computation.
    /// 4. Write a non-nullish result back unless the cache-write hook opts
    ///    out, attaching the policy's expiration.
    ///
    /// Callers arriving while an identical invocation is in flight join it
    /// instead and receive its outcome. Any failure — store read, the
    /// computation itself, or the store write — is delivered verbatim to
    /// every joined caller; a failed write discards the computed value. The
    /// next call with the same arguments starts a clean attempt.
    pub async fn call(&self, args: Vec<KeyPart>) -> MemoResult<Option<T>> {
        let (key, fingerprint) = compose(&self.namespace, &args);

        let store = Arc::clone(&self.store);
        let compute = Arc::clone(&self.compute);
        let policy = self.policy.clone();

        self.inflight
            .run_coalesced(fingerprint.clone(), move || async move {
                let cached = store.get(&key).await.map_err(MemoError::store_read)?;

                if let Some(hit) = cached {
                    if !policy.should_recalculate(&hit, &args) {
                        debug!(%fingerprint, "cache hit");
                        return Ok(Some(hit));
                    }
                    debug!(%fingerprint, "cache hit, recalculation forced");
                } else {
                    debug!(%fingerprint, "cache miss");
                }

                let result = compute(args.clone())
                    .await
                    .map_err(MemoError::computation)?;

                if let Some(value) = &result {
                    if policy.should_cache(value, &args) {
                        let expire_in = policy.expire_in(value, &args);
                        debug!(%fingerprint, ?expire_in, "writing result to store");
                        store
                            .set(&key, value.clone(), expire_in)
                            .await
                            .map_err(MemoError::store_write)?;
                    } else {
                        debug!(%fingerprint, "cache write suppressed by policy");
                    }
                }

                Ok(result)
            })
            .await
    }
}

//! In-Flight Coalescing Module
//!
//! Deduplicates concurrent memoized calls: for each fingerprint at most one
//! computation is active at a time, and every caller that arrives while it is
//! running joins it and receives the same settled outcome.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tracing::{debug, trace};

use crate::error::MemoResult;

/// Settled outcome of one coalesced computation, cloned out to every joiner.
type Outcome<T> = MemoResult<Option<T>>;

/// A pending computation shared by all callers with the same fingerprint.
type PendingComputation<T> = Shared<BoxFuture<'static, Outcome<T>>>;

// == In-Flight Coalescer ==
/// Maps fingerprints to currently running computations.
///
/// This map is the engine's only mutable shared state. The check-then-register
/// sequence runs entirely under one synchronous mutex acquisition with no
/// await point, so two tasks can never both observe "no entry" for the same
/// fingerprint. All awaiting happens on the shared future outside the lock.
pub(crate) struct InflightCoalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    entries: Arc<Mutex<HashMap<String, PendingComputation<T>>>>,
}

impl<T> InflightCoalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty coalescer.
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Run Coalesced ==
    /// Runs `factory` deduplicated by `fingerprint`.
    ///
    /// If a computation is already in flight for this fingerprint, the caller
    /// joins it and `factory` is never invoked. Otherwise the factory's future
    /// is registered before anything awaits it, and the map entry is removed
    /// exactly once when the computation settles, success or failure.
    ///
    /// If every joiner is dropped before settlement the entry stays
    /// registered; the next caller for the fingerprint resumes driving the
    /// same computation rather than starting a duplicate.
    pub(crate) async fn run_coalesced<F, Fut>(&self, fingerprint: String, factory: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let shared = {
            let mut entries = self
                .entries
                .lock()
                .expect("in-flight map lock poisoned");

            if let Some(existing) = entries.get(&fingerprint) {
                trace!(%fingerprint, "joining in-flight computation");
                existing.clone()
            } else {
                debug!(%fingerprint, "registering in-flight computation");
                let inner = factory();

                // The driving future removes its own entry after settling,
                // so removal runs exactly once regardless of outcome.
                let entries_handle = Arc::clone(&self.entries);
                let cleanup_key = fingerprint.clone();
                let wrapped: BoxFuture<'static, Outcome<T>> = Box::pin(async move {
                    let outcome = inner.await;
                    entries_handle
                        .lock()
                        .expect("in-flight map lock poisoned")
                        .remove(&cleanup_key);
                    trace!(fingerprint = %cleanup_key, "in-flight computation settled");
                    outcome
                });

                let shared = wrapped.shared();
                entries.insert(fingerprint, shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Number of computations currently in flight.
    #[cfg(test)]
    pub(crate) fn in_flight_count(&self) -> usize {
        self.entries
            .lock()
            .expect("in-flight map lock poisoned")
            .len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::error::MemoError;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[tokio::test]
    async fn test_single_caller_runs_factory_once() {
        let coalescer: InflightCoalescer<i64> = InflightCoalescer::new();
        let calls = counter();

        let calls_in = Arc::clone(&calls);
        let result = coalescer
            .run_coalesced("fp".to_string(), move || async move {
                calls_in.fetch_add(1, Ordering::SeqCst);
                Ok(Some(42))
            })
            .await;

        assert_eq!(result.unwrap(), Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_factory() {
        let coalescer: Arc<InflightCoalescer<i64>> = Arc::new(InflightCoalescer::new());
        let calls = counter();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coalescer = Arc::clone(&coalescer);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                coalescer
                    .run_coalesced("fp".to_string(), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // Hold the computation open so later callers join it
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(Some(7))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), Some(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entry_removed_after_success() {
        let coalescer: InflightCoalescer<i64> = InflightCoalescer::new();

        let _ = coalescer
            .run_coalesced("fp".to_string(), || async { Ok(Some(1)) })
            .await;

        assert_eq!(coalescer.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_entry_removed_after_failure() {
        let coalescer: InflightCoalescer<i64> = InflightCoalescer::new();

        let result = coalescer
            .run_coalesced("fp".to_string(), || async {
                Err(MemoError::computation(anyhow!("boom")))
            })
            .await;

        assert!(matches!(result, Err(MemoError::Computation(_))));
        assert_eq!(coalescer.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_sequential_calls_rerun_factory() {
        let coalescer: InflightCoalescer<i64> = InflightCoalescer::new();
        let calls = counter();

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let _ = coalescer
                .run_coalesced("fp".to_string(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(1))
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_distinct_fingerprints_do_not_coalesce() {
        let coalescer: Arc<InflightCoalescer<i64>> = Arc::new(InflightCoalescer::new());
        let calls = counter();

        let mut handles = Vec::new();
        for i in 0..4 {
            let coalescer = Arc::clone(&coalescer);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                coalescer
                    .run_coalesced(format!("fp-{i}"), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(Some(i))
                    })
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}

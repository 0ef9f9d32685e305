//! Memory Store Module
//!
//! In-memory `StorePort` implementation backing engines that are not given an
//! explicit store, and serving as test infrastructure.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::key::CompositeKey;
use crate::store::{StoredEntry, StorePort};

// == Memory Store ==
/// Simple expiring key-value store held entirely in memory.
///
/// Expired entries are treated as absent and removed lazily on read; there is
/// no background sweep and no capacity bound.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    /// Key-value storage
    entries: RwLock<HashMap<CompositeKey, StoredEntry<T>>>,
}

impl<T> MemoryStore<T> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries currently held, including not-yet-collected expired
    /// ones.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl<T> StorePort<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &CompositeKey) -> anyhow::Result<Option<T>> {
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.get(key) {
            if entry.is_expired() {
                // Remove expired entry and report a miss
                entries.remove(key);
                trace!(?key, "expired entry removed on read");
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }

        Ok(None)
    }

    async fn set(
        &self,
        key: &CompositeKey,
        value: T,
        expire_in: Option<Duration>,
    ) -> anyhow::Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.clone(), StoredEntry::new(value, expire_in));
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPart;
    use tokio_test::block_on;

    fn key(parts: Vec<KeyPart>) -> CompositeKey {
        CompositeKey::new(parts)
    }

    #[test]
    fn test_set_then_get() {
        block_on(async {
            let store: MemoryStore<i64> = MemoryStore::new();
            let k = key(vec![KeyPart::from("sums"), KeyPart::from(1)]);

            store.set(&k, 3, None).await.unwrap();

            assert_eq!(store.get(&k).await.unwrap(), Some(3));
            assert_eq!(store.entry_count().await, 1);
        });
    }

    #[test]
    fn test_get_missing_key() {
        block_on(async {
            let store: MemoryStore<i64> = MemoryStore::new();
            let k = key(vec![KeyPart::from("missing")]);

            assert_eq!(store.get(&k).await.unwrap(), None);
        });
    }

    #[test]
    fn test_overwrite_resets_value() {
        block_on(async {
            let store: MemoryStore<i64> = MemoryStore::new();
            let k = key(vec![KeyPart::from("k")]);

            store.set(&k, 1, None).await.unwrap();
            store.set(&k, 2, None).await.unwrap();

            assert_eq!(store.get(&k).await.unwrap(), Some(2));
            assert_eq!(store.entry_count().await, 1);
        });
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        block_on(async {
            let store: MemoryStore<i64> = MemoryStore::new();
            let k = key(vec![KeyPart::from("k")]);

            store
                .set(&k, 1, Some(Duration::from_millis(20)))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;

            assert_eq!(store.get(&k).await.unwrap(), None);
            // Lazy removal happened during the read
            assert_eq!(store.entry_count().await, 0);
        });
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        block_on(async {
            let store: MemoryStore<i64> = MemoryStore::new();
            let k12 = key(vec![KeyPart::from(1), KeyPart::from(2)]);
            let k21 = key(vec![KeyPart::from(2), KeyPart::from(1)]);

            store.set(&k12, 3, None).await.unwrap();

            assert_eq!(store.get(&k12).await.unwrap(), Some(3));
            assert_eq!(store.get(&k21).await.unwrap(), None);
        });
    }
}

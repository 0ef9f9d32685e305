//! Store Module
//!
//! The narrow port the engine uses against the backing key-value store, plus
//! a bundled in-memory implementation used as the default backing.

mod entry;
mod memory;

// Re-export public types
pub use entry::StoredEntry;
pub use memory::MemoryStore;

use std::time::Duration;

use async_trait::async_trait;

use crate::key::CompositeKey;

// == Store Port ==
/// Capability interface over the external key-value store.
///
/// The engine only ever issues point reads and writes through this trait;
/// a configured store override is simply another implementation of it. The
/// engine makes no atomicity assumption across its own `get` and `set` for
/// the same key: another actor may mutate the store between them.
#[async_trait]
pub trait StorePort<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Reads the value stored under `key`, or `None` if absent.
    ///
    /// An expired or nullish stored value must be reported as `None`.
    async fn get(&self, key: &CompositeKey) -> anyhow::Result<Option<T>>;

    /// Writes `value` under `key`, with an optional expiration.
    async fn set(
        &self,
        key: &CompositeKey,
        value: T,
        expire_in: Option<Duration>,
    ) -> anyhow::Result<()>;
}

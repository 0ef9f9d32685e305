//! Async Memo - a generic async memoization engine
//!
//! Wraps an expensive asynchronous computation in a namespaced key-value
//! cache: cached results are returned when available, fresh results are
//! computed, optionally persisted, and returned otherwise, and concurrent
//! calls with identical arguments share exactly one in-flight computation
//! and one set of storage operations.

pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod policy;
pub mod store;

mod inflight;

pub use config::MemoOptions;
pub use engine::MemoizeEngine;
pub use error::{MemoError, MemoResult};
pub use key::{CompositeKey, KeyPart};
pub use store::{MemoryStore, StorePort};

//! Stored Entry Module
//!
//! Defines the structure for individual stored values with expiration support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Stored Entry ==
/// A single stored value with its expiration metadata.
#[derive(Debug, Clone)]
pub struct StoredEntry<T> {
    /// The stored value
    pub value: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<T> StoredEntry<T> {
    // == Constructor ==
    /// Creates a new entry with an optional time-to-live.
    pub fn new(value: T, expire_in: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = expire_in.map(|ttl| now + ttl.as_millis() as u64);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to the expiration time, so an entry whose
    /// time-to-live has fully elapsed is expired immediately.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining time-to-live in milliseconds, or None if the entry
    /// never expires. Returns `Some(0)` once expired.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            expires.saturating_sub(now)
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub(crate) fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_expiration() {
        let entry = StoredEntry::new("value".to_string(), None);

        assert_eq!(entry.value, "value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_entry_creation_with_expiration() {
        let entry = StoredEntry::new(7_i64, Some(Duration::from_secs(60)));

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());

        let remaining = entry.ttl_remaining_ms().unwrap();
        assert!(remaining <= 60_000);
        assert!(remaining >= 59_000);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = StoredEntry::new(1_i64, Some(Duration::from_millis(30)));

        assert!(!entry.is_expired());
        sleep(Duration::from_millis(60));
        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining_ms().unwrap(), 0);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = StoredEntry {
            value: 1_i64,
            created_at: now,
            expires_at: Some(now), // Expires exactly at creation time
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }
}

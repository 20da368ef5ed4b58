//! # Cache invalidation.
//!
//! [`CacheInvalidator`] is the seam `clear_caches` actions go through.
//! [`InvalidationStore`] is an in-memory implementation that records when each
//! key was last invalidated; cache owners ask it whether an entry built at a
//! given time is still fresh.
//!
//! ## Hierarchical keys
//! Keys are `/`-separated. Invalidating `core/navigation` makes every entry at
//! or below it stale (`core/navigation/main`, `core/navigation/footer/2`, ...),
//! but leaves siblings like `core/pages` untouched.

use std::collections::HashMap;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ActionError;

/// Invalidates cache entries by key.
#[async_trait]
pub trait CacheInvalidator: Send + Sync + 'static {
    /// Marks `key` (and everything below it) as stale.
    async fn invalidate(&self, key: &str) -> Result<(), ActionError>;
}

/// In-memory invalidation timestamps.
#[derive(Debug, Default)]
pub struct InvalidationStore {
    invalidated: RwLock<HashMap<String, SystemTime>>,
}

impl InvalidationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last time `key` itself was invalidated.
    pub async fn invalidated_at(&self, key: &str) -> Option<SystemTime> {
        self.invalidated.read().await.get(key).copied()
    }

    /// True if an entry for `key` built at `since` is still valid.
    ///
    /// The entry is stale when `key` or any of its `/`-parents was invalidated
    /// at or after `since`.
    pub async fn is_fresh(&self, key: &str, since: SystemTime) -> bool {
        let invalidated = self.invalidated.read().await;
        !prefixes(key).any(|prefix| invalidated.get(prefix).is_some_and(|at| *at >= since))
    }

    /// Sorted list of every key invalidated so far.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.invalidated.read().await.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

#[async_trait]
impl CacheInvalidator for InvalidationStore {
    async fn invalidate(&self, key: &str) -> Result<(), ActionError> {
        self.invalidated
            .write()
            .await
            .insert(key.to_string(), SystemTime::now());
        debug!(key, "cache invalidated");
        Ok(())
    }
}

/// `a/b/c` -> `a`, `a/b`, `a/b/c`
fn prefixes(key: &str) -> impl Iterator<Item = &str> {
    key.match_indices('/')
        .map(move |(idx, _)| &key[..idx])
        .chain(std::iter::once(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_prefixes() {
        let all: Vec<&str> = prefixes("core/navigation/main").collect();
        assert_eq!(all, vec!["core", "core/navigation", "core/navigation/main"]);
        assert_eq!(prefixes("single").collect::<Vec<_>>(), vec!["single"]);
    }

    #[tokio::test]
    async fn test_parent_invalidation_makes_children_stale() {
        let store = InvalidationStore::new();
        let built = SystemTime::now() - Duration::from_secs(1);

        store.invalidate("core/navigation").await.unwrap();

        assert!(!store.is_fresh("core/navigation", built).await);
        assert!(!store.is_fresh("core/navigation/main", built).await);
        assert!(store.is_fresh("core/pages", built).await);
        assert!(store.is_fresh("core", built).await);
        assert_eq!(store.keys().await, vec!["core/navigation"]);
    }

    #[tokio::test]
    async fn test_entry_built_after_invalidation_is_fresh() {
        let store = InvalidationStore::new();
        store.invalidate("core/menu").await.unwrap();
        let at = store.invalidated_at("core/menu").await.unwrap();

        assert!(store.is_fresh("core/menu", at + Duration::from_millis(1)).await);
        assert!(store.invalidated_at("core").await.is_none());
    }
}

//! Per-user mutual exclusion.
//!
//! Every load, mutate, save sequence on a user's account collection runs while
//! holding that user's guard, so two concurrent writers cannot lose each
//! other's update.
//!
//! Entries nobody holds or waits on are dropped once the registry grows past
//! [`PRUNE_THRESHOLD`] users.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use rpbank_shared::types::UserId;

/// Registry size above which idle entries are pruned on acquire.
pub const PRUNE_THRESHOLD: usize = 1024;

/// Registry of per-user async mutexes.
#[derive(Debug, Default, Clone)]
pub struct UserLocks {
    inner: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and returns the guard of `user_id`.
    pub async fn acquire(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        if self.inner.len() > PRUNE_THRESHOLD {
            self.prune();
        }
        // Clone the Arc out so the shard lock is released before awaiting.
        let mutex = self.inner.entry(user_id).or_default().clone();
        mutex.lock_owned().await
    }

    /// Drops every entry that no guard or waiter references.
    ///
    /// A held or awaited mutex has a strong count above one, so pruning never
    /// splits a user's queue.
    pub fn prune(&self) {
        self.inner.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    /// Number of users currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no user is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

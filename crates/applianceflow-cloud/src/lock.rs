//! Named mutex registry
//!
//! Serializes mutation cycles against the same appliance. Each key (an
//! appliance ID) maps to a lazily created async mutex. The registry's own
//! meta-lock is held only while looking up or inserting an entry, never for
//! the duration of the caller's critical section.
//!
//! Entries are never removed, so a key's mutex lives for the life of the
//! registry. Acquisition cannot fail and has no timeout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Process-local map of per-key locks
#[derive(Clone, Default)]
pub struct NamedMutexRegistry {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl NamedMutexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shared by every caller in this process that does not inject its own
    pub fn global() -> &'static NamedMutexRegistry {
        static GLOBAL: OnceLock<NamedMutexRegistry> = OnceLock::new();
        GLOBAL.get_or_init(NamedMutexRegistry::new)
    }

    fn handle(&self, key: &str) -> Arc<AsyncMutex<()>> {
        // A poisoned map is still structurally valid: entries are only ever inserted.
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Acquire the lock for `key`, waiting until it is available.
    ///
    /// The lock is released when the returned guard is dropped, so every exit
    /// path of the caller's critical section unlocks.
    pub async fn lock(&self, key: &str) -> NamedLockGuard {
        let handle = self.handle(key);
        tracing::trace!(key, "Waiting for appliance lock");
        let guard = handle.lock_owned().await;
        tracing::trace!(key, "Acquired appliance lock");
        NamedLockGuard {
            key: key.to_string(),
            _guard: guard,
        }
    }

    /// Acquire the lock for `key` only if nobody holds it
    pub fn try_lock(&self, key: &str) -> Option<NamedLockGuard> {
        let handle = self.handle(key);
        let guard = handle.try_lock_owned().ok()?;
        Some(NamedLockGuard {
            key: key.to_string(),
            _guard: guard,
        })
    }

    /// Whether a mutation cycle currently holds the lock for `key`
    pub fn is_locked(&self, key: &str) -> bool {
        let locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .get(key)
            .map(|l| l.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of keys that have ever been locked
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held lock for one key
pub struct NamedLockGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl NamedLockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Release the lock explicitly
    pub fn unlock(self) {}
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        tracing::trace!(key = %self.key, "Released appliance lock");
    }
}

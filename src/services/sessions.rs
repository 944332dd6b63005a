use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;

struct UserEntry {
    lock: Arc<tokio::sync::Mutex<()>>,
    pending_refresh: Option<JoinHandle<()>>,
}

/// Per-user coordination. Updates for one user run strictly one at a time,
/// so a double-tapped button queues instead of racing, and at most one
/// deferred hub refresh is pending per user.
pub struct UserSessions {
    entries: Mutex<HashMap<i64, UserEntry>>,
}

impl UserSessions {
    pub fn new() -> Self {
        UserSessions {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn with_entry<T>(&self, user_id: i64, f: impl FnOnce(&mut UserEntry) -> T) -> T {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(user_id).or_insert_with(|| UserEntry {
            lock: Arc::new(tokio::sync::Mutex::new(())),
            pending_refresh: None,
        });
        f(entry)
    }

    /// Acquires the user's turn. The guard is owned so it can cross await
    /// points inside a handler.
    pub async fn lock_user(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = self.with_entry(user_id, |entry| entry.lock.clone());
        lock.lock_owned().await
    }

    /// Runs `refresh` after `delay`, replacing any refresh already pending
    /// for this user.
    pub fn schedule_refresh<F>(&self, user_id: i64, delay: Duration, refresh: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            refresh.await;
        });

        self.with_entry(user_id, |entry| {
            if let Some(previous) = entry.pending_refresh.replace(handle) {
                previous.abort();
            }
        });
    }

    /// Drops the pending refresh; any interaction before it fires makes it
    /// stale.
    pub fn cancel_refresh(&self, user_id: i64) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(&user_id) {
            if let Some(handle) = entry.pending_refresh.take() {
                handle.abort();
            }
        }
    }
}

impl Default for UserSessions {
    fn default() -> Self {
        Self::new()
    }
}

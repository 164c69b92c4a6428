use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;

use super::{LockError, LockHandle, LockProvider};

/// In-process named locks over a keyed mutex map.
///
/// Correct only when a single server instance owns all toggles. Used when no
/// redis URL is configured, and by tests.
#[derive(Default)]
pub struct LocalLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LocalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }
}

#[async_trait]
impl LockProvider for LocalLocks {
    async fn acquire(&self, key: &str, wait: Duration) -> Result<LockHandle, LockError> {
        let mutex = self.entry(key);

        match tokio::time::timeout(wait, mutex.lock_owned()).await {
            Ok(guard) => Ok(LockHandle {
                guard: Some(guard),
                key: key.to_string(),
                token: String::new(),
            }),
            Err(_) => Err(LockError::Timeout(key.to_string())),
        }
    }

    async fn release(&self, handle: LockHandle) {
        // Dropping the owned guard unlocks the keyed mutex
        drop(handle.guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_and_release() {
        let locks = LocalLocks::new();

        let handle = locks
            .acquire("spot:1", Duration::from_millis(100))
            .await
            .unwrap();
        locks.release(handle).await;

        // Released, so an immediate re-acquire succeeds
        let handle = locks
            .acquire("spot:1", Duration::from_millis(100))
            .await
            .unwrap();
        locks.release(handle).await;
    }

    #[tokio::test]
    async fn held_lock_times_out_second_acquire() {
        let locks = LocalLocks::new();

        let _held = locks
            .acquire("spot:1", Duration::from_millis(100))
            .await
            .unwrap();

        let err = locks
            .acquire("spot:1", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::Timeout(_)));

        // A different key is unaffected
        locks
            .acquire("spot:2", Duration::from_millis(50))
            .await
            .unwrap();
    }
}

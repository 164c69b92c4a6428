//! Named locks for serializing toggles on a single resource.
//!
//! A lock is identified by an application-chosen key such as `"spot:<id>"`.
//! Acquisition waits up to a bounded time and then fails fast; the holder
//! releases on every completion path, including when the guarded action
//! itself fails. Two backends exist: [`RedisLocks`] for multi-instance
//! deployments and [`LocalLocks`] for single-instance mode and tests.

mod local;
mod remote;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;

pub use local::LocalLocks;
pub use remote::RedisLocks;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("Lock backend error: {0}")]
    Backend(String),
    #[error("Timed out acquiring lock \"{0}\"")]
    Timeout(String),
}

/// Proof of a held lock. Passed back to the provider for release.
///
/// The in-process backend additionally holds the mutex guard here, so a
/// dropped handle still releases the key even if `release` is never called.
#[derive(Debug)]
pub struct LockHandle {
    pub(crate) guard: Option<OwnedMutexGuard<()>>,
    pub(crate) key: String,
    pub(crate) token: String,
}

/// A named mutual-exclusion lock keyed by string.
#[async_trait]
pub trait LockProvider: Send + Sync {
    /// Acquire the lock for `key`, waiting at most `wait`.
    async fn acquire(&self, key: &str, wait: Duration) -> Result<LockHandle, LockError>;

    /// Release a previously acquired lock.
    async fn release(&self, handle: LockHandle);
}

/// Run `action` while holding the named lock for `key`.
///
/// The action is never invoked when acquisition times out. The lock is
/// released after the action completes regardless of its outcome; the
/// action's own value (success or failure) is passed through unchanged.
pub async fn with_lock<P, F, Fut, T>(
    locks: &P,
    key: &str,
    wait: Duration,
    action: F,
) -> Result<T, LockError>
where
    P: LockProvider + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let handle = locks.acquire(key, wait).await?;
    let out = action().await;
    locks.release(handle).await;
    Ok(out)
}

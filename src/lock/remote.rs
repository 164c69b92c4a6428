use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Script;
use tokio::time::Instant;

use super::{LockError, LockHandle, LockProvider};

/// Delete the key only if it still holds our token, so an expired lease
/// re-acquired by someone else is never released by the old holder.
const RELEASE_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

/// How often a waiting acquirer re-attempts SET NX
const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Cluster-wide named locks backed by redis.
///
/// Acquisition is `SET key token NX PX lease`, polled until the wait bound.
/// The lease bounds how long a crashed holder can wedge a key.
pub struct RedisLocks {
    conn: ConnectionManager,
    lease: Duration,
}

impl RedisLocks {
    pub async fn connect(url: &str, lease: Duration) -> Result<Self, LockError> {
        let client = redis::Client::open(url).map_err(|e| LockError::Backend(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| LockError::Backend(e.to_string()))?;

        Ok(Self { conn, lease })
    }

    async fn try_acquire(&self, key: &str, token: &str) -> Result<bool, LockError> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(self.lease.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError::Backend(e.to_string()))?;

        Ok(reply.is_some())
    }
}

#[async_trait]
impl LockProvider for RedisLocks {
    async fn acquire(&self, key: &str, wait: Duration) -> Result<LockHandle, LockError> {
        let token = uuid::Uuid::new_v4().to_string();
        let deadline = Instant::now() + wait;

        loop {
            if self.try_acquire(key, &token).await? {
                return Ok(LockHandle {
                    guard: None,
                    key: key.to_string(),
                    token,
                });
            }

            if Instant::now() + RETRY_INTERVAL > deadline {
                return Err(LockError::Timeout(key.to_string()));
            }
            tokio::time::sleep(RETRY_INTERVAL).await;
        }
    }

    async fn release(&self, handle: LockHandle) {
        let mut conn = self.conn.clone();
        let result: Result<i64, _> = Script::new(RELEASE_SCRIPT)
            .key(handle.key.as_str())
            .arg(handle.token.as_str())
            .invoke_async(&mut conn)
            .await;

        match result {
            Ok(0) => {
                // Lease expired before release; the exclusivity window was
                // shorter than the caller believed.
                tracing::warn!(key = %handle.key, "Lock lease expired before release");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(key = %handle.key, error = %e, "Failed to release lock");
            }
        }
    }
}

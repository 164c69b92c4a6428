//! Push notifications, consumed behind a narrow interface. Delivery is
//! best-effort: failures are logged and never surfaced to the caller.

use async_trait::async_trait;
use serde_json::json;

/// Deliver a push notification to one device.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, device_token: &str, title: &str, body: &str);
}

/// FCM delivery over its HTTP endpoint, authenticated with a server key.
pub struct FcmPush {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl FcmPush {
    pub fn new(client: reqwest::Client, endpoint: String, server_key: String) -> Self {
        Self {
            client,
            endpoint,
            server_key,
        }
    }
}

#[async_trait]
impl PushSender for FcmPush {
    async fn send(&self, device_token: &str, title: &str, body: &str) {
        let payload = json!({
            "to": device_token,
            "notification": { "title": title, "body": body },
        });

        let result = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(title = %title, "Push notification delivered");
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Push delivery rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Push delivery failed");
            }
        }
    }
}

/// No-op sender used when no FCM server key is configured.
pub struct NoopPush;

#[async_trait]
impl PushSender for NoopPush {
    async fn send(&self, _device_token: &str, title: &str, _body: &str) {
        tracing::debug!(title = %title, "Push delivery disabled, dropping notification");
    }
}

//! HTTP Notification Dispatcher
//!
//! Delivers the persisted event shape to the notification sink. The sink is
//! responsible for fanning out to members and applying the event's
//! visibility/role filter; the dispatcher's job is one signed, authenticated
//! POST per delivery attempt.

use std::time::Duration;

use async_trait::async_trait;
use bw_common::DomainEvent;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Signature header on every dispatched notification.
pub const SIGNATURE_HEADER: &str = "x-briefwork-signature";

/// Result of one delivery attempt.
#[derive(Debug, Clone)]
pub enum DispatchResult {
    Success,
    Failure { error: String },
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, event: &DomainEvent) -> DispatchResult;
}

#[derive(Debug, Clone)]
pub struct HttpDispatcherConfig {
    /// Notification sink endpoint.
    pub sink_url: String,
    /// HMAC-SHA256 signing secret for the payload, when configured.
    pub signing_secret: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpDispatcherConfig {
    fn default() -> Self {
        Self {
            sink_url: "http://localhost:8080/notifications".to_string(),
            signing_secret: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub struct HttpNotificationDispatcher {
    config: HttpDispatcherConfig,
    client: reqwest::Client,
}

impl HttpNotificationDispatcher {
    pub fn new(config: HttpDispatcherConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn sign(&self, body: &[u8]) -> Option<String> {
        let secret = self.config.signing_secret.as_ref()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl NotificationDispatcher for HttpNotificationDispatcher {
    async fn dispatch(&self, event: &DomainEvent) -> DispatchResult {
        let body = match serde_json::to_vec(event) {
            Ok(body) => body,
            Err(e) => {
                return DispatchResult::Failure {
                    error: format!("serialize: {}", e),
                }
            }
        };

        let mut request = self
            .client
            .post(&self.config.sink_url)
            .header("content-type", "application/json")
            .body(body.clone());
        if let Some(signature) = self.sign(&body) {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(event_id = %event.event_id, "notification delivered");
                DispatchResult::Success
            }
            Ok(response) => {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                warn!(event_id = %event.event_id, %status, "notification sink rejected delivery");
                DispatchResult::Failure {
                    error: format!("HTTP {}: {}", status, detail),
                }
            }
            Err(e) => DispatchResult::Failure {
                error: format!("request failed: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_hmac_sha256() {
        let dispatcher = HttpNotificationDispatcher::new(HttpDispatcherConfig {
            signing_secret: Some("secret".to_string()),
            ..Default::default()
        })
        .unwrap();

        let first = dispatcher.sign(b"payload").unwrap();
        let second = dispatcher.sign(b"payload").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert_ne!(first, dispatcher.sign(b"other").unwrap());
    }

    #[test]
    fn unsigned_when_no_secret_configured() {
        let dispatcher =
            HttpNotificationDispatcher::new(HttpDispatcherConfig::default()).unwrap();
        assert!(dispatcher.sign(b"payload").is_none());
    }
}

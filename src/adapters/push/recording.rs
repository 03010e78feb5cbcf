//! Recording push gateway for tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{DeliveryResult, NotificationEvent, NotificationGateway};

/// Gateway that records every event instead of delivering it.
///
/// Optional knobs simulate a slow or failing provider so callers can
/// exercise their timeout and error paths.
pub struct RecordingGateway {
    sent: Mutex<Vec<NotificationEvent>>,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            delay: None,
            failure: None,
        }
    }

    /// Sleep for `delay` before acknowledging each send.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report every send as failed with the given reason.
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    /// Events recorded so far, in send order.
    pub async fn sent(&self) -> Vec<NotificationEvent> {
        self.sent.lock().await.clone()
    }
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, event: NotificationEvent) -> DeliveryResult {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().await.push(event);
        match &self.failure {
            Some(reason) => DeliveryResult::failed(reason.clone()),
            None => DeliveryResult::Delivered,
        }
    }
}

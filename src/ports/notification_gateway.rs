//! Notification gateway port: fire-and-forget push delivery.
//!
//! The gateway is an opaque external sender. The core never retries and
//! never surfaces gateway failures to the request that triggered them;
//! callers log the `DeliveryResult` and move on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// A push notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub user: UserId,
    pub title: String,
    pub body: String,
    /// Structured payload forwarded verbatim to the client app.
    pub data: serde_json::Value,
}

impl NotificationEvent {
    pub fn new(
        user: UserId,
        title: impl Into<String>,
        body: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            user,
            title: title.into(),
            body: body.into(),
            data,
        }
    }
}

/// Outcome of a push attempt. At-least-once; clients dedupe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Delivered,
    Failed { reason: String },
}

impl DeliveryResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered)
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        DeliveryResult::Failed {
            reason: reason.into(),
        }
    }
}

/// Port for the external push sender.
///
/// Implementations resolve the user's device token themselves (via the
/// user directory or their own registry) and must return `Failed` rather
/// than erroring when the user has no registered device.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Send one notification. Never retried by the core.
    async fn send(&self, event: NotificationEvent) -> DeliveryResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_gateway_is_object_safe() {
        fn _accepts_dyn(_gw: &dyn NotificationGateway) {}
    }

    #[test]
    fn delivery_result_reports_failure_reason() {
        let result = DeliveryResult::failed("no device token");
        assert!(!result.is_delivered());
        assert_eq!(
            result,
            DeliveryResult::Failed {
                reason: "no device token".to_string()
            }
        );
    }

    #[test]
    fn notification_event_carries_structured_payload() {
        let event = NotificationEvent::new(
            UserId::new(),
            "New Repair Request",
            "You have a new repair request.",
            json!({"bookingId": "abc"}),
        );
        assert_eq!(event.data["bookingId"], "abc");
    }
}

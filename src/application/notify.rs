//! Side-channel push dispatch.
//!
//! Push delivery is best-effort and must never sit on the critical path of
//! a request: the gateway call runs on a spawned task, bounded by a timeout,
//! and its outcome is only logged. A hung push service cannot stall message
//! persistence or a booking transition.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{DeliveryResult, NotificationEvent, NotificationGateway};

/// Delivery policy shared by the dispatcher and the booking handlers.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    /// When true, suppress push for recipients that had a live session at
    /// broadcast time. Default is false: push regardless of online status
    /// and let the gateway/client dedupe.
    pub push_only_when_offline: bool,

    /// Upper bound on a single gateway call.
    pub push_timeout: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            push_only_when_offline: false,
            push_timeout: Duration::from_secs(5),
        }
    }
}

impl DeliveryPolicy {
    /// Whether a push should be raised given the live-delivery outcome.
    pub fn should_push(&self, recipient_was_online: bool) -> bool {
        !(self.push_only_when_offline && recipient_was_online)
    }
}

/// Fire a push on a background task. Failures and timeouts are logged,
/// never returned.
pub fn spawn_push(
    gateway: Arc<dyn NotificationGateway>,
    policy: DeliveryPolicy,
    event: NotificationEvent,
) {
    let user = event.user;
    let title = event.title.clone();
    tokio::spawn(async move {
        match tokio::time::timeout(policy.push_timeout, gateway.send(event)).await {
            Ok(DeliveryResult::Delivered) => {
                tracing::debug!(%user, %title, "push notification delivered");
            }
            Ok(DeliveryResult::Failed { reason }) => {
                tracing::warn!(%user, %title, %reason, "push notification failed");
            }
            Err(_) => {
                tracing::warn!(
                    %user,
                    %title,
                    timeout_ms = policy.push_timeout.as_millis() as u64,
                    "push notification timed out"
                );
            }
        }
    });
}

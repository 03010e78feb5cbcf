//! HTTP push gateway adapter.
//!
//! Posts FCM-style payloads to an external push endpoint. The device token
//! comes from the user directory; users without a registered device get a
//! `Failed` result rather than an error, matching the port contract.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::ports::{DeliveryResult, NotificationEvent, NotificationGateway, UserDirectory};

/// Push gateway talking to an external HTTP endpoint.
pub struct HttpPushGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    users: Arc<dyn UserDirectory>,
}

impl HttpPushGateway {
    /// Build a gateway with a bounded request timeout.
    ///
    /// The timeout here is the transport-level bound; callers additionally
    /// wrap the whole `send` in their own timeout off the critical path.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
        users: Arc<dyn UserDirectory>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            users,
        })
    }
}

#[async_trait]
impl NotificationGateway for HttpPushGateway {
    async fn send(&self, event: NotificationEvent) -> DeliveryResult {
        let token = match self.users.find(&event.user).await {
            Ok(Some(record)) => match record.push_token {
                Some(token) => token,
                None => return DeliveryResult::failed("no device token registered"),
            },
            Ok(None) => return DeliveryResult::failed("user not found in directory"),
            Err(e) => return DeliveryResult::failed(format!("directory lookup failed: {}", e)),
        };

        let payload = json!({
            "token": token,
            "notification": {
                "title": event.title,
                "body": event.body,
            },
            "data": event.data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => DeliveryResult::Delivered,
            Ok(resp) => DeliveryResult::failed(format!(
                "push endpoint returned {}",
                resp.status()
            )),
            Err(e) => DeliveryResult::failed(format!("push request failed: {}", e)),
        }
    }
}

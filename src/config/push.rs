//! Push notification configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::notify::DeliveryPolicy;

/// Push notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// HTTP endpoint of the push provider
    pub endpoint: String,

    /// API key for the push provider
    pub api_key: String,

    /// Per-attempt delivery timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Skip the push when the receiver was reached on a live room
    #[serde(default)]
    pub only_when_offline: bool,
}

impl PushConfig {
    /// Get the delivery timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delivery policy derived from this configuration
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            push_only_when_offline: self.only_when_offline,
            push_timeout: self.timeout(),
        }
    }

    /// Validate push configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.endpoint.is_empty() {
            return Err(ValidationError::MissingRequired("PUSH_ENDPOINT"));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidPushEndpoint);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(ValidationError::InvalidPushTimeout);
        }
        Ok(())
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
            only_when_offline: false,
        }
    }
}

fn default_timeout() -> u64 {
    5
}

//! HTTP adapters: REST endpoints over the application layer.

pub mod booking;
pub mod chat;
pub mod middleware;

use serde::{Deserialize, Serialize};

/// Uniform response envelope shared by every API endpoint.
///
/// Success and failure use the same shape; a failure carries a null
/// payload and the HTTP status code tells the error kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Failure envelope for error paths, which carry no payload.
pub type ErrorEnvelope = ApiEnvelope<serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_the_payload() {
        let envelope = ApiEnvelope::ok("Success", serde_json::json!({"id": 7}));
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"id\":7"));
    }

    #[test]
    fn failure_envelope_has_a_null_payload() {
        let envelope = ErrorEnvelope::failure("stale version");
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"data\":null"));
    }
}

//! Push notification adapters.

mod http_gateway;
mod recording;

pub use http_gateway::HttpPushGateway;
pub use recording::RecordingGateway;

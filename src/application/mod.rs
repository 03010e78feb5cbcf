//! Application layer: orchestrates domain aggregates through ports.

pub mod handlers;
pub mod notify;

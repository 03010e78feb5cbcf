//! Application command/query handlers, one file per operation.

pub mod booking;
pub mod chat;

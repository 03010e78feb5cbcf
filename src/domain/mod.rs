//! Domain layer: pure types, aggregates and invariants. No I/O.

pub mod booking;
pub mod chat;
pub mod foundation;

//! Fixline - field-service booking and chat backend
//!
//! This crate implements the booking lifecycle (with optimistic
//! concurrency) and real-time chat with push fallback for a field-service
//! marketplace.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

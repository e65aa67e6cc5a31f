//! Caller-facing transports over the tool registry.

pub mod http;
pub mod stdio;

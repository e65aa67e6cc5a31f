//! hunter-common — Shared error types used across the hunter crates.

pub mod error;

pub use error::{HunterError, Result};

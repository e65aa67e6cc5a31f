//! hunter-engine — Subprocess orchestration for external protein design tools.
//!
//! One generic engine drives every design job through the same pipeline:
//! 1. Build the command line for the request
//! 2. Acquire the global GPU gate and spawn the design script
//! 3. Drain stdout line by line, turning progress markers into `(current, total)` reports
//! 4. Check the exit code and recover the result artifact from disk
//!
//! Behaviour differences between the two design families (argument
//! vocabulary, marker grammar, artifact layout) live in their
//! [`DesignBackend`] adapters: [`boltz::BoltzBackend`] and
//! [`chai::ChaiBackend`].

pub mod backend;
pub mod boltz;
pub mod chai;
pub mod engine;
pub mod gate;
pub mod progress;

pub use backend::DesignBackend;
pub use engine::DesignEngine;
pub use gate::DesignGate;
pub use progress::{NullSink, ProgressSink};

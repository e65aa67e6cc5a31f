//! Backend strategy seam for the design engine.

use std::path::Path;

use hunter_common::Result;

/// Running `(outer, inner)` position recovered from output markers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MarkerState {
    pub outer: u64,
    pub inner: u64,
}

/// One external design family: how to build its command line, read its
/// progress markers, and recover its artifact from disk.
///
/// The engine is generic over this trait; every behaviour difference
/// between families lives in an adapter, never in the pipeline.
pub trait DesignBackend: Send + Sync {
    /// Immutable per-job parameter record.
    type Request: Send + Sync;
    /// Parsed result artifact.
    type Artifacts: Send;

    /// Family tag used in log lines.
    fn family(&self) -> &'static str;

    /// Design script path relative to the install root.
    fn script(&self) -> &str;

    /// Full argument vector for the design script, in fixed order.
    /// Optional groups appear only when their primary field is set and
    /// boolean flags only when true.
    fn args(&self, request: &Self::Request) -> Vec<String>;

    /// Inner iteration count (cycles per run or trial).
    fn inner_units(&self, request: &Self::Request) -> u64;

    /// outer × inner iteration count, the denominator of every report.
    fn total_units(&self, request: &Self::Request) -> u64;

    /// Match one stdout line against the family's markers, updating the
    /// running position. Returns true when the line should produce a
    /// progress report. Lines that match nothing, or that fail numeric
    /// parsing after a partial match, leave the state untouched.
    fn observe_line(&self, line: &str, state: &mut MarkerState) -> bool;

    /// Locate and parse the result artifact after a zero exit.
    fn resolve_artifacts(
        &self,
        install_dir: &Path,
        request: &Self::Request,
    ) -> Result<Self::Artifacts>;
}

//! Tool registration for the hunter server.
//!
//! Each design scenario is a `HunterTool` registered in a central
//! `ToolRegistry`. Transports invoke tools by name with a flat JSON
//! parameter object; long-running tools stream `(current, total)` pairs
//! to an optional progress sink while they run.
//!
//! Tool lifecycle:
//!   1. Implement `HunterTool` for your type.
//!   2. Register with `ToolRegistry::register`.
//!   3. Transports invoke tools via `ToolRegistry::invoke(name, params, sink)`.

pub mod boltz_tools;
pub mod chai_tools;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use hunter_common::HunterError;
use hunter_engine::boltz::BoltzBackend;
use hunter_engine::chai::ChaiBackend;
use hunter_engine::{DesignEngine, ProgressSink};

pub type BoltzRunner = DesignEngine<BoltzBackend>;
pub type ChaiRunner = DesignEngine<ChaiBackend>;

// ─────────────────────────────────────────────
//  Core trait — implement for each design tool
// ─────────────────────────────────────────────

/// A remotely callable design operation.
///
/// # Minimal contract
/// - `name()` must be unique across the registry (snake_case, e.g.
///   `"ph_design_protein_binder"`).
/// - `description()` is surfaced to the remote caller as the tool docstring.
/// - `parameters_schema()` returns a JSON Schema object for the parameters.
/// - `invoke()` receives flat JSON params and returns a JSON object that
///   always carries a `status` field; job failures are reported there,
///   never raised.
#[async_trait]
pub trait HunterTool: Send + Sync {
    /// Unique tool name (used as the function call identifier).
    fn name(&self) -> &str;

    /// Short description shown to the remote caller.
    fn description(&self) -> &str;

    /// JSON Schema describing the expected input parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool. Progress pairs go to `sink` while the job runs.
    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value>;
}

// ─────────────────────────────────────────────
//  Tool registry
// ─────────────────────────────────────────────

/// Central registry mapping tool names → trait objects.
/// Build once at startup, then share via Arc.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn HunterTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Panics if the name is already registered.
    pub fn register<T: HunterTool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        assert!(
            !self.tools.contains_key(&name),
            "Duplicate tool name: {name}"
        );
        self.tools.insert(name, Arc::new(tool));
    }

    /// Invoke a registered tool by name.
    ///
    /// Returns `Err` only for an unknown name; anything that goes wrong
    /// inside a tool comes back as a structured `status: "error"` value.
    pub async fn invoke(
        &self,
        name: &str,
        params: Value,
        sink: Option<&dyn ProgressSink>,
    ) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {name}"))?;

        tracing::info!(tool = name, "Invoking tool");

        match tool.invoke(params, sink).await {
            Ok(value) => Ok(value),
            Err(e) => Ok(json!({ "status": "error", "error": e.to_string() })),
        }
    }

    /// List all registered tools as a JSON array (for the caller-facing manifest).
    pub fn manifest(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema(),
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get a reference to a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn HunterTool>> {
        self.tools.get(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an engine failure onto the wire shape callers expect.
pub(crate) fn error_value(err: HunterError) -> Value {
    match err {
        HunterError::ProcessFailed { code, stderr } => json!({
            "status": "error",
            "error": format!("Design process failed with return code {code}"),
            "stderr": stderr,
        }),
        HunterError::SummaryUnreadable { path, message } => json!({
            "status": "error",
            "error": format!("Failed to read CSV: {message}"),
            "summary_csv_path": path,
        }),
        other => json!({ "status": "error", "error": other.to_string() }),
    }
}

/// Convenience function: build the default hunter tool registry.
/// Call once at startup and share with the transports.
pub fn build_default_registry(
    boltz: Arc<BoltzRunner>,
    chai: Arc<ChaiRunner>,
    gpu_id: u32,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(boltz_tools::ProteinBinderTool::new(boltz.clone(), gpu_id));
    registry.register(boltz_tools::TemplateBinderTool::new(boltz.clone(), gpu_id));
    registry.register(boltz_tools::ContactsBinderTool::new(boltz.clone(), gpu_id));
    registry.register(boltz_tools::MultimerBinderTool::new(boltz.clone(), gpu_id));
    registry.register(boltz_tools::CyclicPeptideBinderTool::new(boltz.clone(), gpu_id));
    registry.register(boltz_tools::SmallMoleculeBinderTool::new(boltz.clone(), gpu_id));
    registry.register(boltz_tools::NucleicAcidBinderTool::new(boltz.clone(), gpu_id));
    registry.register(boltz_tools::HeterogeneousBinderTool::new(boltz.clone(), gpu_id));
    registry.register(boltz_tools::AdvancedDesignTool::new(boltz, gpu_id));

    registry.register(chai_tools::UnconditionalProteinTool::new(chai.clone(), gpu_id));
    registry.register(chai_tools::ChaiProteinBinderTool::new(chai.clone(), gpu_id));
    registry.register(chai_tools::ChaiCyclicPeptideTool::new(chai.clone(), gpu_id));
    registry.register(chai_tools::ChaiLigandBinderTool::new(chai.clone(), gpu_id));
    registry.register(chai_tools::ChaiAdvancedDesignTool::new(chai, gpu_id));

    tracing::info!("ToolRegistry ready with {} tools", registry.len());
    registry
}

// ─────────────────────────────────────────────
//  Tests
// ─────────────────────────────────────────────

//! Chai design tools: one registry entry per design scenario.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use hunter_engine::chai::{ChaiArtifacts, ChaiRequest};
use hunter_engine::ProgressSink;

use crate::resources::EXAMPLE_GENERIC_TARGET;

use super::{error_value, ChaiRunner, HunterTool};

fn completed_value(jobname: &str, artifacts: ChaiArtifacts) -> Value {
    match artifacts.note {
        // The directory exists but its metadata was unreadable: return
        // the location so the caller can recover the files manually.
        Some(note) => json!({
            "status": "completed",
            "output_dir": artifacts.output_dir,
            "jobname": jobname,
            "note": note,
        }),
        None => json!({
            "status": "completed",
            "output_dir": artifacts.output_dir,
            "jobname": jobname,
            "num_results": artifacts.runs.len(),
            "results": artifacts.runs,
        }),
    }
}

async fn run_design(
    runner: &ChaiRunner,
    request: ChaiRequest,
    sink: Option<&dyn ProgressSink>,
) -> Value {
    let jobname = request.jobname.clone();
    match runner.run(&request, sink).await {
        Ok(artifacts) => completed_value(&jobname, artifacts),
        Err(e) => error_value(e),
    }
}

fn common_request(params: &Value, default_name: &str, gpu_id: u32) -> ChaiRequest {
    let mut request = ChaiRequest::new(params["design_name"].as_str().unwrap_or(default_name));
    request.gpu_id = gpu_id;
    request.n_trials = params["n_trials"].as_u64().unwrap_or(1) as u32;
    request.n_cycles = params["n_cycles"].as_u64().unwrap_or(5) as u32;
    request
}

// ─────────────────────────────────────────────
//  Scenario request builders
// ─────────────────────────────────────────────

pub(crate) fn unconditional_request(params: &Value, gpu_id: u32) -> ChaiRequest {
    let mut request = common_request(params, "unconditional_design", gpu_id);
    request.length = params["target_length"].as_u64().unwrap_or(120) as u32;
    request.percent_x = params["percent_X"].as_u64().unwrap_or(0) as u32;
    request.target_seq = EXAMPLE_GENERIC_TARGET.to_string();
    request
}

pub(crate) fn protein_binder_request(params: &Value, gpu_id: u32) -> ChaiRequest {
    let mut request = common_request(params, "protein_binder", gpu_id);
    request.length = params["target_length"].as_u64().unwrap_or(120) as u32;
    request.percent_x = params["percent_X"].as_u64().unwrap_or(80) as u32;
    request.target_seq = params["target_protein_sequence"]
        .as_str()
        .unwrap_or("")
        .to_string();
    request.use_msa_for_af3 = true;
    request
}

pub(crate) fn cyclic_peptide_request(params: &Value, gpu_id: u32) -> ChaiRequest {
    let mut request = common_request(params, "cyclic_peptide_binder", gpu_id);
    request.length = params["target_length"].as_u64().unwrap_or(15) as u32;
    request.percent_x = params["percent_X"].as_u64().unwrap_or(80) as u32;
    request.target_seq = params["target_protein_sequence"]
        .as_str()
        .unwrap_or("")
        .to_string();
    request.cyclic = true;
    request.use_msa_for_af3 = true;
    request
}

pub(crate) fn ligand_binder_request(params: &Value, gpu_id: u32) -> ChaiRequest {
    let mut request = common_request(params, "ligand_binder", gpu_id);
    request.length = params["target_length"].as_u64().unwrap_or(120) as u32;
    request.percent_x = params["percent_X"].as_u64().unwrap_or(50) as u32;
    request.target_seq = params["ligand_smiles"].as_str().unwrap_or("").to_string();
    request.hysteresis_mode = "esm".to_string();
    request.temperature = 0.01;
    request
}

pub(crate) fn advanced_request(params: &Value, gpu_id: u32) -> ChaiRequest {
    let mut request = ChaiRequest::new(params["jobname"].as_str().unwrap_or("design"));
    request.gpu_id = gpu_id;
    request.length = params["length"].as_u64().unwrap_or(120) as u32;
    request.percent_x = params["percent_X"].as_u64().unwrap_or(0) as u32;
    request.seq = params["seq"].as_str().unwrap_or("").to_string();
    request.target_seq = params["target_seq"].as_str().unwrap_or("").to_string();
    request.n_trials = params["n_trials"].as_u64().unwrap_or(1) as u32;
    request.n_cycles = params["n_cycles"].as_u64().unwrap_or(5) as u32;
    request.cyclic = params["cyclic"].as_bool().unwrap_or(false);
    request.n_recycles = params["n_recycles"].as_u64().unwrap_or(3) as u32;
    request.n_diff_steps = params["n_diff_steps"].as_u64().unwrap_or(200) as u32;
    request.hysteresis_mode = params["hysteresis_mode"]
        .as_str()
        .unwrap_or("templates")
        .to_string();
    request.repredict = params["repredict"].as_bool().unwrap_or(true);
    request.omit_aa = params["omit_aa"].as_str().unwrap_or("").to_string();
    request.bias_aa = params["bias_aa"].as_str().map(|b| b.to_string());
    request.temperature = params["temperature"].as_f64().unwrap_or(0.1);
    request.scale_temp_by_plddt = params["scale_temp_by_plddt"].as_bool().unwrap_or(true);
    request.render_freq = params["render_freq"].as_u64().unwrap_or(100) as u32;
    request.use_msa_for_af3 = params["use_msa_for_af3"].as_bool().unwrap_or(false);
    request.plot = params["plot"].as_bool().unwrap_or(true);
    request
}

fn count_properties() -> Value {
    json!({
        "design_name": { "type": "string", "description": "Name for this design run" },
        "target_length": { "type": "integer", "default": 120 },
        "percent_X": { "type": "integer", "description": "Percentage of X residues in the starting sequence" },
        "n_trials": { "type": "integer", "default": 1, "minimum": 1 },
        "n_cycles": { "type": "integer", "default": 5, "minimum": 1 }
    })
}

fn merge_schema(required: &[&str], extra: Value) -> Value {
    let mut properties = count_properties();
    if let (Some(base), Some(add)) = (properties.as_object_mut(), extra.as_object()) {
        for (key, value) in add {
            base.insert(key.clone(), value.clone());
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

// ─────────────────────────────────────────────
//  Tools
// ─────────────────────────────────────────────

pub struct UnconditionalProteinTool {
    runner: Arc<ChaiRunner>,
    gpu_id: u32,
}

impl UnconditionalProteinTool {
    pub fn new(runner: Arc<ChaiRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for UnconditionalProteinTool {
    fn name(&self) -> &str {
        "ph_chai_design_unconditional_protein"
    }

    fn description(&self) -> &str {
        "Design de novo proteins of a desired length without a specific target. \
         Long-running: 5-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(&[], json!({}))
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = unconditional_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct ChaiProteinBinderTool {
    runner: Arc<ChaiRunner>,
    gpu_id: u32,
}

impl ChaiProteinBinderTool {
    pub fn new(runner: Arc<ChaiRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for ChaiProteinBinderTool {
    fn name(&self) -> &str {
        "ph_chai_design_protein_binder"
    }

    fn description(&self) -> &str {
        "Design a protein binder for a target protein with the Chai pipeline. \
         Long-running: 5-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["target_protein_sequence"],
            json!({
                "target_protein_sequence": {
                    "type": "string",
                    "description": "Target protein sequence to design a binder for"
                }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = protein_binder_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct ChaiCyclicPeptideTool {
    runner: Arc<ChaiRunner>,
    gpu_id: u32,
}

impl ChaiCyclicPeptideTool {
    pub fn new(runner: Arc<ChaiRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for ChaiCyclicPeptideTool {
    fn name(&self) -> &str {
        "ph_chai_design_cyclic_peptide_binder"
    }

    fn description(&self) -> &str {
        "Design a short cyclic peptide binder with the Chai pipeline. \
         Long-running: 5-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["target_protein_sequence"],
            json!({
                "target_protein_sequence": { "type": "string" }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = cyclic_peptide_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct ChaiLigandBinderTool {
    runner: Arc<ChaiRunner>,
    gpu_id: u32,
}

impl ChaiLigandBinderTool {
    pub fn new(runner: Arc<ChaiRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for ChaiLigandBinderTool {
    fn name(&self) -> &str {
        "ph_chai_design_ligand_binder"
    }

    fn description(&self) -> &str {
        "Design a protein that binds a small molecule given as a SMILES string. \
         Long-running: 5-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["ligand_smiles"],
            json!({
                "ligand_smiles": {
                    "type": "string",
                    "description": "SMILES string for the target ligand"
                }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = ligand_binder_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct ChaiAdvancedDesignTool {
    runner: Arc<ChaiRunner>,
    gpu_id: u32,
}

impl ChaiAdvancedDesignTool {
    pub fn new(runner: Arc<ChaiRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for ChaiAdvancedDesignTool {
    fn name(&self) -> &str {
        "ph_chai_design_protein_advanced"
    }

    fn description(&self) -> &str {
        "Chai design with the full parameter surface, for fine-grained control. \
         Long-running: 5-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "jobname": { "type": "string", "description": "Name for this design run" },
                "length": { "type": "integer", "default": 120 },
                "percent_X": { "type": "integer", "default": 0 },
                "seq": { "type": "string", "default": "" },
                "target_seq": { "type": "string", "default": "" },
                "n_trials": { "type": "integer", "default": 1 },
                "n_cycles": { "type": "integer", "default": 5 },
                "cyclic": { "type": "boolean", "default": false },
                "n_recycles": { "type": "integer", "default": 3 },
                "n_diff_steps": { "type": "integer", "default": 200 },
                "hysteresis_mode": {
                    "type": "string",
                    "enum": ["templates", "esm", "partial_diffusion", "none"],
                    "default": "templates"
                },
                "repredict": { "type": "boolean", "default": true },
                "omit_aa": { "type": "string", "default": "" },
                "bias_aa": { "type": "string", "description": "e.g. \"A:-2.0,P:-1.0\"" },
                "temperature": { "type": "number", "default": 0.1 },
                "scale_temp_by_plddt": { "type": "boolean", "default": true },
                "render_freq": { "type": "integer", "default": 100 },
                "use_msa_for_af3": { "type": "boolean", "default": false },
                "plot": { "type": "boolean", "default": true }
            },
            "required": ["jobname"]
        })
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = advanced_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

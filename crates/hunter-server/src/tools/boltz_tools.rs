//! Boltz design tools: one registry entry per design scenario.
//!
//! Every tool here is a thin mapping from caller-facing parameters onto
//! the canonical [`BoltzRequest`]; the shared engine does the rest.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use hunter_engine::boltz::{
    BoltzRequest, ContactSpec, LigandTarget, NucleicTarget, ProteinTarget, TemplateSpec,
};
use hunter_engine::ProgressSink;

use super::{error_value, BoltzRunner, HunterTool};

async fn run_design(
    runner: &BoltzRunner,
    request: BoltzRequest,
    sink: Option<&dyn ProgressSink>,
) -> Value {
    match runner.run(&request, sink).await {
        Ok(artifacts) => json!({
            "status": "completed",
            "summary_csv_path": artifacts.summary_csv,
            "output_dir": artifacts.output_dir,
            "num_results": artifacts.rows.len(),
            "results": artifacts.rows,
        }),
        Err(e) => error_value(e),
    }
}

fn common_request(params: &Value, default_name: &str, gpu_id: u32) -> BoltzRequest {
    let mut request = BoltzRequest::new(params["design_name"].as_str().unwrap_or(default_name));
    request.gpu_id = gpu_id;
    request.num_designs = params["num_designs"].as_u64().unwrap_or(1) as u32;
    request.num_cycles = params["num_cycles"].as_u64().unwrap_or(7) as u32;
    request
}

fn protein_target(seqs: &str, ids: &str) -> Option<ProteinTarget> {
    if seqs.is_empty() {
        return None;
    }
    Some(ProteinTarget {
        seqs: seqs.to_string(),
        ids: ids.to_string(),
        msas: String::new(),
    })
}

fn count_properties() -> Value {
    json!({
        "design_name": { "type": "string", "description": "Name for this design run" },
        "num_designs": { "type": "integer", "default": 1, "minimum": 1 },
        "num_cycles":  { "type": "integer", "default": 7, "minimum": 1 }
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
//  Scenario request builders
// ─────────────────────────────────────────────

pub(crate) fn binder_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = common_request(params, "protein_binder", gpu_id);
    request.protein = protein_target(
        params["target_protein_sequence"].as_str().unwrap_or(""),
        "B",
    );
    request
}

pub(crate) fn template_binder_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = common_request(params, "protein_binder_template", gpu_id);
    request.protein = protein_target(
        params["target_protein_sequence"].as_str().unwrap_or(""),
        "B",
    );
    let template_path = params["template_pdb_code"].as_str().unwrap_or("");
    if !template_path.is_empty() {
        request.template = Some(TemplateSpec {
            path: template_path.to_string(),
            chain_id: Some(params["template_chain_id"].as_str().unwrap_or("B").to_string()),
            cif_chain_id: Some(
                params["template_cif_chain_id"]
                    .as_str()
                    .unwrap_or("B")
                    .to_string(),
            ),
        });
    }
    request
}

pub(crate) fn contacts_binder_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = common_request(params, "protein_binder_contacts", gpu_id);
    request.protein = protein_target(
        params["target_protein_sequence"].as_str().unwrap_or(""),
        "B",
    );
    let residues = params["contact_residues"].as_str().unwrap_or("");
    if !residues.is_empty() {
        request.contacts = Some(ContactSpec {
            residues: residues.to_string(),
            add_constraints: true,
        });
    }
    request
}

pub(crate) fn multimer_binder_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = common_request(params, "multimer_binder", gpu_id);
    request.protein = protein_target(
        params["target_protein_sequences"].as_str().unwrap_or(""),
        params["protein_chain_ids"].as_str().unwrap_or("B:C"),
    );
    request
}

pub(crate) fn cyclic_peptide_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = common_request(params, "cyclic_peptide_binder", gpu_id);
    request.protein = protein_target(
        params["target_protein_sequence"].as_str().unwrap_or(""),
        "B",
    );
    request.min_design_protein_length = 10;
    request.max_design_protein_length = 20;
    request.high_iptm_threshold = 0.8;
    request.cyclic = true;
    request
}

pub(crate) fn small_molecule_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = common_request(params, "small_molecule_binder", gpu_id);
    let ccd = params["ligand_ccd_code"].as_str().unwrap_or("");
    if !ccd.is_empty() {
        request.ligand = Some(LigandTarget {
            ccd: ccd.to_string(),
            id: Some(params["ligand_chain_id"].as_str().unwrap_or("B").to_string()),
        });
    }
    request.min_design_protein_length = 130;
    request.max_design_protein_length = 150;
    request
}

pub(crate) fn nucleic_acid_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = common_request(params, "nucleic_acid_binder", gpu_id);
    let seq = params["nucleic_acid_sequence"].as_str().unwrap_or("");
    if !seq.is_empty() {
        request.nucleic = Some(NucleicTarget {
            seq: seq.to_string(),
            kind: params["nucleic_acid_type"].as_str().map(|k| k.to_string()),
            id: Some(params["nucleic_chain_id"].as_str().unwrap_or("B").to_string()),
        });
    }
    request.min_design_protein_length = 130;
    request.max_design_protein_length = 150;
    request
}

pub(crate) fn heterogeneous_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = common_request(params, "heterogeneous_binder", gpu_id);
    request.protein = protein_target(
        params["target_protein_sequence"].as_str().unwrap_or(""),
        params["protein_chain_id"].as_str().unwrap_or("B"),
    );
    let ccd = params["ligand_ccd_code"].as_str().unwrap_or("");
    if !ccd.is_empty() {
        request.ligand = Some(LigandTarget {
            ccd: ccd.to_string(),
            id: Some(params["ligand_chain_id"].as_str().unwrap_or("C").to_string()),
        });
    }
    request.high_iptm_threshold = 0.8;
    request
}

pub(crate) fn advanced_request(params: &Value, gpu_id: u32) -> BoltzRequest {
    let mut request = BoltzRequest::new(params["name"].as_str().unwrap_or("design"));
    request.gpu_id = gpu_id;
    request.num_designs = params["num_designs"].as_u64().unwrap_or(1) as u32;
    request.num_cycles = params["num_cycles"].as_u64().unwrap_or(7) as u32;

    request.protein = protein_target(
        params["protein_seqs"].as_str().unwrap_or(""),
        params["protein_ids"].as_str().unwrap_or("B"),
    );
    if let (Some(protein), Some(msas)) = (&mut request.protein, params["protein_msas"].as_str()) {
        protein.msas = msas.to_string();
    }

    let template_path = params["template_path"].as_str().unwrap_or("");
    if !template_path.is_empty() {
        request.template = Some(TemplateSpec {
            path: template_path.to_string(),
            chain_id: params["template_chain_id"].as_str().map(|c| c.to_string()),
            cif_chain_id: params["template_cif_chain_id"].as_str().map(|c| c.to_string()),
        });
    }

    let residues = params["contact_residues"].as_str().unwrap_or("");
    if !residues.is_empty() {
        request.contacts = Some(ContactSpec {
            residues: residues.to_string(),
            add_constraints: params["add_constraints"].as_bool().unwrap_or(false),
        });
    }

    let ccd = params["ligand_ccd"].as_str().unwrap_or("");
    if !ccd.is_empty() {
        request.ligand = Some(LigandTarget {
            ccd: ccd.to_string(),
            id: params["ligand_id"].as_str().map(|c| c.to_string()),
        });
    }

    let nucleic_seq = params["nucleic_seq"].as_str().unwrap_or("");
    if !nucleic_seq.is_empty() {
        request.nucleic = Some(NucleicTarget {
            seq: nucleic_seq.to_string(),
            kind: params["nucleic_type"].as_str().map(|k| k.to_string()),
            id: params["nucleic_id"].as_str().map(|c| c.to_string()),
        });
    }

    request.min_design_protein_length =
        params["min_design_protein_length"].as_u64().unwrap_or(90) as u32;
    request.max_design_protein_length =
        params["max_design_protein_length"].as_u64().unwrap_or(150) as u32;
    request.high_iptm_threshold = params["high_iptm_threshold"].as_f64().unwrap_or(0.7);
    request.percent_x = params["percent_X"].as_u64().unwrap_or(100) as u32;
    request.cyclic = params["cyclic"].as_bool().unwrap_or(false);
    request.use_msa_for_af3 = params["use_msa_for_af3"].as_bool().unwrap_or(true);
    request.plot = params["plot"].as_bool().unwrap_or(true);
    request
}

// ─────────────────────────────────────────────
//  Tools
// ─────────────────────────────────────────────

pub struct ProteinBinderTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl ProteinBinderTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for ProteinBinderTool {
    fn name(&self) -> &str {
        "ph_design_protein_binder"
    }

    fn description(&self) -> &str {
        "Design a protein binder for a target protein sequence. \
         Long-running: 7-10 minutes per design on an H100 GPU."
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
        let request = binder_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct TemplateBinderTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl TemplateBinderTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for TemplateBinderTool {
    fn name(&self) -> &str {
        "ph_design_protein_binder_with_template"
    }

    fn description(&self) -> &str {
        "Design a protein binder guided by a template PDB structure. \
         Long-running: 7-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["target_protein_sequence", "template_pdb_code"],
            json!({
                "target_protein_sequence": { "type": "string" },
                "template_pdb_code": {
                    "type": "string",
                    "description": "PDB code for the template structure, e.g. 8ZNL"
                },
                "template_chain_id": { "type": "string", "default": "B" },
                "template_cif_chain_id": { "type": "string", "default": "B" }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = template_binder_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct ContactsBinderTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl ContactsBinderTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for ContactsBinderTool {
    fn name(&self) -> &str {
        "ph_design_protein_binder_with_contacts"
    }

    fn description(&self) -> &str {
        "Design a protein binder targeting specific residue positions. \
         Long-running: 7-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["target_protein_sequence", "contact_residues"],
            json!({
                "target_protein_sequence": { "type": "string" },
                "contact_residues": {
                    "type": "string",
                    "description": "Comma-separated residue positions, e.g. \"29,277,279,293\""
                }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = contacts_binder_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct MultimerBinderTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl MultimerBinderTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for MultimerBinderTool {
    fn name(&self) -> &str {
        "ph_design_multimer_binder"
    }

    fn description(&self) -> &str {
        "Design a binder for a multimeric protein target such as a dimer. \
         Long-running: 7-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["target_protein_sequences"],
            json!({
                "target_protein_sequences": {
                    "type": "string",
                    "description": "Target sequences separated by ':', e.g. \"SEQ1:SEQ2\""
                },
                "protein_chain_ids": { "type": "string", "default": "B:C" }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = multimer_binder_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct CyclicPeptideBinderTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl CyclicPeptideBinderTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for CyclicPeptideBinderTool {
    fn name(&self) -> &str {
        "ph_design_cyclic_peptide_binder"
    }

    fn description(&self) -> &str {
        "Design a short cyclic peptide (10-20 residues) that binds a target protein. \
         Long-running: 7-10 minutes per design on an H100 GPU."
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

pub struct SmallMoleculeBinderTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl SmallMoleculeBinderTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for SmallMoleculeBinderTool {
    fn name(&self) -> &str {
        "ph_design_small_molecule_binder"
    }

    fn description(&self) -> &str {
        "Design a protein that binds a small molecule given by CCD code (e.g. \"SAM\"). \
         Long-running: 7-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["ligand_ccd_code"],
            json!({
                "ligand_ccd_code": {
                    "type": "string",
                    "description": "Chemical Component Dictionary code, e.g. \"SAM\" or \"ATP\""
                },
                "ligand_chain_id": { "type": "string", "default": "B" }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = small_molecule_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct NucleicAcidBinderTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl NucleicAcidBinderTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for NucleicAcidBinderTool {
    fn name(&self) -> &str {
        "ph_design_nucleic_acid_binder"
    }

    fn description(&self) -> &str {
        "Design a protein that binds a DNA or RNA sequence. \
         Long-running: 7-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["nucleic_acid_sequence", "nucleic_acid_type"],
            json!({
                "nucleic_acid_sequence": { "type": "string", "description": "DNA or RNA sequence" },
                "nucleic_acid_type": { "type": "string", "enum": ["dna", "rna"] },
                "nucleic_chain_id": { "type": "string", "default": "B" }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = nucleic_acid_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct HeterogeneousBinderTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl HeterogeneousBinderTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for HeterogeneousBinderTool {
    fn name(&self) -> &str {
        "ph_design_heterogeneous_binder"
    }

    fn description(&self) -> &str {
        "Design a binder for a protein and a small molecule simultaneously. \
         Long-running: 7-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        merge_schema(
            &["target_protein_sequence", "ligand_ccd_code"],
            json!({
                "target_protein_sequence": { "type": "string" },
                "ligand_ccd_code": { "type": "string" },
                "protein_chain_id": { "type": "string", "default": "B" },
                "ligand_chain_id": { "type": "string", "default": "C" }
            }),
        )
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = heterogeneous_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

pub struct AdvancedDesignTool {
    runner: Arc<BoltzRunner>,
    gpu_id: u32,
}

impl AdvancedDesignTool {
    pub fn new(runner: Arc<BoltzRunner>, gpu_id: u32) -> Self {
        Self { runner, gpu_id }
    }
}

#[async_trait]
impl HunterTool for AdvancedDesignTool {
    fn name(&self) -> &str {
        "ph_design_protein_advanced"
    }

    fn description(&self) -> &str {
        "Boltz design with the full parameter surface, for fine-grained control. \
         Long-running: 7-10 minutes per design on an H100 GPU."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name for this design run" },
                "num_designs": { "type": "integer", "default": 1 },
                "num_cycles": { "type": "integer", "default": 7 },
                "protein_seqs": { "type": "string", "description": "Colon-separated target sequences" },
                "protein_ids": { "type": "string", "default": "B" },
                "protein_msas": { "type": "string", "default": "" },
                "template_path": { "type": "string" },
                "template_chain_id": { "type": "string" },
                "template_cif_chain_id": { "type": "string" },
                "contact_residues": { "type": "string" },
                "add_constraints": { "type": "boolean", "default": false },
                "ligand_ccd": { "type": "string" },
                "ligand_id": { "type": "string" },
                "nucleic_seq": { "type": "string" },
                "nucleic_type": { "type": "string", "enum": ["dna", "rna"] },
                "nucleic_id": { "type": "string" },
                "min_design_protein_length": { "type": "integer", "default": 90 },
                "max_design_protein_length": { "type": "integer", "default": 150 },
                "high_iptm_threshold": { "type": "number", "default": 0.7 },
                "percent_X": { "type": "integer", "default": 100 },
                "cyclic": { "type": "boolean", "default": false },
                "use_msa_for_af3": { "type": "boolean", "default": true },
                "plot": { "type": "boolean", "default": true }
            },
            "required": ["name"]
        })
    }

    async fn invoke(&self, params: Value, sink: Option<&dyn ProgressSink>) -> Result<Value> {
        let request = advanced_request(&params, self.gpu_id);
        Ok(run_design(&self.runner, request, sink).await)
    }
}

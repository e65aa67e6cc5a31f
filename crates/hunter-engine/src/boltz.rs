//! Boltz design family: argument vocabulary, progress markers, and the
//! tabular summary artifact.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde_json::Value;

use hunter_common::{HunterError, Result};

use crate::backend::{DesignBackend, MarkerState};

/// Directory under the install root where the Boltz pipeline writes one
/// subdirectory per named design run.
pub const RESULTS_DIR: &str = "results_boltz";

/// Summary file the pipeline writes for designs passing the iPTM filter.
pub const SUMMARY_FILE: &str = "summary_high_iptm.csv";

/// Protein target chains, colon-separated for multimers.
#[derive(Debug, Clone)]
pub struct ProteinTarget {
    pub seqs: String,
    pub ids: String,
    pub msas: String,
}

/// Template structure guiding the design.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    /// PDB code or path to the template structure.
    pub path: String,
    pub chain_id: Option<String>,
    pub cif_chain_id: Option<String>,
}

/// Target residue positions the binder should contact.
#[derive(Debug, Clone)]
pub struct ContactSpec {
    /// Comma-separated residue positions, e.g. "29,277,279,293".
    pub residues: String,
    pub add_constraints: bool,
}

/// Small-molecule target by Chemical Component Dictionary code.
#[derive(Debug, Clone)]
pub struct LigandTarget {
    pub ccd: String,
    pub id: Option<String>,
}

/// DNA or RNA target.
#[derive(Debug, Clone)]
pub struct NucleicTarget {
    pub seq: String,
    /// "dna" or "rna".
    pub kind: Option<String>,
    pub id: Option<String>,
}

/// Immutable parameter record for one Boltz design job.
#[derive(Debug, Clone)]
pub struct BoltzRequest {
    pub name: String,
    pub num_designs: u32,
    pub num_cycles: u32,
    pub gpu_id: u32,
    pub protein: Option<ProteinTarget>,
    pub template: Option<TemplateSpec>,
    pub contacts: Option<ContactSpec>,
    pub ligand: Option<LigandTarget>,
    pub nucleic: Option<NucleicTarget>,
    pub min_design_protein_length: u32,
    pub max_design_protein_length: u32,
    pub high_iptm_threshold: f64,
    pub percent_x: u32,
    pub cyclic: bool,
    pub use_msa_for_af3: bool,
    pub plot: bool,
}

impl BoltzRequest {
    /// A request with the pipeline's stock defaults and no targets.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_designs: 1,
            num_cycles: 7,
            gpu_id: 0,
            protein: None,
            template: None,
            contacts: None,
            ligand: None,
            nucleic: None,
            min_design_protein_length: 90,
            max_design_protein_length: 150,
            high_iptm_threshold: 0.7,
            percent_x: 100,
            cyclic: false,
            use_msa_for_af3: true,
            plot: true,
        }
    }
}

/// One row of the summary CSV, keyed by the header line.
pub type SummaryRow = serde_json::Map<String, Value>;

/// Parsed Boltz result set.
#[derive(Debug)]
pub struct BoltzArtifacts {
    pub summary_csv: PathBuf,
    pub output_dir: PathBuf,
    pub rows: Vec<SummaryRow>,
}

/// Marker grammar and artifact layout of the Boltz design script.
pub struct BoltzBackend {
    run_marker: Regex,
    cycle_marker: Regex,
}

impl BoltzBackend {
    pub fn new() -> Self {
        Self {
            // "=== Starting Design Run 2/5 ==="
            run_marker: Regex::new(r"=== Starting Design Run\s+(\d+)").unwrap(),
            // "--- Run 2, Cycle 3 ---"
            cycle_marker: Regex::new(r"---\s*Run\s+(\d+)\s*,\s*Cycle\s+(\d+)").unwrap(),
        }
    }
}

impl Default for BoltzBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignBackend for BoltzBackend {
    type Request = BoltzRequest;
    type Artifacts = BoltzArtifacts;

    fn family(&self) -> &'static str {
        "boltz"
    }

    fn script(&self) -> &str {
        "boltz_ph/design.py"
    }

    fn args(&self, request: &BoltzRequest) -> Vec<String> {
        let mut args = vec![
            "--num_designs".to_string(),
            request.num_designs.to_string(),
            "--num_cycles".to_string(),
            request.num_cycles.to_string(),
            "--gpu_id".to_string(),
            request.gpu_id.to_string(),
            "--name".to_string(),
            request.name.clone(),
            "--min_design_protein_length".to_string(),
            request.min_design_protein_length.to_string(),
            "--max_design_protein_length".to_string(),
            request.max_design_protein_length.to_string(),
            "--high_iptm_threshold".to_string(),
            request.high_iptm_threshold.to_string(),
            "--percent_X".to_string(),
            request.percent_x.to_string(),
        ];

        if let Some(protein) = &request.protein {
            args.extend([
                "--protein_seqs".to_string(),
                protein.seqs.clone(),
                "--protein_ids".to_string(),
                protein.ids.clone(),
                "--protein_msas".to_string(),
                protein.msas.clone(),
            ]);
        }

        if let Some(template) = &request.template {
            args.extend(["--template_path".to_string(), template.path.clone()]);
            if let Some(chain_id) = &template.chain_id {
                args.extend(["--template_chain_id".to_string(), chain_id.clone()]);
            }
            if let Some(cif_chain_id) = &template.cif_chain_id {
                args.extend(["--template_cif_chain_id".to_string(), cif_chain_id.clone()]);
            }
        }

        if let Some(contacts) = &request.contacts {
            args.extend(["--contact_residues".to_string(), contacts.residues.clone()]);
            if contacts.add_constraints {
                args.push("--add_constraints".to_string());
            }
        }

        if let Some(ligand) = &request.ligand {
            args.extend(["--ligand_ccd".to_string(), ligand.ccd.clone()]);
            if let Some(id) = &ligand.id {
                args.extend(["--ligand_id".to_string(), id.clone()]);
            }
        }

        if let Some(nucleic) = &request.nucleic {
            args.extend(["--nucleic_seq".to_string(), nucleic.seq.clone()]);
            if let Some(kind) = &nucleic.kind {
                args.extend(["--nucleic_type".to_string(), kind.clone()]);
            }
            if let Some(id) = &nucleic.id {
                args.extend(["--nucleic_id".to_string(), id.clone()]);
            }
        }

        if request.cyclic {
            args.push("--cyclic".to_string());
        }
        if request.use_msa_for_af3 {
            args.push("--use_msa_for_af3".to_string());
        }
        if request.plot {
            args.push("--plot".to_string());
        }

        args
    }

    fn inner_units(&self, request: &BoltzRequest) -> u64 {
        u64::from(request.num_cycles)
    }

    fn total_units(&self, request: &BoltzRequest) -> u64 {
        u64::from(request.num_designs) * u64::from(request.num_cycles)
    }

    fn observe_line(&self, line: &str, state: &mut MarkerState) -> bool {
        if let Some(caps) = self.cycle_marker.captures(line) {
            let run = caps[1].parse::<u64>();
            let cycle = caps[2].parse::<u64>();
            if let (Ok(run), Ok(cycle)) = (run, cycle) {
                state.outer = run;
                state.inner = cycle;
                return true;
            }
            return false;
        }
        if let Some(caps) = self.run_marker.captures(line) {
            // Run-start lines only reposition the outer counter; the
            // first cycle line of the run produces the next report.
            if let Ok(run) = caps[1].parse::<u64>() {
                state.outer = run;
            }
        }
        false
    }

    fn resolve_artifacts(
        &self,
        install_dir: &Path,
        request: &BoltzRequest,
    ) -> Result<BoltzArtifacts> {
        let output_dir = install_dir.join(RESULTS_DIR).join(&request.name);
        let summary_csv = output_dir.join(SUMMARY_FILE);

        if !summary_csv.exists() {
            return Err(HunterError::ArtifactMissing {
                what: "Summary CSV",
                path: summary_csv,
            });
        }

        let rows = read_summary(&summary_csv).map_err(|e| HunterError::SummaryUnreadable {
            path: summary_csv.clone(),
            message: e.to_string(),
        })?;

        Ok(BoltzArtifacts {
            summary_csv,
            output_dir,
            rows,
        })
    }
}

/// Read the summary CSV into ordered header→value rows.
fn read_summary(path: &Path) -> anyhow::Result<Vec<SummaryRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = SummaryRow::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), Value::String(field.to_string()));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> BoltzBackend {
        BoltzBackend::new()
    }

    #[test]
    fn test_required_args_in_fixed_order() {
        let request = BoltzRequest::new("pdl1_binder");
        let args = backend().args(&request);
        assert_eq!(
            &args[..8],
            &[
                "--num_designs",
                "1",
                "--num_cycles",
                "7",
                "--gpu_id",
                "0",
                "--name",
                "pdl1_binder"
            ]
        );
        assert!(args.contains(&"--percent_X".to_string()));
    }

    #[test]
    fn test_optional_groups_absent_without_primary_field() {
        let request = BoltzRequest::new("bare");
        let args = backend().args(&request);
        for flag in [
            "--protein_seqs",
            "--template_path",
            "--contact_residues",
            "--ligand_ccd",
            "--nucleic_seq",
        ] {
            assert!(!args.contains(&flag.to_string()), "unexpected {flag}");
        }
    }

    #[test]
    fn test_protein_group_emitted_as_a_unit() {
        let mut request = BoltzRequest::new("binder");
        request.protein = Some(ProteinTarget {
            seqs: "MKV:MKL".to_string(),
            ids: "B:C".to_string(),
            msas: String::new(),
        });
        let args = backend().args(&request);
        let at = args.iter().position(|a| a == "--protein_seqs").unwrap();
        assert_eq!(
            &args[at..at + 6],
            &["--protein_seqs", "MKV:MKL", "--protein_ids", "B:C", "--protein_msas", ""]
        );
    }

    #[test]
    fn test_template_subfields_emitted_individually() {
        let mut request = BoltzRequest::new("templated");
        request.template = Some(TemplateSpec {
            path: "8ZNL".to_string(),
            chain_id: Some("B".to_string()),
            cif_chain_id: None,
        });
        let args = backend().args(&request);
        assert!(args.contains(&"--template_path".to_string()));
        assert!(args.contains(&"--template_chain_id".to_string()));
        assert!(!args.contains(&"--template_cif_chain_id".to_string()));
    }

    #[test]
    fn test_boolean_flags_only_when_true() {
        let mut request = BoltzRequest::new("flags");
        request.cyclic = false;
        request.use_msa_for_af3 = false;
        request.plot = false;
        let args = backend().args(&request);
        assert!(!args.contains(&"--cyclic".to_string()));
        assert!(!args.contains(&"--use_msa_for_af3".to_string()));
        assert!(!args.contains(&"--plot".to_string()));

        request.cyclic = true;
        request.contacts = Some(ContactSpec {
            residues: "29,277".to_string(),
            add_constraints: true,
        });
        let args = backend().args(&request);
        assert!(args.contains(&"--cyclic".to_string()));
        assert!(args.contains(&"--add_constraints".to_string()));
        // No explicit false form exists.
        assert!(!args.iter().any(|a| a.contains("=false") || a.contains("no-")));
    }

    #[test]
    fn test_cycle_marker_updates_and_reports() {
        let backend = backend();
        let mut state = MarkerState::default();
        assert!(!backend.observe_line("=== Starting Design Run 2/5 ===", &mut state));
        assert_eq!(state.outer, 2);
        assert!(backend.observe_line("--- Run 2, Cycle 3 ---", &mut state));
        assert_eq!(state, MarkerState { outer: 2, inner: 3 });
    }

    #[test]
    fn test_unrelated_lines_are_ignored() {
        let backend = backend();
        let mut state = MarkerState::default();
        assert!(!backend.observe_line("loading model weights...", &mut state));
        assert!(!backend.observe_line("--- Run x, Cycle y ---", &mut state));
        assert_eq!(state, MarkerState::default());
    }

    #[test]
    fn test_resolve_reads_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(RESULTS_DIR).join("demo");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(
            out.join(SUMMARY_FILE),
            "design,iptm,sequence\nrun_0,0.82,MKVL\nrun_1,0.91,MKIL\n",
        )
        .unwrap();

        let request = BoltzRequest::new("demo");
        let artifacts = backend().resolve_artifacts(dir.path(), &request).unwrap();
        assert_eq!(artifacts.rows.len(), 2);
        assert_eq!(artifacts.rows[0]["design"], "run_0");
        assert_eq!(artifacts.rows[1]["iptm"], "0.91");
        assert_eq!(artifacts.summary_csv, out.join(SUMMARY_FILE));
    }

    #[test]
    fn test_resolve_missing_summary_names_expected_path() {
        let dir = tempfile::tempdir().unwrap();
        let request = BoltzRequest::new("absent");
        let err = backend().resolve_artifacts(dir.path(), &request).unwrap_err();
        match err {
            HunterError::ArtifactMissing { path, .. } => {
                assert!(path.ends_with("results_boltz/absent/summary_high_iptm.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_unreadable_summary_keeps_location() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(RESULTS_DIR).join("ragged");
        std::fs::create_dir_all(&out).unwrap();
        // Ragged row: more fields than headers.
        std::fs::write(out.join(SUMMARY_FILE), "a,b\n1,2,3\n").unwrap();

        let request = BoltzRequest::new("ragged");
        let err = backend().resolve_artifacts(dir.path(), &request).unwrap_err();
        match err {
            HunterError::SummaryUnreadable { path, .. } => {
                assert_eq!(path, out.join(SUMMARY_FILE));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Chai design family: argument vocabulary, progress markers, and the
//! directory-of-runs artifact.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use hunter_common::{HunterError, Result};

use crate::backend::{DesignBackend, MarkerState};

/// Output roots probed in order under the install root. The second entry
/// matches an older layout some Protein-Hunter builds write.
pub const DEFAULT_RESULT_DIRS: [&str; 2] = ["results_chai", "outputs"];

/// Immutable parameter record for one Chai design job.
#[derive(Debug, Clone)]
pub struct ChaiRequest {
    pub jobname: String,
    pub length: u32,
    pub percent_x: u32,
    /// Starting sequence for the designed chain, may be empty.
    pub seq: String,
    /// Target protein sequence or ligand SMILES, may be empty.
    pub target_seq: String,
    pub n_trials: u32,
    pub n_cycles: u32,
    pub gpu_id: u32,
    pub cyclic: bool,
    pub n_recycles: u32,
    pub n_diff_steps: u32,
    /// "templates", "esm", "partial_diffusion", or "none".
    pub hysteresis_mode: String,
    pub repredict: bool,
    pub omit_aa: String,
    pub bias_aa: Option<String>,
    pub temperature: f64,
    pub scale_temp_by_plddt: bool,
    pub render_freq: u32,
    pub use_msa_for_af3: bool,
    pub plot: bool,
}

impl ChaiRequest {
    /// A request with the pipeline's stock defaults and no target.
    pub fn new(jobname: impl Into<String>) -> Self {
        Self {
            jobname: jobname.into(),
            length: 120,
            percent_x: 0,
            seq: String::new(),
            target_seq: String::new(),
            n_trials: 1,
            n_cycles: 5,
            gpu_id: 0,
            cyclic: false,
            n_recycles: 3,
            n_diff_steps: 200,
            hysteresis_mode: "templates".to_string(),
            repredict: true,
            omit_aa: String::new(),
            bias_aa: None,
            temperature: 0.1,
            scale_temp_by_plddt: true,
            render_freq: 100,
            use_msa_for_af3: false,
            plot: true,
        }
    }
}

/// What one `run_*` subdirectory yielded.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub run: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdb_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
}

/// Parsed Chai result set.
#[derive(Debug)]
pub struct ChaiArtifacts {
    pub output_dir: PathBuf,
    pub runs: Vec<RunRecord>,
    /// Set when the directory was found but its metadata could not be
    /// read; the location is still worth returning to the caller.
    pub note: Option<String>,
}

/// Marker grammar and artifact layout of the Chai design script.
pub struct ChaiBackend {
    step_marker: Regex,
    result_dirs: Vec<String>,
}

impl ChaiBackend {
    /// `result_dirs` are probed in order when resolving the output
    /// directory; an empty list falls back to the stock layout.
    pub fn new(result_dirs: Vec<String>) -> Self {
        let result_dirs = if result_dirs.is_empty() {
            DEFAULT_RESULT_DIRS.iter().map(|d| d.to_string()).collect()
        } else {
            result_dirs
        };
        Self {
            // "./results_chai/job/run_2 | Step 3: soft_iptm 0.61"
            step_marker: Regex::new(r"run_(\d+)\S*\s*\|\s*Step\s+(\d+):").unwrap(),
            result_dirs,
        }
    }
}

impl Default for ChaiBackend {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl DesignBackend for ChaiBackend {
    type Request = ChaiRequest;
    type Artifacts = ChaiArtifacts;

    fn family(&self) -> &'static str {
        "chai"
    }

    fn script(&self) -> &str {
        "chai_ph/design.py"
    }

    fn args(&self, request: &ChaiRequest) -> Vec<String> {
        let mut args = vec![
            "--jobname".to_string(),
            request.jobname.clone(),
            "--length".to_string(),
            request.length.to_string(),
            "--percent_X".to_string(),
            request.percent_x.to_string(),
            "--seq".to_string(),
            request.seq.clone(),
            "--target_seq".to_string(),
            request.target_seq.clone(),
            "--n_trials".to_string(),
            request.n_trials.to_string(),
            "--n_cycles".to_string(),
            request.n_cycles.to_string(),
            "--n_recycles".to_string(),
            request.n_recycles.to_string(),
            "--n_diff_steps".to_string(),
            request.n_diff_steps.to_string(),
            "--hysteresis_mode".to_string(),
            request.hysteresis_mode.clone(),
            "--omit_aa".to_string(),
            request.omit_aa.clone(),
            "--temperature".to_string(),
            request.temperature.to_string(),
            "--render_freq".to_string(),
            request.render_freq.to_string(),
            "--gpu_id".to_string(),
            request.gpu_id.to_string(),
        ];

        if let Some(bias_aa) = &request.bias_aa {
            args.extend(["--bias_aa".to_string(), bias_aa.clone()]);
        }

        if request.cyclic {
            args.push("--cyclic".to_string());
        }
        if request.repredict {
            args.push("--repredict".to_string());
        }
        if request.scale_temp_by_plddt {
            args.push("--scale_temp_by_plddt".to_string());
        }
        if request.use_msa_for_af3 {
            args.push("--use_msa_for_af3".to_string());
        }
        if request.plot {
            args.push("--plot".to_string());
        }

        args
    }

    fn inner_units(&self, request: &ChaiRequest) -> u64 {
        u64::from(request.n_cycles)
    }

    fn total_units(&self, request: &ChaiRequest) -> u64 {
        u64::from(request.n_trials) * u64::from(request.n_cycles)
    }

    fn observe_line(&self, line: &str, state: &mut MarkerState) -> bool {
        if let Some(caps) = self.step_marker.captures(line) {
            let trial = caps[1].parse::<u64>();
            let step = caps[2].parse::<u64>();
            if let (Ok(trial), Ok(step)) = (trial, step) {
                state.outer = trial;
                state.inner = step;
                return true;
            }
        }
        false
    }

    fn resolve_artifacts(
        &self,
        install_dir: &Path,
        request: &ChaiRequest,
    ) -> Result<ChaiArtifacts> {
        let candidates: Vec<PathBuf> = self
            .result_dirs
            .iter()
            .map(|dir| install_dir.join(dir).join(&request.jobname))
            .collect();

        let found = candidates.iter().find(|path| path.exists()).cloned();
        let output_dir = match found {
            Some(path) => path,
            None => {
                return Err(HunterError::ArtifactMissing {
                    what: "Output directory",
                    path: candidates
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| install_dir.join(&request.jobname)),
                })
            }
        };

        match collect_runs(&output_dir) {
            Ok(runs) => Ok(ChaiArtifacts {
                output_dir,
                runs,
                note: None,
            }),
            Err(e) => {
                // A completed computation is still on disk; hand back the
                // location instead of discarding it.
                warn!(error = %e, "Failed to parse run directories");
                Ok(ChaiArtifacts {
                    output_dir,
                    runs: Vec::new(),
                    note: Some(format!(
                        "Results available but detailed parsing failed: {e}"
                    )),
                })
            }
        }
    }
}

/// Read every `run_*` subdirectory: last structure file, metrics JSON,
/// and trimmed sequence text, each optional.
fn collect_runs(output_dir: &Path) -> anyhow::Result<Vec<RunRecord>> {
    let mut run_dirs: Vec<PathBuf> = std::fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("run_"))
        })
        .collect();
    run_dirs.sort();

    let mut runs = Vec::new();
    for run_dir in run_dirs {
        let run = run_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let mut pdb_files: Vec<PathBuf> = std::fs::read_dir(&run_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "pdb"))
            .collect();
        pdb_files.sort();
        let pdb_file = pdb_files
            .last()
            .map(|path| path.to_string_lossy().to_string());

        let metrics_file = run_dir.join("metrics.json");
        let metrics = if metrics_file.exists() {
            let raw = std::fs::read_to_string(&metrics_file)?;
            Some(serde_json::from_str(&raw)?)
        } else {
            None
        };

        let seq_file = run_dir.join("sequence.txt");
        let sequence = if seq_file.exists() {
            Some(std::fs::read_to_string(&seq_file)?.trim().to_string())
        } else {
            None
        };

        runs.push(RunRecord {
            run,
            pdb_file,
            metrics,
            sequence,
        });
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> ChaiBackend {
        ChaiBackend::default()
    }

    #[test]
    fn test_required_args_in_fixed_order() {
        let request = ChaiRequest::new("denovo");
        let args = backend().args(&request);
        assert_eq!(
            &args[..10],
            &[
                "--jobname",
                "denovo",
                "--length",
                "120",
                "--percent_X",
                "0",
                "--seq",
                "",
                "--target_seq",
                ""
            ]
        );
        assert!(args.contains(&"--hysteresis_mode".to_string()));
        assert!(args.contains(&"--gpu_id".to_string()));
    }

    #[test]
    fn test_bias_aa_and_boolean_flags() {
        let mut request = ChaiRequest::new("flags");
        let args = backend().args(&request);
        assert!(!args.contains(&"--bias_aa".to_string()));
        assert!(!args.contains(&"--cyclic".to_string()));
        // Stock defaults switch these on.
        assert!(args.contains(&"--repredict".to_string()));
        assert!(args.contains(&"--scale_temp_by_plddt".to_string()));
        assert!(args.contains(&"--plot".to_string()));

        request.bias_aa = Some("A:-2.0,P:-1.0".to_string());
        request.cyclic = true;
        request.repredict = false;
        let args = backend().args(&request);
        let at = args.iter().position(|a| a == "--bias_aa").unwrap();
        assert_eq!(args[at + 1], "A:-2.0,P:-1.0");
        assert!(args.contains(&"--cyclic".to_string()));
        assert!(!args.contains(&"--repredict".to_string()));
    }

    #[test]
    fn test_step_marker_updates_trial_and_step() {
        let backend = backend();
        let mut state = MarkerState::default();
        assert!(backend.observe_line(
            "./results_chai/demo/run_2 | Step 3: soft_iptm 0.61",
            &mut state
        ));
        assert_eq!(state, MarkerState { outer: 2, inner: 3 });
    }

    #[test]
    fn test_non_marker_lines_are_ignored() {
        let backend = backend();
        let mut state = MarkerState::default();
        assert!(!backend.observe_line("run_2 without a step", &mut state));
        assert!(!backend.observe_line("| Step 3: no run here", &mut state));
        assert_eq!(state, MarkerState::default());
    }

    #[test]
    fn test_resolve_collects_run_records() {
        let dir = tempfile::tempdir().unwrap();
        let job = dir.path().join("results_chai").join("demo");
        for run in ["run_0", "run_1"] {
            let run_dir = job.join(run);
            std::fs::create_dir_all(&run_dir).unwrap();
            std::fs::write(run_dir.join("metrics.json"), r#"{"iptm": 0.8}"#).unwrap();
            std::fs::write(run_dir.join("sequence.txt"), "MKVLAT\n").unwrap();
            std::fs::write(run_dir.join("final.pdb"), "ATOM").unwrap();
        }

        let request = ChaiRequest::new("demo");
        let artifacts = backend().resolve_artifacts(dir.path(), &request).unwrap();
        assert!(artifacts.note.is_none());
        assert_eq!(artifacts.runs.len(), 2);
        assert_eq!(artifacts.runs[0].run, "run_0");
        assert_eq!(artifacts.runs[0].sequence.as_deref(), Some("MKVLAT"));
        assert_eq!(artifacts.runs[1].metrics.as_ref().unwrap()["iptm"], 0.8);
        assert!(artifacts.runs[1].pdb_file.as_ref().unwrap().ends_with("final.pdb"));
    }

    #[test]
    fn test_resolve_probes_alternate_root() {
        let dir = tempfile::tempdir().unwrap();
        let job = dir.path().join("outputs").join("demo");
        std::fs::create_dir_all(job.join("run_0")).unwrap();

        let request = ChaiRequest::new("demo");
        let artifacts = backend().resolve_artifacts(dir.path(), &request).unwrap();
        assert_eq!(artifacts.output_dir, job);
        assert_eq!(artifacts.runs.len(), 1);
    }

    #[test]
    fn test_resolve_missing_directory_names_primary_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let request = ChaiRequest::new("absent");
        let err = backend().resolve_artifacts(dir.path(), &request).unwrap_err();
        match err {
            HunterError::ArtifactMissing { path, .. } => {
                assert!(path.ends_with("results_chai/absent"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_degrades_on_bad_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("results_chai").join("demo").join("run_0");
        std::fs::create_dir_all(&run_dir).unwrap();
        std::fs::write(run_dir.join("metrics.json"), "not json").unwrap();

        let request = ChaiRequest::new("demo");
        let artifacts = backend().resolve_artifacts(dir.path(), &request).unwrap();
        assert!(artifacts.runs.is_empty());
        assert!(artifacts
            .note
            .as_ref()
            .unwrap()
            .contains("detailed parsing failed"));
    }
}

//! End-to-end façade tests: registry → engine → shell-script design
//! stand-ins → artifacts on disk.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use hunter_engine::boltz::BoltzBackend;
use hunter_engine::chai::ChaiBackend;
use hunter_engine::{DesignEngine, DesignGate, ProgressSink};
use hunter_server::tools::{build_default_registry, ToolRegistry};

#[derive(Default)]
struct Recorder {
    reports: Mutex<Vec<(u64, u64)>>,
}

#[async_trait]
impl ProgressSink for Recorder {
    async fn report(&self, current: u64, total: u64) {
        self.reports.lock().await.push((current, total));
    }
}

/// Registry whose engines run `/bin/sh` scripts from `install_dir`
/// instead of the real design pipelines.
fn scripted_registry(install_dir: &Path, gate: DesignGate) -> ToolRegistry {
    let boltz = Arc::new(
        DesignEngine::new(BoltzBackend::new(), install_dir, gate.clone()).with_python("/bin/sh"),
    );
    let chai = Arc::new(
        DesignEngine::new(ChaiBackend::default(), install_dir, gate).with_python("/bin/sh"),
    );
    build_default_registry(boltz, chai, 0)
}

fn write_script(install_dir: &Path, family_dir: &str, content: &str) {
    let dir = install_dir.join(family_dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("design.py"), content).unwrap();
}

#[tokio::test]
async fn test_binder_design_completes_with_summary_rows() {
    let install = tempfile::tempdir().unwrap();
    write_script(
        install.path(),
        "boltz_ph",
        "mkdir -p results_boltz/demo\n\
         echo '=== Starting Design Run 1/1 ==='\n\
         echo '--- Run 0, Cycle 1 ---'\n\
         echo '--- Run 0, Cycle 2 ---'\n\
         printf 'design,iptm\\nrun_0,0.85\\nrun_1,0.91\\n' > results_boltz/demo/summary_high_iptm.csv\n",
    );

    let registry = scripted_registry(install.path(), DesignGate::new());
    let recorder = Recorder::default();
    let params = json!({
        "target_protein_sequence": "MKVLATGG",
        "design_name": "demo",
        "num_designs": 1,
        "num_cycles": 2
    });
    let result = registry
        .invoke("ph_design_protein_binder", params, Some(&recorder))
        .await
        .unwrap();

    assert_eq!(result["status"], "completed");
    assert_eq!(result["num_results"], 2);
    assert_eq!(result["results"][0]["design"], "run_0");
    assert!(result["summary_csv_path"]
        .as_str()
        .unwrap()
        .ends_with("results_boltz/demo/summary_high_iptm.csv"));

    let reports = recorder.reports.lock().await;
    assert_eq!(reports.first(), Some(&(0, 2)));
    assert_eq!(reports.last(), Some(&(2, 2)));
    assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0), "{reports:?}");
}

#[tokio::test]
async fn test_failing_design_returns_stderr() {
    let install = tempfile::tempdir().unwrap();
    write_script(
        install.path(),
        "boltz_ph",
        "echo 'RuntimeError: CUDA unavailable' >&2\nexit 1\n",
    );

    let registry = scripted_registry(install.path(), DesignGate::new());
    let params = json!({ "target_protein_sequence": "MKV" });
    let result = registry
        .invoke("ph_design_protein_binder", params, None)
        .await
        .unwrap();

    assert_eq!(result["status"], "error");
    assert!(result["error"]
        .as_str()
        .unwrap()
        .contains("return code 1"));
    assert!(result["stderr"]
        .as_str()
        .unwrap()
        .contains("CUDA unavailable"));
}

#[tokio::test]
async fn test_missing_summary_releases_gate_for_next_call() {
    let install = tempfile::tempdir().unwrap();
    // Exits clean but writes nothing: artifact-missing path.
    write_script(install.path(), "boltz_ph", "exit 0\n");

    let gate = DesignGate::new();
    let registry = scripted_registry(install.path(), gate.clone());
    let params = json!({ "target_protein_sequence": "MKV", "design_name": "gone" });
    let result = registry
        .invoke("ph_design_protein_binder", params, None)
        .await
        .unwrap();

    assert_eq!(result["status"], "error");
    assert!(result["error"]
        .as_str()
        .unwrap()
        .contains("summary_high_iptm.csv"));
    assert!(gate.is_free());

    // A second job proceeds immediately.
    write_script(
        install.path(),
        "boltz_ph",
        "mkdir -p results_boltz/next\n\
         printf 'design\\nrun_0\\n' > results_boltz/next/summary_high_iptm.csv\n",
    );
    let params = json!({ "target_protein_sequence": "MKV", "design_name": "next" });
    let result = registry
        .invoke("ph_design_protein_binder", params, None)
        .await
        .unwrap();
    assert_eq!(result["status"], "completed");
}

#[tokio::test]
async fn test_chai_binder_collects_run_records() {
    let install = tempfile::tempdir().unwrap();
    write_script(
        install.path(),
        "chai_ph",
        "for run in run_0 run_1; do\n\
           mkdir -p results_chai/demo/$run\n\
           printf '{\"iptm\": 0.8}' > results_chai/demo/$run/metrics.json\n\
           printf 'MKVLAT\\n' > results_chai/demo/$run/sequence.txt\n\
         done\n\
         echo './results_chai/demo/run_0 | Step 1: fold'\n",
    );

    let registry = scripted_registry(install.path(), DesignGate::new());
    let params = json!({
        "target_protein_sequence": "MKVLATGG",
        "design_name": "demo"
    });
    let result = registry
        .invoke("ph_chai_design_protein_binder", params, None)
        .await
        .unwrap();

    assert_eq!(result["status"], "completed");
    assert_eq!(result["num_results"], 2);
    assert_eq!(result["results"][0]["run"], "run_0");
    assert_eq!(result["results"][0]["metrics"]["iptm"], 0.8);
    assert_eq!(result["results"][1]["sequence"], "MKVLAT");
    assert_eq!(result["jobname"], "demo");
}

#[tokio::test]
async fn test_boltz_and_chai_jobs_serialize_on_one_gate() {
    let install = tempfile::tempdir().unwrap();
    // Both scripts share one critical-section witness in the install root.
    let witness = "if [ -e lock ]; then echo overlap >&2; exit 9; fi\n\
                   touch lock\n\
                   sleep 0.2\n\
                   rm lock\n";
    write_script(
        install.path(),
        "boltz_ph",
        &format!(
            "{witness}mkdir -p results_boltz/a\n\
             printf 'design\\nrun_0\\n' > results_boltz/a/summary_high_iptm.csv\n"
        ),
    );
    write_script(
        install.path(),
        "chai_ph",
        &format!("{witness}mkdir -p results_chai/b/run_0\n"),
    );

    let registry = scripted_registry(install.path(), DesignGate::new());
    let boltz_params = json!({ "target_protein_sequence": "MKV", "design_name": "a" });
    let chai_params = json!({ "target_protein_sequence": "MKV", "design_name": "b" });
    let (boltz_result, chai_result) = tokio::join!(
        registry.invoke("ph_design_protein_binder", boltz_params, None),
        registry.invoke("ph_chai_design_protein_binder", chai_params, None),
    );

    assert_eq!(boltz_result.unwrap()["status"], "completed");
    assert_eq!(chai_result.unwrap()["status"], "completed");
}

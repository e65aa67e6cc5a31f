#![cfg(test)]

use super::*;

#[test]
fn test_empty_toml_yields_defaults() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3003);
    assert_eq!(config.design.install_dir, PathBuf::from("Protein-Hunter"));
    assert_eq!(config.design.gpu_id, 0);
    assert_eq!(config.design.python, "python");
    assert_eq!(config.design.chai_result_dirs, vec!["results_chai", "outputs"]);
}

#[test]
fn test_partial_toml_keeps_remaining_defaults() {
    let config = Config::from_toml(
        r#"
        [design]
        install_dir = "/opt/protein-hunter"
        gpu_id = 1
        "#,
    )
    .unwrap();
    assert_eq!(config.design.install_dir, PathBuf::from("/opt/protein-hunter"));
    assert_eq!(config.design.gpu_id, 1);
    assert_eq!(config.design.python, "python");
    assert_eq!(config.server.port, 3003);
}

#[test]
fn test_chai_result_dirs_override() {
    let config = Config::from_toml(
        r#"
        [design]
        chai_result_dirs = ["outputs"]
        "#,
    )
    .unwrap();
    assert_eq!(config.design.chai_result_dirs, vec!["outputs"]);
}

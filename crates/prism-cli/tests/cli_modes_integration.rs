//! Integration tests for the PRISM CLI subcommands.
//!
//! - dist: JSON summaries for within-set, single-query and descriptor runs
//! - report: output files written under the requested directory
//! - errors: unsupported feature/metric combinations exit non-zero
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn prism_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_prism-cli"))
        .args(args)
        .output()
        .expect("Failed to execute prism-cli")
}

fn write_smiles(dir: &Path) -> String {
    let path = dir.join("set.smi");
    fs::write(&path, "# test set\nCCO ethanol\nCCCO propanol\nc1ccccc1 benzene\n")
        .expect("write smiles");
    path.to_string_lossy().into_owned()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "prism-cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_dist_nearest_within_set() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_smiles(dir.path());

    let json = stdout_json(&prism_cli(&["dist", "--input", &input, "-k", "1"]));

    assert_eq!(json["kind"], "ecfp/tanimoto");
    assert_eq!(json["within_dataset"], true);
    assert_eq!(json["mode"], "nearest");
    assert_eq!(json["rows"], 3);
    let rows = json["result"]["row_neighbors"].as_array().expect("row neighbors");
    assert_eq!(rows.len(), 3);
    for (i, row) in rows.iter().enumerate() {
        assert_ne!(row[0]["index"].as_u64(), Some(i as u64));
    }
}

#[test]
fn test_dist_single_query_average() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_smiles(dir.path());

    let json = stdout_json(&prism_cli(&[
        "dist", "--input", &input, "--query", "CCO", "--mode", "average", "-k", "2",
    ]));

    assert_eq!(json["within_dataset"], false);
    let mean = json["result"]["mean"].as_f64().expect("mean");
    assert!((0.0..=1.0).contains(&mean));
}

#[test]
fn test_dist_descriptors_to_file() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_smiles(dir.path());
    let out = dir.path().join("dist.json");

    let output = prism_cli(&[
        "dist",
        "--input",
        &input,
        "--feature",
        "descriptors",
        "--metric",
        "euclidean",
        "--mode",
        "all",
        "--output",
        out.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "descriptor run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read output")).expect("parse");
    assert_eq!(json["kind"], "descriptors/euclidean");
    assert_eq!(json["rows"], 3);
    assert_eq!(json["cols"], 3);
}

#[test]
fn test_unsupported_combination_fails() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_smiles(dir.path());

    let output = prism_cli(&["dist", "--input", &input, "--feature", "ecfp", "--metric", "euclidean"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported combination"));
}

#[test]
fn test_report_writes_tables() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("library.csv");
    fs::write(
        &input,
        "name,SMILES\nL1,CCO\nL2,CCCO\nL3,c1ccccc1\nL4,Cc1ccccc1\nL5,C1CC\n",
    )
    .expect("write compounds");
    let out_dir = dir.path().join("out");

    let output = prism_cli(&[
        "report",
        "--input",
        input.to_str().expect("utf-8 path"),
        "--out-dir",
        out_dir.to_str().expect("utf-8 path"),
        "--id-col",
        "name",
        "--smiles-col",
        "SMILES",
    ]);
    assert!(
        output.status.success(),
        "report failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    for name in [
        "library_mcs_dist_table.csv",
        "library_mcs_proj.csv",
        "library_tani_proj.csv",
        "library_tanimoto_clustermap.csv",
    ] {
        assert!(out_dir.join(name).exists(), "{} not created", name);
    }
    let map = fs::read_to_string(out_dir.join("library_tanimoto_clustermap.csv")).expect("read map");
    assert_eq!(map.lines().count(), 5);
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_smiles(dir.path());
    let config = dir.path().join("prism.toml");
    fs::write(&config, "[summary]\nmode = \"farthest\"\nk = 2\n").expect("write config");

    let json = stdout_json(&prism_cli(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "dist",
        "--input",
        &input,
    ]));
    assert_eq!(json["mode"], "farthest");
    assert_eq!(json["k"], 2);
    assert_eq!(json["result"]["row_neighbors"][0].as_array().map(Vec::len), Some(2));
}

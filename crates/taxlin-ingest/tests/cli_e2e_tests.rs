//! End-to-end tests for the taxlin binary

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use flate2::read::GzDecoder;
use predicates::prelude::*;
use tempfile::TempDir;

fn test_data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/test_data").join(name)
}

fn taxlin() -> Command {
    let mut cmd = Command::cargo_bin("taxlin").unwrap();
    cmd.env_remove("TAXLIN_NODES_FILE")
        .env_remove("TAXLIN_NAMES_FILE")
        .env_remove("TAXLIN_OUTPUT")
        .env_remove("TAXLIN_WORKERS")
        .env("LOG_OUTPUT", "console");
    cmd
}

fn read_gz(path: &Path) -> String {
    let mut decoder = GzDecoder::new(fs::File::open(path).unwrap());
    let mut text = String::new();
    decoder.read_to_string(&mut text).unwrap();
    text
}

#[test]
fn test_help() {
    taxlin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--nodes-file"))
        .stdout(predicate::str::contains("--names-file"));
}

#[test]
fn test_writes_gzipped_lineages() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("lineages.csv.gz");

    taxlin()
        .arg("--nodes-file")
        .arg(test_data("nodes.dmp"))
        .arg("--names-file")
        .arg(test_data("names.dmp"))
        .arg("-o")
        .arg(&output)
        .args(["--workers", "2", "--no-progress"])
        .assert()
        .success();

    let csv = read_gz(&output);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 22);
    assert!(lines[0].starts_with("tax_id,superkingdom,phylum,class,order,family,genus,species"));
    assert!(lines.contains(
        &"7,Bacteria,Proteobacteria,Alphaproteobacteria,Hyphomicrobiales,Xanthobacteraceae,Azorhizobium,Azorhizobium caulinodans,,,root,cellular organisms"
    ));
}

#[test]
fn test_existing_output_is_backed_up() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("lineages.csv.gz");
    fs::write(&output, b"previous run").unwrap();

    taxlin()
        .arg("--nodes-file")
        .arg(test_data("nodes.dmp"))
        .arg("--names-file")
        .arg(test_data("names.dmp"))
        .arg("-o")
        .arg(&output)
        .arg("--no-progress")
        .assert()
        .success();

    let backup = dir.path().join("#lineages.csv.gz.1#");
    assert_eq!(fs::read(&backup).unwrap(), b"previous run");
    assert!(read_gz(&output).starts_with("tax_id,"));
}

#[test]
fn test_missing_input_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("lineages.csv.gz");

    taxlin()
        .arg("--nodes-file")
        .arg(dir.path().join("nodes.dmp"))
        .arg("--names-file")
        .arg(test_data("names.dmp"))
        .arg("-o")
        .arg(&output)
        .arg("--no-progress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nodes.dmp"));

    assert!(!output.exists());
}

#[test]
fn test_dangling_parent_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let (nodes, names) = dangling_parent_inputs(dir.path());

    let output = dir.path().join("lineages.csv.gz");

    taxlin()
        .arg("--nodes-file")
        .arg(&nodes)
        .arg("--names-file")
        .arg(&names)
        .arg("-o")
        .arg(&output)
        .args(["--workers", "3", "--no-progress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("424242"));

    assert!(!output.exists());
}

fn dangling_parent_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let nodes = dir.join("nodes.dmp");
    let mut content = fs::read_to_string(test_data("nodes.dmp")).unwrap();
    content.push_str("999999\t|\t424242\t|\tspecies\t|\t\t|\n");
    fs::write(&nodes, content).unwrap();

    let names = dir.join("names.dmp");
    let mut content = fs::read_to_string(test_data("names.dmp")).unwrap();
    content.push_str("999999\t|\tOrphan\t|\t\t|\tscientific name\t|\n");
    fs::write(&names, content).unwrap();

    (nodes, names)
}

#[test]
fn test_failure_reported_once_on_stderr() {
    let dir = TempDir::new().unwrap();
    let (nodes, names) = dangling_parent_inputs(dir.path());

    let output = taxlin()
        .arg("--nodes-file")
        .arg(&nodes)
        .arg("--names-file")
        .arg(&names)
        .arg("-o")
        .arg(dir.path().join("lineages.csv.gz"))
        .arg("--no-progress")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("424242 not found").count(), 1, "stderr: {stderr}");
}

#[test]
fn test_failure_on_stderr_with_file_logging() {
    let dir = TempDir::new().unwrap();
    let (nodes, names) = dangling_parent_inputs(dir.path());

    taxlin()
        .env("LOG_OUTPUT", "file")
        .env("LOG_DIR", dir.path().join("logs"))
        .arg("--nodes-file")
        .arg(&nodes)
        .arg("--names-file")
        .arg(&names)
        .arg("-o")
        .arg(dir.path().join("lineages.csv.gz"))
        .arg("--no-progress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("424242 not found").count(1));
}

#[test]
fn test_zero_workers_rejected() {
    let dir = TempDir::new().unwrap();

    taxlin()
        .arg("--nodes-file")
        .arg(test_data("nodes.dmp"))
        .arg("--names-file")
        .arg(test_data("names.dmp"))
        .arg("-o")
        .arg(dir.path().join("lineages.csv.gz"))
        .args(["--workers", "0", "--no-progress"])
        .assert()
        .failure();
}

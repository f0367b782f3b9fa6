//! End-to-end tests for the dxdate binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from any config in the working or user config dir.
fn dxdate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dxdate").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_synthetic(dir: &TempDir) -> String {
    let mut records: Vec<serde_json::Value> = (0..4)
        .map(|i| serde_json::json!({"clinical_note": format!("train{i}[dx]"), "ground_truth": []}))
        .collect();
    records.push(serde_json::json!({
        "clinical_note": "asthma[dx] flared (14/03/2021)[date]; copd[dx] (2022-07-01)[date]",
        "ground_truth": [
            {"date": "2021-03-14", "diagnoses": [{"diagnosis": "asthma"}]},
            {"date": "2022-07-01", "diagnoses": [{"diagnosis": "copd"}]}
        ]
    }));
    let data = dir.path().join("synthetic.json");
    fs::write(&data, serde_json::to_string(&records).unwrap()).unwrap();

    let config = dir.path().join("run.toml");
    fs::write(
        &config,
        format!(
            "data_source = \"synthetic\"\n\n[paths]\nsynthetic = \"{}\"\n\n[evaluation]\noutput_dir = \"{}\"\n",
            data.display(),
            dir.path().join("out").display()
        ),
    )
    .unwrap();
    config.display().to_string()
}

#[test]
fn test_parse_date() {
    let dir = TempDir::new().unwrap();
    dxdate(&dir)
        .args(["parse-date", "03-02-2023", "3rd Feb'23", "not a date"])
        .assert()
        .success()
        .stdout(predicate::str::contains("03-02-2023\t2023-02-03"))
        .stdout(predicate::str::contains("3rd Feb'23\t2023-02-03"))
        .stdout(predicate::str::contains("not a date\t-"));
}

#[test]
fn test_parse_date_strict_fails() {
    let dir = TempDir::new().unwrap();
    dxdate(&dir)
        .args(["parse-date", "--strict", "2023-02-03", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 dates did not parse"));
}

#[test]
fn test_parse_date_stdin_json() {
    let dir = TempDir::new().unwrap();
    let out = dxdate(&dir)
        .args(["parse-date", "--format", "json"])
        .write_stdin("18.04.19\n\n31-02-2023\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v[0]["parsed"], "2019-04-18");
    assert!(v[1]["parsed"].is_null());
    assert_eq!(v.as_array().unwrap().len(), 2);
}

#[test]
fn test_extract() {
    let dir = TempDir::new().unwrap();
    dxdate(&dir)
        .args(["extract", "diabetes[dx] diagnosed (2023-01-15)[date]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("diabetes"))
        .stdout(predicate::str::contains("@24"))
        .stdout(predicate::str::contains("relationships via proximity (1)"));
}

#[test]
fn test_extract_json_classifier() {
    let dir = TempDir::new().unwrap();
    let out = dxdate(&dir)
        .args([
            "extract",
            "--generator",
            "classifier",
            "--format",
            "json",
            "-t",
            "flu[dx] (01/02/2020)[date]",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["relationships"][0]["diagnosis"], "flu");
    assert_eq!(v["relationships"][0]["date"], "2020-02-01");
}

#[test]
fn test_eval_synthetic() {
    let dir = TempDir::new().unwrap();
    let config = write_synthetic(&dir);
    let out = dxdate(&dir)
        .args(["eval", "--config", &config, "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["generator"], "proximity");
    assert_eq!(v["true_positives"], 2);
    assert_eq!(v["false_positives"], 0);
    assert_eq!(v["f1"], 1.0);
    assert!(dir.path().join("out/proximity_metrics.json").exists());
}

#[test]
fn test_eval_missing_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("run.toml");
    fs::write(&config, "[paths]\nsynthetic = \"nowhere.json\"\n").unwrap();
    dxdate(&dir)
        .args(["eval", "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dataset not found"));
}

#[test]
fn test_eval_without_api_key_still_scores() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.csv");
    fs::write(
        &notes,
        concat!(
            "text,gold_standard,document_timestamp\n",
            "\"Asthma seen last week.\",",
            "\"[{\"\"date\"\": \"\"2025-05-07\"\", \"\"diagnoses\"\": [{\"\"diagnosis\"\": \"\"asthma\"\"}]}]\",",
            "2025-05-14 09:30:00\n",
        ),
    )
    .unwrap();
    let config = dir.path().join("run.toml");
    fs::write(
        &config,
        format!(
            "data_source = \"notes\"\n\n[paths]\nnotes = \"{}\"\n\n[evaluation]\noutput_dir = \"{}\"\n\n[relative_dates]\nenabled = true\nbackend = \"openai\"\n",
            notes.display(),
            dir.path().join("out").display()
        ),
    )
    .unwrap();

    let out = dxdate(&dir)
        .env_remove("OPENAI_API_KEY")
        .args(["eval", "--config", config.to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("OPENAI_API_KEY"))
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["true_positives"], 0);
    assert_eq!(v["false_negatives"], 1);
    assert!(dir.path().join("out/proximity_metrics.json").exists());
}

#[test]
fn test_eval_rejects_unknown_config_key() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("run.toml");
    fs::write(&config, "[evaluation]\nsamples = 3\n").unwrap();
    dxdate(&dir)
        .args(["eval", "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("samples"));
}

#[test]
fn test_score() {
    let dir = TempDir::new().unwrap();
    let preds = dir.path().join("preds.json");
    let gold = dir.path().join("gold.json");
    fs::write(
        &preds,
        r#"[
            {"note_id": 0, "diagnosis": "Flu", "date": "01/01/2023", "confidence": 0.9},
            {"note_id": 0, "diagnosis": "flu", "date": "2023-01-01"},
            {"note_id": 0, "diagnosis": "cold", "date": "sometime"},
            {"note_id": 5, "diagnosis": "gout", "date": "2020-01-01"}
        ]"#,
    )
    .unwrap();
    fs::write(
        &gold,
        r#"[
            {"note_id": 0, "diagnosis": "flu", "date": "2023-01-01"},
            {"note_id": 0, "diagnosis": "cold", "date": "2023-01-02"}
        ]"#,
    )
    .unwrap();

    let out = dxdate(&dir)
        .args([
            "score",
            "--predictions",
            preds.to_str().unwrap(),
            "--gold",
            gold.to_str().unwrap(),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["true_positives"], 1);
    assert_eq!(v["false_positives"], 0);
    assert_eq!(v["false_negatives"], 1);
    assert_eq!(v["recall"], 0.5);
}

#[test]
fn test_config_init_and_show() {
    let dir = TempDir::new().unwrap();
    dxdate(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote config"));
    assert!(dir.path().join("dxdate.toml").exists());

    dxdate(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    dxdate(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data_source = \"synthetic\""))
        .stdout(predicate::str::contains("gpt-3.5-turbo"));

    dxdate(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dxdate.toml"));
}

#[test]
fn test_config_check() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[classifier]\nthreshold = 1.5\n").unwrap();
    dxdate(&dir)
        .args(["config", "check", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("classifier.threshold"));
}

#[test]
fn test_relative_requires_timestamp() {
    let dir = TempDir::new().unwrap();
    dxdate(&dir)
        .args(["relative", "--timestamp", "yesterday-ish", "-t", "seen last week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unrecognized timestamp"));
}

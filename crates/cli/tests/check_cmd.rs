//! CLI tests for `scpi check`, `scpi lex` and `scpi match`.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

fn scpi_cmd() -> Command {
    Command::new(cargo::cargo_bin!("scpi"))
}

fn write_temp(content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("program.scpi");
    fs::write(&path, content).expect("write temp program");
    (dir, path.to_string_lossy().to_string())
}

#[test]
fn clean_file_passes() {
    let (_dir, path) = write_temp("*RST;*CLS\nSOUR:VOLT 5;VOLT?\nMEAS:VOLT:DC?\n");
    let output = scpi_cmd()
        .args(["check", &path, "--output", "json"])
        .output()
        .expect("run check");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["ok"], true);
}

#[test]
fn problems_carry_codes_and_spans() {
    let (_dir, path) = write_temp("*IDN?\nFOO:BAR 1\n");
    let output = scpi_cmd()
        .args(["check", &path, "--output", "json"])
        .output()
        .expect("run check");
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let diag = &json["diagnostics"][0];
    assert_eq!(diag["code"], -113);
    assert_eq!(diag["message"], "Undefined header;FOO:BAR");
    assert_eq!(diag["span"]["start"], 6);
    assert_eq!(diag["span"]["end"], 13);
}

#[test]
fn pretty_check_renders_to_stderr() {
    let (_dir, path) = write_temp("*IDN? 5,\n");
    let output = scpi_cmd()
        .args(["check", &path, "--output", "pretty"])
        .output()
        .expect("run check");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid character"), "stderr={stderr}");
}

#[test]
fn lex_json_lists_units() {
    let output = scpi_cmd()
        .args(["lex", r"SOUR:VOLT 5 V,#H1F;*IDN?\r\n", "--output", "json"])
        .output()
        .expect("run lex");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let units = json.as_array().expect("array");
    assert_eq!(units.len(), 2);
    assert_eq!(units[0]["header"], "SOUR:VOLT");
    assert_eq!(units[0]["kind"], "compound_header");
    assert_eq!(units[0]["params"][0]["kind"], "decimal_numeric_with_suffix");
    assert_eq!(units[0]["params"][1]["kind"], "hex_num");
    assert_eq!(units[0]["termination"], "semicolon");
    assert_eq!(units[1]["kind"], "common_query_header");
    assert_eq!(units[1]["termination"], "newline");
}

#[test]
fn match_extracts_suffixes() {
    let output = scpi_cmd()
        .args(["match", "OUTPut#:MODulation#:FM#", "outp3:mod10:fm", "--output", "json"])
        .output()
        .expect("run match");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["matched"], true);
    assert_eq!(json["suffixes"], serde_json::json!([3, 10, 1]));
}

#[test]
fn match_failure_exits_nonzero() {
    let output = scpi_cmd()
        .args(["match", "SOURce:VOLTage", "sour:curr", "--output", "json"])
        .output()
        .expect("run match");
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["error"], -113);
}
